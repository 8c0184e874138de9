use anon_paymaster::Error as EngineError;
use jsonrpsee::types::{error::ErrorObject, ErrorObjectOwned};
use serde_json::json;

pub mod error_codes {
	pub const INDEX_UNAVAILABLE: i32 = -32001;
	pub const POOL_NOT_FOUND: i32 = -32002;
	pub const STALE_OR_UNKNOWN_ROOT: i32 = -32003;
	pub const PROOF_GENERATION_FAILURE: i32 = -32004;
	pub const INVALID_PARAMS: i32 = -32602;
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Engine(#[from] EngineError),
	#[error("invalid params: {0}")]
	InvalidParams(String),
	#[error("this paymaster has no identity configured")]
	MissingIdentity,
}

impl Error {
	pub fn code(&self) -> i32 {
		use error_codes::*;
		match self {
			Error::Engine(e) => match e {
				EngineError::IndexUnavailable(_) => INDEX_UNAVAILABLE,
				EngineError::PoolNotFound(_) => POOL_NOT_FOUND,
				EngineError::StaleOrUnknownRoot { .. } => STALE_OR_UNKNOWN_ROOT,
				EngineError::MalformedContext(_) => INVALID_PARAMS,
				EngineError::ProofGenerationFailure(_) => PROOF_GENERATION_FAILURE,
			},
			Error::InvalidParams(_) => INVALID_PARAMS,
			Error::MissingIdentity => PROOF_GENERATION_FAILURE,
		}
	}

	pub fn is_retryable(&self) -> bool {
		matches!(self, Error::Engine(e) if e.is_retryable())
	}
}

impl From<Error> for ErrorObjectOwned {
	fn from(err: Error) -> Self {
		let data = json!({ "retryable": err.is_retryable() });
		ErrorObject::owned(err.code(), err.to_string(), Some(data))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use anon_paymaster::GatewayError;
	use anon_paymaster_primitives::{error::ContextError, Field, PoolId};
	use anon_paymaster_prover::ProverError;
	use rstest::*;

	fn stale() -> EngineError {
		EngineError::StaleOrUnknownRoot { pool_id: PoolId::from(1), root: Field::from(1u64) }
	}

	#[rstest(err, code,
		case(Error::Engine(GatewayError::Status(500).into()), -32001),
		case(Error::Engine(EngineError::PoolNotFound(PoolId::from(1))), -32002),
		case(Error::Engine(stale()), -32003),
		case(Error::Engine(ProverError::NotAMember.into()), -32004),
		case(Error::Engine(ContextError::ZeroPoolId.into()), -32602),
		case(Error::InvalidParams("chainId".into()), -32602),
		case(Error::MissingIdentity, -32004),
	)]
	fn every_kind_has_its_code(err: Error, code: i32) {
		assert_eq!(ErrorObjectOwned::from(err).code(), code);
	}

	#[test]
	fn retryable_flag_is_reported() {
		let object = ErrorObjectOwned::from(Error::Engine(GatewayError::Status(503).into()));
		let data: serde_json::Value = serde_json::from_str(object.data().unwrap().get()).unwrap();
		assert_eq!(data, json!({ "retryable": true }));
	}
}
