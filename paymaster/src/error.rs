use crate::gateway::GatewayError;
use anon_paymaster_primitives::{error::ContextError, Field, PoolId};
use anon_paymaster_prover::ProverError;

/// Failure kinds of the engine. Lower layers convert into exactly one of these.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("pool index unavailable: {0}")]
	IndexUnavailable(String),
	#[error("pool {0} not found in index")]
	PoolNotFound(PoolId),
	#[error("root {root} is neither current nor in the root history of pool {pool_id}")]
	StaleOrUnknownRoot { pool_id: PoolId, root: Field },
	#[error("malformed paymaster context: {0}")]
	MalformedContext(#[from] ContextError),
	#[error("membership proof generation failed: {0}")]
	ProofGenerationFailure(#[from] ProverError),
}

impl Error {
	/// Only an unreachable or misbehaving index is worth another attempt as is.
	pub fn is_retryable(&self) -> bool {
		matches!(self, Error::IndexUnavailable(_))
	}
}

impl From<GatewayError> for Error {
	fn from(err: GatewayError) -> Self {
		match err {
			GatewayError::PoolNotFound(pool_id) => Error::PoolNotFound(pool_id),
			other => Error::IndexUnavailable(other.to_string()),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::time::Duration;

	#[test]
	fn only_index_failures_are_retryable() {
		assert!(Error::from(GatewayError::Timeout(Duration::from_secs(1))).is_retryable());
		assert!(Error::from(GatewayError::Status(502)).is_retryable());
		assert!(!Error::from(GatewayError::PoolNotFound(PoolId::from(1))).is_retryable());
		assert!(!Error::from(ContextError::ZeroPoolId).is_retryable());
		assert!(!Error::from(ProverError::NotAMember).is_retryable());
		assert!(!Error::StaleOrUnknownRoot { pool_id: PoolId::from(1), root: Field::from(2u64) }
			.is_retryable());
	}

	#[test]
	fn missing_pool_keeps_its_kind() {
		assert!(matches!(
			Error::from(GatewayError::PoolNotFound(PoolId::from(3))),
			Error::PoolNotFound(id) if id == PoolId::from(3)
		));
	}
}
