//! JSON shapes of the `pm_` methods. Bytes and quantities are `0x` hex strings.

use crate::error::Error;
use anon_paymaster::UserOperationIntent;
use anon_paymaster_primitives::{
	common::{parse_uint256, WORD_LEN},
	serde_hex::serialize_bytes,
	Address,
};
use serde::{Deserialize, Serialize};

/// The user operation fields the proof binds to. Other fields are accepted and ignored.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserOperation {
	pub sender: Address,
	pub nonce: String,
	#[serde(with = "serialize_bytes")]
	pub call_data: Vec<u8>,
}

impl UserOperation {
	pub fn intent(
		&self,
		entry_point: Address,
		chain_id: u64,
	) -> Result<UserOperationIntent, Error> {
		Ok(UserOperationIntent {
			sender: self.sender,
			nonce: parse_uint256(&self.nonce)
				.ok_or_else(|| Error::InvalidParams(format!("nonce {:?}", self.nonce)))?,
			call_data: self.call_data.clone(),
			entry_point,
			chain_id,
		})
	}
}

/// Opaque byte string, e.g. the encoded paymaster context.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bytes(#[serde(with = "serialize_bytes")] pub Vec<u8>);

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StubDataResponse {
	pub paymaster: Address,
	#[serde(with = "serialize_bytes")]
	pub paymaster_data: Vec<u8>,
	pub paymaster_verification_gas_limit: String,
	pub paymaster_post_op_gas_limit: String,
	pub is_final: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymasterDataResponse {
	pub paymaster: Address,
	#[serde(with = "serialize_bytes")]
	pub paymaster_data: Vec<u8>,
}

pub fn to_quantity(value: u64) -> String {
	format!("{:#x}", value)
}

/// Parse a hex (or decimal) quantity that must fit a `u64`.
pub fn parse_quantity(name: &str, value: &str) -> Result<u64, Error> {
	let invalid = || Error::InvalidParams(format!("{name} {value:?}"));
	let bytes = parse_uint256(value).ok_or_else(invalid)?;
	if bytes[..WORD_LEN - 8].iter().any(|b| *b != 0) {
		return Err(invalid())
	}
	let mut low = [0u8; 8];
	low.copy_from_slice(&bytes[WORD_LEN - 8..]);
	Ok(u64::from_be_bytes(low))
}
