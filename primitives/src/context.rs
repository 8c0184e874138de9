// Copyright (c) 2026 Anon Paymaster contributors
// This file is part of Anon Paymaster
//
// Anon Paymaster is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// Anon Paymaster is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with Anon Paymaster.  If not, see <http://www.gnu.org/licenses/>.

//! Paymaster context: the opaque blob a wallet hands to `pm_getPaymaster*` to choose a pool.
//!
//! Layout, version 1 (40 bytes):
//!
//! | offset | size | field                                          |
//! |--------|------|------------------------------------------------|
//! | 0      | 1    | version, `0x01`                                |
//! | 1      | 32   | pool id, `uint256` big-endian, non-zero        |
//! | 33     | 1    | spending mode                                  |
//! | 34     | 6    | reserved, zero                                 |
//!
//! Anything that does not match exactly is refused. In particular an unknown mode is never
//! mapped to a default, since the wallet would then spend differently than it asked for.

use crate::{common::WORD_LEN, error::ContextError, PoolId};
use serde::{Deserialize, Serialize};

pub const CONTEXT_VERSION: u8 = 1;
pub const CONTEXT_LEN: usize = 1 + WORD_LEN + 1 + RESERVED_LEN;
const RESERVED_LEN: usize = 6;

const POOL_ID_OFFSET: usize = 1;
const MODE_OFFSET: usize = POOL_ID_OFFSET + WORD_LEN;
const RESERVED_OFFSET: usize = MODE_OFFSET + 1;

/// How the fee sponsor accounts for gas paid on behalf of a member.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[repr(u8)]
pub enum SpendingMode {
	/// The nullifier keys a running credit balance and may be presented again.
	ReusableCredit = 0x00,
	/// The nullifier is burnt by the first sponsored operation.
	SingleUseVoucher = 0x01,
}

impl SpendingMode {
	pub fn flag(self) -> u8 {
		self as u8
	}
}

impl TryFrom<u8> for SpendingMode {
	type Error = ContextError;

	fn try_from(flag: u8) -> Result<Self, Self::Error> {
		match flag {
			0x00 => Ok(Self::ReusableCredit),
			0x01 => Ok(Self::SingleUseVoucher),
			other => Err(ContextError::UnknownMode(other)),
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PaymasterContext {
	pool_id: PoolId,
	mode: SpendingMode,
}

impl PaymasterContext {
	/// Contexts always reference a pool, the zero id is the "no pool" sentinel.
	pub fn new(pool_id: PoolId, mode: SpendingMode) -> Result<Self, ContextError> {
		if pool_id.is_zero() {
			return Err(ContextError::ZeroPoolId)
		}
		Ok(Self { pool_id, mode })
	}

	pub fn pool_id(&self) -> PoolId {
		self.pool_id
	}

	pub fn mode(&self) -> SpendingMode {
		self.mode
	}

	pub fn encode(&self) -> Vec<u8> {
		let mut bytes = vec![0u8; CONTEXT_LEN];
		bytes[0] = CONTEXT_VERSION;
		bytes[POOL_ID_OFFSET..MODE_OFFSET].copy_from_slice(self.pool_id.as_be_bytes());
		bytes[MODE_OFFSET] = self.mode.flag();
		bytes
	}

	pub fn decode(bytes: &[u8]) -> Result<Self, ContextError> {
		if bytes.len() != CONTEXT_LEN {
			return Err(ContextError::Length { expected: CONTEXT_LEN, actual: bytes.len() })
		}
		if bytes[0] != CONTEXT_VERSION {
			return Err(ContextError::UnsupportedVersion(bytes[0]))
		}
		let mut pool_id = [0u8; WORD_LEN];
		pool_id.copy_from_slice(&bytes[POOL_ID_OFFSET..MODE_OFFSET]);
		let mode = SpendingMode::try_from(bytes[MODE_OFFSET])?;
		if bytes[RESERVED_OFFSET..].iter().any(|b| *b != 0) {
			return Err(ContextError::ReservedBytesSet)
		}
		Self::new(PoolId::from_be_bytes(pool_id), mode)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;
	use rstest::*;

	fn context(mode: SpendingMode) -> PaymasterContext {
		PaymasterContext::new(PoolId::from(0x0102), mode).unwrap()
	}

	#[rstest(mode, case(SpendingMode::ReusableCredit), case(SpendingMode::SingleUseVoucher))]
	fn decode_inverts_encode(mode: SpendingMode) {
		let ctx = context(mode);
		assert_eq!(PaymasterContext::decode(&ctx.encode()), Ok(ctx));
	}

	#[test]
	fn large_pool_ids_roundtrip() {
		let ctx =
			PaymasterContext::new(PoolId::from_be_bytes([0xee; 32]), SpendingMode::ReusableCredit)
				.unwrap();
		assert_eq!(PaymasterContext::decode(&ctx.encode()), Ok(ctx));
	}

	#[test]
	fn encoding_layout_is_fixed() {
		let bytes = context(SpendingMode::SingleUseVoucher).encode();
		assert_eq!(bytes.len(), 40);
		assert_eq!(bytes[0], 0x01);
		assert_eq!(&bytes[31..33], &[0x01, 0x02]);
		assert_eq!(bytes[33], 0x01);
		assert_eq!(&bytes[34..], &[0u8; 6]);
	}

	#[test]
	fn trailing_bytes_are_rejected() {
		let mut bytes = context(SpendingMode::ReusableCredit).encode();
		bytes.push(0);
		assert_eq!(
			PaymasterContext::decode(&bytes),
			Err(ContextError::Length { expected: 40, actual: 41 })
		);
	}

	#[test]
	fn truncated_context_is_rejected() {
		let bytes = context(SpendingMode::ReusableCredit).encode();
		assert!(matches!(
			PaymasterContext::decode(&bytes[..39]),
			Err(ContextError::Length { actual: 39, .. })
		));
		assert!(PaymasterContext::decode(&[]).is_err());
	}

	#[test]
	fn unknown_version_is_rejected() {
		let mut bytes = context(SpendingMode::ReusableCredit).encode();
		bytes[0] = 0x02;
		assert_eq!(PaymasterContext::decode(&bytes), Err(ContextError::UnsupportedVersion(2)));
	}

	#[rstest(flag, case(0x02), case(0x7f), case(0xff))]
	fn unknown_mode_is_rejected(flag: u8) {
		let mut bytes = context(SpendingMode::ReusableCredit).encode();
		bytes[33] = flag;
		assert_eq!(PaymasterContext::decode(&bytes), Err(ContextError::UnknownMode(flag)));
	}

	#[test]
	fn reserved_bytes_must_be_zero() {
		let mut bytes = context(SpendingMode::ReusableCredit).encode();
		bytes[39] = 1;
		assert_eq!(PaymasterContext::decode(&bytes), Err(ContextError::ReservedBytesSet));
	}

	#[test]
	fn zero_pool_is_rejected() {
		let mut bytes = context(SpendingMode::ReusableCredit).encode();
		bytes[1..33].copy_from_slice(&[0u8; 32]);
		assert_eq!(PaymasterContext::decode(&bytes), Err(ContextError::ZeroPoolId));
		assert_eq!(
			PaymasterContext::new(PoolId::default(), SpendingMode::ReusableCredit),
			Err(ContextError::ZeroPoolId)
		);
	}

	proptest! {
		#[test]
		fn every_constructible_context_roundtrips(
			pool_id in prop::array::uniform32(any::<u8>()),
			single_use in any::<bool>(),
		) {
			let mode = match single_use {
				true => SpendingMode::SingleUseVoucher,
				false => SpendingMode::ReusableCredit,
			};
			if let Ok(ctx) = PaymasterContext::new(PoolId::from_be_bytes(pool_id), mode) {
				prop_assert_eq!(PaymasterContext::decode(&ctx.encode()), Ok(ctx));
			}
		}

		#[test]
		fn decode_never_accepts_other_lengths(bytes in prop::collection::vec(any::<u8>(), 0..80)) {
			prop_assume!(bytes.len() != CONTEXT_LEN);
			prop_assert!(PaymasterContext::decode(&bytes).is_err());
		}
	}
}
