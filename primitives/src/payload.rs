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

//! The `paymasterData` bytes the fee sponsor decodes during validation.
//!
//! Version 1 is twelve EVM words:
//!
//! | word  | field                                                                  |
//! |-------|------------------------------------------------------------------------|
//! | 0     | `[version u8][mode u8][reserved 26 bytes][merkle root index u32 BE]`   |
//! | 1     | pool id                                                                |
//! | 2     | merkle tree depth                                                      |
//! | 3     | nullifier                                                              |
//! | 4..11 | Groth16 proof points                                                   |
//!
//! The root itself is not sent, the contract looks it up by ring index. Message and scope are
//! recomputed on-chain from the user operation and the pool id. Every field is always written,
//! also when zero, so stub and final data have the same length and calldata cost profile.

use crate::{
	common::{field_from_be_bytes, field_to_be_bytes, WORD_LEN},
	error::PayloadError,
	pool::{MAX_TREE_DEPTH, MIN_TREE_DEPTH},
	Field, PoolId, SpendingMode,
};

pub const PAYLOAD_VERSION: u8 = 1;
/// Field elements in a Groth16 proof over BN254: `A` (2), `B` (4), `C` (2).
pub const PROOF_POINTS: usize = 8;
pub const PAYMASTER_DATA_LEN: usize = (4 + PROOF_POINTS) * WORD_LEN;

const ROOT_INDEX_OFFSET: usize = WORD_LEN - 4;
const POOL_ID_WORD: usize = WORD_LEN;
const DEPTH_WORD: usize = 2 * WORD_LEN;
const NULLIFIER_WORD: usize = 3 * WORD_LEN;
const POINTS_WORD: usize = 4 * WORD_LEN;

/// Groth16 proof as eight big-endian `uint256`, in the order solidity verifiers take them:
/// `A.x, A.y, B.x.c1, B.x.c0, B.y.c1, B.y.c0, C.x, C.y`.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ProofPoints(pub [[u8; WORD_LEN]; PROOF_POINTS]);

impl core::fmt::Debug for ProofPoints {
	fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
		f.debug_list()
			.entries(self.0.iter().map(|p| array_bytes::bytes2hex("0x", p)))
			.finish()
	}
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PaymasterPayload {
	pub mode: SpendingMode,
	/// Ring slot of the root the proof was computed against.
	pub merkle_root_index: u32,
	pub pool_id: PoolId,
	pub merkle_tree_depth: u8,
	pub nullifier: Field,
	pub points: ProofPoints,
}

impl PaymasterPayload {
	pub fn encode(&self) -> Vec<u8> {
		let mut bytes = vec![0u8; PAYMASTER_DATA_LEN];
		bytes[0] = PAYLOAD_VERSION;
		bytes[1] = self.mode.flag();
		bytes[ROOT_INDEX_OFFSET..WORD_LEN].copy_from_slice(&self.merkle_root_index.to_be_bytes());
		bytes[POOL_ID_WORD..DEPTH_WORD].copy_from_slice(self.pool_id.as_be_bytes());
		bytes[NULLIFIER_WORD - 1] = self.merkle_tree_depth;
		bytes[NULLIFIER_WORD..POINTS_WORD].copy_from_slice(&field_to_be_bytes(&self.nullifier));
		for (i, point) in self.points.0.iter().enumerate() {
			let start = POINTS_WORD + i * WORD_LEN;
			bytes[start..start + WORD_LEN].copy_from_slice(point);
		}
		bytes
	}

	pub fn decode(bytes: &[u8]) -> Result<Self, PayloadError> {
		if bytes.len() != PAYMASTER_DATA_LEN {
			return Err(PayloadError::Length { expected: PAYMASTER_DATA_LEN, actual: bytes.len() })
		}
		if bytes[0] != PAYLOAD_VERSION {
			return Err(PayloadError::UnsupportedVersion(bytes[0]))
		}
		let mode = SpendingMode::try_from(bytes[1])?;
		if bytes[2..ROOT_INDEX_OFFSET].iter().any(|b| *b != 0) {
			return Err(PayloadError::ReservedBytesSet)
		}
		let mut root_index = [0u8; 4];
		root_index.copy_from_slice(&bytes[ROOT_INDEX_OFFSET..WORD_LEN]);
		let merkle_root_index = u32::from_be_bytes(root_index);
		let pool_id = PoolId::from_be_bytes(word(bytes, 1));

		let depth_word = word(bytes, 2);
		let merkle_tree_depth = depth_word[WORD_LEN - 1];
		if depth_word[..WORD_LEN - 1].iter().any(|b| *b != 0) ||
			!(MIN_TREE_DEPTH..=MAX_TREE_DEPTH).contains(&merkle_tree_depth)
		{
			return Err(PayloadError::InvalidDepth)
		}
		let nullifier =
			field_from_be_bytes(&word(bytes, 3)).ok_or(PayloadError::NonCanonicalNullifier)?;

		let mut points = [[0u8; WORD_LEN]; PROOF_POINTS];
		for (i, point) in points.iter_mut().enumerate() {
			*point = word(bytes, 4 + i);
		}

		Ok(Self {
			mode,
			merkle_root_index,
			pool_id,
			merkle_tree_depth,
			nullifier,
			points: ProofPoints(points),
		})
	}
}

fn word(bytes: &[u8], n: usize) -> [u8; WORD_LEN] {
	let mut out = [0u8; WORD_LEN];
	out.copy_from_slice(&bytes[n * WORD_LEN..(n + 1) * WORD_LEN]);
	out
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::error::ContextError;

	fn payload() -> PaymasterPayload {
		let mut points = [[0u8; WORD_LEN]; PROOF_POINTS];
		for (i, p) in points.iter_mut().enumerate() {
			p[WORD_LEN - 1] = i as u8 + 1;
		}
		PaymasterPayload {
			mode: SpendingMode::SingleUseVoucher,
			merkle_root_index: 0x0102_0304,
			pool_id: PoolId::from(9),
			merkle_tree_depth: 20,
			nullifier: Field::from(77u64),
			points: ProofPoints(points),
		}
	}

	#[test]
	fn layout_is_word_aligned() {
		let bytes = payload().encode();
		assert_eq!(bytes.len(), 384);
		assert_eq!(&bytes[..2], &[0x01, 0x01]);
		assert_eq!(&bytes[2..28], &[0u8; 26]);
		assert_eq!(&bytes[28..32], &[0x01, 0x02, 0x03, 0x04]);
		assert_eq!(bytes[63], 9);
		assert_eq!(bytes[95], 20);
		assert_eq!(bytes[127], 77);
		for i in 0..PROOF_POINTS {
			assert_eq!(bytes[128 + i * 32 + 31], i as u8 + 1);
		}
	}

	#[test]
	fn zero_fields_are_still_written() {
		let mut zero = payload();
		zero.merkle_root_index = 0;
		zero.nullifier = Field::from(0u64);
		zero.points = ProofPoints::default();
		assert_eq!(zero.encode().len(), PAYMASTER_DATA_LEN);
	}

	#[test]
	fn decode_reads_back_encoding() {
		let original = payload();
		assert_eq!(PaymasterPayload::decode(&original.encode()), Ok(original));
	}

	#[test]
	fn decode_rejects_wrong_length() {
		let mut bytes = payload().encode();
		bytes.push(0);
		assert!(matches!(PaymasterPayload::decode(&bytes), Err(PayloadError::Length { .. })));
	}

	#[test]
	fn decode_rejects_unknown_mode() {
		let mut bytes = payload().encode();
		bytes[1] = 9;
		assert_eq!(
			PaymasterPayload::decode(&bytes),
			Err(PayloadError::Mode(ContextError::UnknownMode(9)))
		);
	}

	#[test]
	fn decode_rejects_reserved_and_depth_garbage() {
		let mut bytes = payload().encode();
		bytes[10] = 1;
		assert_eq!(PaymasterPayload::decode(&bytes), Err(PayloadError::ReservedBytesSet));

		let mut bytes = payload().encode();
		bytes[95] = 0;
		assert_eq!(PaymasterPayload::decode(&bytes), Err(PayloadError::InvalidDepth));
	}
}
