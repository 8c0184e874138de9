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

use crate::{serde_hex::serialize_array, Field};
use ark_ff::{BigInteger, PrimeField};
use core::{fmt, str::FromStr};
use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};

/// Size of an EVM word. Every field of the fee sponsor's data is word aligned.
pub const WORD_LEN: usize = 32;

/// On-chain pool identifier (`uint256`), stored big-endian.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PoolId(#[serde(with = "serialize_array")] [u8; WORD_LEN]);

impl PoolId {
	pub const fn from_be_bytes(bytes: [u8; WORD_LEN]) -> Self {
		Self(bytes)
	}

	pub fn as_be_bytes(&self) -> &[u8; WORD_LEN] {
		&self.0
	}

	pub fn is_zero(&self) -> bool {
		self.0 == [0u8; WORD_LEN]
	}

	/// Scope of the membership proof for this pool, `keccak256(poolId) >> 8`.
	pub fn scope(&self) -> Field {
		hash_to_field(&self.0)
	}
}

impl From<u64> for PoolId {
	fn from(id: u64) -> Self {
		let mut bytes = [0u8; WORD_LEN];
		bytes[WORD_LEN - 8..].copy_from_slice(&id.to_be_bytes());
		Self(bytes)
	}
}

impl FromStr for PoolId {
	type Err = &'static str;

	/// Accepts decimal as well as `0x` hex, the index serves both.
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		parse_uint256(s).map(Self).ok_or("invalid pool id")
	}
}

impl fmt::Display for PoolId {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		f.write_str(&array_bytes::bytes2hex("0x", self.0))
	}
}

impl fmt::Debug for PoolId {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "PoolId({})", self)
	}
}

/// 20 byte EVM account address.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Address(#[serde(with = "serialize_array")] [u8; 20]);

impl Address {
	pub const fn new(bytes: [u8; 20]) -> Self {
		Self(bytes)
	}

	pub fn as_bytes(&self) -> &[u8; 20] {
		&self.0
	}
}

impl FromStr for Address {
	type Err = &'static str;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		array_bytes::hex2array::<_, 20>(s.trim_start_matches("0x"))
			.map(Self)
			.map_err(|_| "invalid hex address.")
	}
}

impl fmt::Display for Address {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		f.write_str(&array_bytes::bytes2hex("0x", self.0))
	}
}

impl fmt::Debug for Address {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "Address({})", self)
	}
}

/// Big-endian 32 byte encoding of a prime field element, as the EVM expects it.
pub fn field_to_be_bytes<F: PrimeField>(field: &F) -> [u8; WORD_LEN] {
	let repr = field.into_bigint().to_bytes_be();
	let mut bytes = [0u8; WORD_LEN];
	let len = repr.len().min(WORD_LEN);
	bytes[WORD_LEN - len..].copy_from_slice(&repr[repr.len() - len..]);
	bytes
}

/// Inverse of [`field_to_be_bytes`]. Non-canonical encodings (value >= modulus) are rejected.
pub fn field_from_be_bytes<F: PrimeField>(bytes: &[u8; WORD_LEN]) -> Option<F> {
	let field = F::from_be_bytes_mod_order(bytes);
	(field_to_be_bytes(&field) == *bytes).then_some(field)
}

/// `keccak256(data) >> 8`. The shift keeps the result below the BN254 scalar modulus, so the
/// mapping is the same one a solidity verifier can reproduce cheaply.
pub fn hash_to_field(data: &[u8]) -> Field {
	let digest = Keccak256::digest(data);
	let mut shifted = [0u8; WORD_LEN];
	shifted[1..].copy_from_slice(&digest[..WORD_LEN - 1]);
	Field::from_be_bytes_mod_order(&shifted)
}

/// Parses a `uint256` given either as decimal or as `0x` hex string.
pub fn parse_uint256(s: &str) -> Option<[u8; WORD_LEN]> {
	let s = s.trim();
	if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
		if hex.is_empty() || hex.len() > 2 * WORD_LEN {
			return None
		}
		return array_bytes::hex2array::<_, WORD_LEN>(format!("{:0>64}", hex)).ok()
	}
	if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
		return None
	}
	let mut out = [0u8; WORD_LEN];
	for digit in s.bytes().map(|b| b - b'0') {
		let mut carry = digit as u16;
		for byte in out.iter_mut().rev() {
			let v = (*byte as u16) * 10 + carry;
			*byte = v as u8;
			carry = v >> 8;
		}
		if carry != 0 {
			// overflow
			return None
		}
	}
	Some(out)
}

/// Parses a field element from a decimal or hex string. Values >= modulus are rejected.
pub fn parse_field(s: &str) -> Option<Field> {
	parse_uint256(s).and_then(|bytes| field_from_be_bytes(&bytes))
}
