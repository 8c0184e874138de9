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

//! The part of a user operation a membership proof is bound to.

use anon_paymaster_primitives::{
	common::{hash_to_field, WORD_LEN},
	Address, Field,
};
use sha3::{Digest, Keccak256};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserOperationIntent {
	pub sender: Address,
	/// `uint256` nonce, big-endian
	pub nonce: [u8; WORD_LEN],
	pub call_data: Vec<u8>,
	pub entry_point: Address,
	pub chain_id: u64,
}

impl UserOperationIntent {
	/// `hashToField(sender ++ nonce ++ keccak256(callData) ++ entryPoint ++ chainId)`
	///
	/// Addresses are packed as 20 bytes, nonce and chain id as 32 byte words.
	pub fn message(&self) -> Field {
		let mut packed = Vec::with_capacity(20 + WORD_LEN + WORD_LEN + 20 + WORD_LEN);
		packed.extend_from_slice(self.sender.as_bytes());
		packed.extend_from_slice(&self.nonce);
		packed.extend_from_slice(&Keccak256::digest(&self.call_data));
		packed.extend_from_slice(self.entry_point.as_bytes());
		let mut chain_id = [0u8; WORD_LEN];
		chain_id[WORD_LEN - 8..].copy_from_slice(&self.chain_id.to_be_bytes());
		packed.extend_from_slice(&chain_id);
		hash_to_field(&packed)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn intent() -> UserOperationIntent {
		UserOperationIntent {
			sender: Address::new([0x11; 20]),
			nonce: [0u8; WORD_LEN],
			call_data: vec![0xde, 0xad, 0xbe, 0xef],
			entry_point: Address::new([0x22; 20]),
			chain_id: 11155111,
		}
	}

	#[test]
	fn message_is_deterministic() {
		assert_eq!(intent().message(), intent().message());
	}

	#[test]
	fn every_field_is_bound() {
		let base = intent().message();

		let mut other = intent();
		other.nonce[WORD_LEN - 1] = 1;
		assert_ne!(other.message(), base);

		let mut other = intent();
		other.call_data.push(0);
		assert_ne!(other.message(), base);

		let mut other = intent();
		other.chain_id = 1;
		assert_ne!(other.message(), base);

		let mut other = intent();
		other.entry_point = Address::new([0x33; 20]);
		assert_ne!(other.message(), base);
	}
}
