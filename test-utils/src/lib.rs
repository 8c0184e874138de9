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

//! Shared fixtures for the engine and rpc tests.

use anon_paymaster_prover::{
	prover::{test_fixtures, verify_proof},
	MembershipProof, ProvingKeyStore,
};
use std::sync::Arc;

pub mod helpers;

pub use helpers::PoolFixture;

/// Tree depth used by tests that actually prove. Deep trees make setup slow.
pub const TEST_DEPTH: u8 = 4;
pub const GENESIS_TIME: u64 = 1_700_000_000; // [s]
pub const BLOCKTIME: u64 = 12; // 12s per block

/// Proving keys from the deterministic test setup, shared across tests of one binary.
pub fn test_key_store(depths: &[u8]) -> Arc<ProvingKeyStore> {
	test_fixtures::test_key_store(depths)
}

/// Verify `proof` with the test setup's verifying key for its depth.
pub fn verify(proof: &MembershipProof) -> bool {
	let setup = test_fixtures::get_test_setup(proof.merkle_tree_depth);
	let valid = verify_proof(&setup.verifying_key, proof);
	if !valid {
		log::warn!("test proof at depth {} does not verify", proof.merkle_tree_depth);
	}
	valid
}
