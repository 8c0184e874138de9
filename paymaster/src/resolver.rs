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

use crate::error::Error;
use anon_paymaster_primitives::{Field, Pool};

const LOG: &str = "anon-paymaster::resolver";

/// A root the fee sponsor will accept, with the ring slot it is referenced by.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResolvedRoot {
	pub root: Field,
	pub root_index: u32,
}

/// Picks the membership root a proof is computed against.
#[derive(Clone, Copy, Debug, Default)]
pub struct MerkleRootResolver;

impl MerkleRootResolver {
	/// Without `requested`, the pool's current root. Otherwise the most recent ring slot
	/// holding `requested`, falling back to the current slot if it is the current root.
	pub fn resolve(&self, pool: &Pool, requested: Option<&Field>) -> Result<ResolvedRoot, Error> {
		let current_index = pool.root_history.current_index();
		let Some(root) = requested else {
			log::debug!(
				target: LOG,
				"pool {}: using current root at slot {}",
				pool.id(),
				current_index
			);
			return Ok(ResolvedRoot { root: pool.current_root(), root_index: current_index })
		};

		if let Some(root_index) = pool.root_history.find(root) {
			log::debug!(
				target: LOG,
				"pool {}: requested root found at slot {}",
				pool.id(),
				root_index
			);
			return Ok(ResolvedRoot { root: *root, root_index })
		}
		if *root == pool.current_root() {
			return Ok(ResolvedRoot { root: *root, root_index: current_index })
		}

		Err(Error::StaleOrUnknownRoot { pool_id: pool.id(), root: *root })
	}
}
