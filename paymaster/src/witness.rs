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

//! Membership paths rebuilt from the index's member list.

use crate::error::Error;
use anon_paymaster_primitives::{Field, Member};
use anon_paymaster_prover::{MembershipTree, MembershipWitness, ProverError};

/// Path of `commitment` in the tree as it stood when its root was `root`.
///
/// Replays the members in leaf order until the local tree reproduces `root`, so members that
/// joined after the root was recorded are left out.
pub fn membership_witness(
	depth: u8,
	members: &[Member],
	root: &Field,
	commitment: &Field,
) -> Result<MembershipWitness, Error> {
	let leaves = ordered_leaves(members)?;
	let tree = MembershipTree::replay_to_root(depth, &leaves, root)?
		.ok_or(ProverError::RootNotReproducible(*root))?;
	let leaf_index = tree.index_of(commitment).ok_or(ProverError::NotAMember)?;
	Ok(tree.witness(leaf_index).ok_or(ProverError::NotAMember)?)
}

/// Commitments by leaf index. The index must list every leaf exactly once.
fn ordered_leaves(members: &[Member]) -> Result<Vec<Field>, Error> {
	let mut sorted: Vec<&Member> = members.iter().collect();
	sorted.sort_by_key(|member| member.index);
	sorted
		.iter()
		.enumerate()
		.map(|(position, member)| {
			if member.index == position as u64 {
				Ok(member.commitment)
			} else {
				Err(Error::IndexUnavailable(format!(
					"member list has no leaf {} (next listed leaf is {})",
					position, member.index
				)))
			}
		})
		.collect()
}
