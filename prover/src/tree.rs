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

//! Fixed-depth append-only membership tree.
//!
//! Mirrors the pool contract's tree: leaves are identity commitments in insertion order,
//! empty positions hold the zero hash of their level and inner nodes are
//! `Poseidon(left, right)`. Only the populated prefix of every level is stored.

use crate::{circuit::hash_nodes, error::ProverError};
use anon_paymaster_primitives::{
	pool::{MAX_TREE_DEPTH, MIN_TREE_DEPTH},
	Field,
};
use ark_ff::Zero;

/// Authentication path of one leaf.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MembershipWitness {
	pub leaf_index: u64,
	/// Sibling nodes, leaf level first.
	pub siblings: Vec<Field>,
}

impl MembershipWitness {
	pub fn depth(&self) -> usize {
		self.siblings.len()
	}

	/// `true` at each level where the path node is the right child.
	pub fn path_bits(&self) -> Vec<bool> {
		(0..self.siblings.len()).map(|level| (self.leaf_index >> level) & 1 == 1).collect()
	}

	/// Root obtained by hashing `leaf` up along this path.
	pub fn compute_root(&self, leaf: &Field) -> Field {
		self.siblings.iter().zip(self.path_bits()).fold(*leaf, |node, (sibling, is_right)| {
			if is_right {
				hash_nodes(sibling, &node)
			} else {
				hash_nodes(&node, sibling)
			}
		})
	}
}

#[derive(Clone, Debug)]
pub struct MembershipTree {
	depth: u8,
	/// `zeros[l]` is the root of an empty subtree of height `l`.
	zeros: Vec<Field>,
	/// `layers[0]` are the leaves, `layers[depth]` holds the root once anything was inserted.
	layers: Vec<Vec<Field>>,
}

impl MembershipTree {
	pub fn new(depth: u8) -> Result<Self, ProverError> {
		if !(MIN_TREE_DEPTH..=MAX_TREE_DEPTH).contains(&depth) {
			return Err(ProverError::InvalidDepth(depth))
		}
		let mut zeros = Vec::with_capacity(depth as usize + 1);
		zeros.push(Field::zero());
		for level in 0..depth as usize {
			zeros.push(hash_nodes(&zeros[level], &zeros[level]));
		}
		Ok(Self { depth, zeros, layers: vec![Vec::new(); depth as usize + 1] })
	}

	pub fn from_leaves(depth: u8, leaves: &[Field]) -> Result<Self, ProverError> {
		let mut tree = Self::new(depth)?;
		for leaf in leaves {
			tree.insert(*leaf)?;
		}
		Ok(tree)
	}

	/// Rebuild the tree from `members` in insertion order, stopping at the longest prefix
	/// whose root equals `root`.
	///
	/// Members appended after `root` was recorded are ignored. `None` if no prefix matches.
	pub fn replay_to_root(
		depth: u8,
		members: &[Field],
		root: &Field,
	) -> Result<Option<Self>, ProverError> {
		let mut tree = Self::new(depth)?;
		let mut matching_len = (tree.root() == *root).then_some(0);
		for (n, member) in members.iter().enumerate() {
			tree.insert(*member)?;
			if tree.root() == *root {
				matching_len = Some(n + 1);
			}
		}
		match matching_len {
			Some(len) if len == members.len() => Ok(Some(tree)),
			Some(len) => Self::from_leaves(depth, &members[..len]).map(Some),
			None => Ok(None),
		}
	}

	pub fn depth(&self) -> u8 {
		self.depth
	}

	pub fn len(&self) -> u64 {
		self.layers[0].len() as u64
	}

	pub fn is_empty(&self) -> bool {
		self.layers[0].is_empty()
	}

	pub fn root(&self) -> Field {
		self.layers[self.depth as usize]
			.first()
			.copied()
			.unwrap_or(self.zeros[self.depth as usize])
	}

	/// Append a leaf, returning its index.
	pub fn insert(&mut self, leaf: Field) -> Result<u64, ProverError> {
		let index = self.len();
		if index >= 1u64 << self.depth {
			return Err(ProverError::TreeFull(self.depth))
		}

		let mut position = index as usize;
		let mut node = leaf;
		self.layers[0].push(leaf);
		for level in 0..self.depth as usize {
			let sibling = self.node(level, position ^ 1);
			node = if position % 2 == 0 {
				hash_nodes(&node, &sibling)
			} else {
				hash_nodes(&sibling, &node)
			};
			position /= 2;

			let parent = &mut self.layers[level + 1];
			if position < parent.len() {
				parent[position] = node;
			} else {
				parent.push(node);
			}
		}
		Ok(index)
	}

	pub fn index_of(&self, leaf: &Field) -> Option<u64> {
		self.layers[0].iter().position(|l| l == leaf).map(|i| i as u64)
	}

	pub fn witness(&self, leaf_index: u64) -> Option<MembershipWitness> {
		if leaf_index >= self.len() {
			return None
		}
		let siblings = (0..self.depth as usize)
			.map(|level| self.node(level, ((leaf_index >> level) as usize) ^ 1))
			.collect();
		Some(MembershipWitness { leaf_index, siblings })
	}

	fn node(&self, level: usize, position: usize) -> Field {
		self.layers[level].get(position).copied().unwrap_or(self.zeros[level])
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::*;

	fn leaves(n: u64) -> Vec<Field> {
		(1..=n).map(Field::from).collect()
	}

	#[test]
	fn empty_root_is_zero_hash_chain() {
		let tree = MembershipTree::new(2).unwrap();
		let level1 = hash_nodes(&Field::zero(), &Field::zero());
		assert_eq!(tree.root(), hash_nodes(&level1, &level1));
		assert!(tree.is_empty());
	}

	#[test]
	fn root_matches_naive_computation() {
		let tree = MembershipTree::from_leaves(2, &leaves(3)).unwrap();
		let left = hash_nodes(&Field::from(1u64), &Field::from(2u64));
		let right = hash_nodes(&Field::from(3u64), &Field::zero());
		assert_eq!(tree.root(), hash_nodes(&left, &right));
	}

	#[rstest(depth, count, case(1, 2), case(3, 5), case(4, 16), case(20, 7))]
	fn every_witness_leads_to_root(depth: u8, count: u64) {
		let tree = MembershipTree::from_leaves(depth, &leaves(count)).unwrap();
		for index in 0..count {
			let witness = tree.witness(index).unwrap();
			assert_eq!(witness.depth(), depth as usize);
			assert_eq!(witness.compute_root(&Field::from(index + 1)), tree.root());
		}
	}

	#[test]
	fn witness_for_absent_leaf_is_none() {
		let tree = MembershipTree::from_leaves(3, &leaves(2)).unwrap();
		assert_eq!(tree.witness(2), None);
	}

	#[test]
	fn insert_into_full_tree_fails() {
		let mut tree = MembershipTree::from_leaves(1, &leaves(2)).unwrap();
		assert!(matches!(tree.insert(Field::from(9u64)), Err(ProverError::TreeFull(1))));
	}

	#[rstest(depth, case(0), case(33))]
	fn unsupported_depth_is_rejected(depth: u8) {
		assert!(matches!(
			MembershipTree::new(depth),
			Err(ProverError::InvalidDepth(d)) if d == depth
		));
	}

	#[test]
	fn replay_stops_at_historic_root() {
		let members = leaves(6);
		let historic = MembershipTree::from_leaves(4, &members[..4]).unwrap().root();

		let replayed = MembershipTree::replay_to_root(4, &members, &historic).unwrap().unwrap();
		assert_eq!(replayed.len(), 4);
		assert_eq!(replayed.root(), historic);
		assert_eq!(replayed.index_of(&Field::from(5u64)), None);
	}

	#[test]
	fn replay_of_unknown_root_is_none() {
		let replayed =
			MembershipTree::replay_to_root(4, &leaves(6), &Field::from(1234u64)).unwrap();
		assert!(replayed.is_none());
	}
}
