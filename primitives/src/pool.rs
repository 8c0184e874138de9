use crate::{
	error::PoolError,
	root_history::{RootHistory, RootHistoryEntry},
	Address, Field, PoolId,
};

/// Shallowest tree the fee sponsor has a verifier for.
pub const MIN_TREE_DEPTH: u8 = 1;
/// Deepest tree the fee sponsor has a verifier for.
pub const MAX_TREE_DEPTH: u8 = 32;

/// Pool state as materialized by the index, without its root history.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PoolMetadata {
	pub pool_id: PoolId,
	/// Fee sponsor contract that verifies proofs for this pool.
	pub paymaster: Address,
	/// Wei paid per member on joining.
	pub joining_fee: u128,
	pub merkle_tree_depth: u8,
	pub merkle_tree_size: u64,
	pub current_merkle_tree_root: Field,
	/// Total roots ever recorded in the ring buffer.
	pub root_history_count: u64,
}

/// A pool snapshot: metadata plus the ring of recently valid roots. Read-only for this crate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pool {
	pub metadata: PoolMetadata,
	pub root_history: RootHistory,
}

impl Pool {
	pub fn new(
		metadata: PoolMetadata,
		history_capacity: u32,
		entries: impl IntoIterator<Item = RootHistoryEntry>,
	) -> Result<Self, PoolError> {
		let depth = metadata.merkle_tree_depth;
		if !(MIN_TREE_DEPTH..=MAX_TREE_DEPTH).contains(&depth) {
			return Err(PoolError::InvalidDepth(depth))
		}
		let root_history =
			RootHistory::from_entries(history_capacity, metadata.root_history_count, entries)?;
		Ok(Self { metadata, root_history })
	}

	pub fn id(&self) -> PoolId {
		self.metadata.pool_id
	}

	pub fn depth(&self) -> u8 {
		self.metadata.merkle_tree_depth
	}

	pub fn current_root(&self) -> Field {
		self.metadata.current_merkle_tree_root
	}

	/// A root is valid while it sits in the ring or is the current root.
	pub fn is_valid_root(&self, root: &Field) -> bool {
		*root == self.current_root() || self.root_history.contains(root)
	}
}

/// A pool member as listed by the index, in insertion order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Member {
	/// Leaf index in the membership tree.
	pub index: u64,
	/// `Poseidon(secret)` of the member's identity.
	pub commitment: Field,
}
