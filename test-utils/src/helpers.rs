use crate::{BLOCKTIME, GENESIS_TIME};
use anon_paymaster_primitives::{
	root_history::DEFAULT_ROOT_HISTORY_CAPACITY, Address, Field, Member, Pool, PoolId,
	PoolMetadata, RootHistory, RootHistoryEntry,
};
use anon_paymaster_prover::{Identity, MembershipTree};

/// A pool as the contract would hold it: every join appends a leaf and records the new root.
#[derive(Clone, Debug)]
pub struct PoolFixture {
	pool_id: PoolId,
	tree: MembershipTree,
	identities: Vec<Identity>,
	history: RootHistory,
	/// Root after each join, in order
	roots: Vec<Field>,
}

impl PoolFixture {
	pub fn new(pool_id: u64, depth: u8) -> Self {
		Self::with_capacity(pool_id, depth, DEFAULT_ROOT_HISTORY_CAPACITY)
	}

	pub fn with_capacity(pool_id: u64, depth: u8, capacity: u32) -> Self {
		Self {
			pool_id: PoolId::from(pool_id),
			tree: MembershipTree::new(depth).unwrap(),
			identities: Vec::new(),
			history: RootHistory::new(capacity).unwrap(),
			roots: Vec::new(),
		}
	}

	/// Join `n` well-known identities, see [`Self::identity`].
	pub fn with_members(mut self, n: usize) -> Self {
		for _ in 0..n {
			let identity = well_known_identity(self.pool_id, self.identities.len());
			self.join(identity);
		}
		self
	}

	pub fn join(&mut self, identity: Identity) -> u64 {
		let index = self.tree.insert(identity.commitment()).unwrap();
		let root = self.tree.root();
		let n = self.roots.len() as u64;
		self.history.push(root, GENESIS_TIME + n * BLOCKTIME, n + 1);
		self.roots.push(root);
		self.identities.push(identity);
		index
	}

	/// Identity of the member that joined `n`-th (0-based).
	pub fn identity(&self, n: usize) -> Identity {
		self.identities[n].clone()
	}

	pub fn pool_id(&self) -> PoolId {
		self.pool_id
	}

	pub fn current_root(&self) -> Field {
		self.tree.root()
	}

	/// Root right after the `n`-th join (1-based, `root_after(1)` has a single member).
	pub fn root_after(&self, n: usize) -> Field {
		self.roots[n - 1]
	}

	pub fn metadata(&self) -> PoolMetadata {
		PoolMetadata {
			pool_id: self.pool_id,
			paymaster: Address::new([0xaa; 20]),
			joining_fee: 10u128.pow(16),
			merkle_tree_depth: self.tree.depth(),
			merkle_tree_size: self.tree.len(),
			current_merkle_tree_root: self.tree.root(),
			root_history_count: self.history.count(),
		}
	}

	/// Occupied ring slots as the index lists them, newest first.
	pub fn root_history(&self) -> Vec<RootHistoryEntry> {
		self.history.iter_recent().cloned().collect()
	}

	pub fn members(&self) -> Vec<Member> {
		self.identities
			.iter()
			.enumerate()
			.map(|(index, identity)| Member {
				index: index as u64,
				commitment: identity.commitment(),
			})
			.collect()
	}

	pub fn pool(&self) -> Pool {
		Pool::new(self.metadata(), self.history.capacity(), self.root_history()).unwrap()
	}
}

fn well_known_identity(pool_id: PoolId, n: usize) -> Identity {
	Identity::from_phrase(&format!("pool {} member {}", pool_id, n)).unwrap()
}
