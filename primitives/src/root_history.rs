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

//! Bounded history of recent membership-tree roots.
//!
//! Mirrors the fee sponsor's on-chain circular buffer: `capacity` slots, the `n`-th recorded root
//! lands in slot `n % capacity` and overwrites whatever was there. Proofs reference a root by its
//! slot index, so the index arithmetic here must match the contract exactly.

use crate::{error::PoolError, Field};

/// Capacity of the fee sponsor's root ring buffer.
pub const DEFAULT_ROOT_HISTORY_CAPACITY: u32 = 64;

/// One slot of the ring.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RootHistoryEntry {
	/// Slot index in the ring, `< capacity`.
	pub index: u32,
	pub root: Field,
	/// Unix timestamp (seconds) of the block that recorded the root.
	pub created_at: u64,
	pub created_at_block: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RootHistory {
	slots: Vec<Option<RootHistoryEntry>>,
	/// Total number of roots ever recorded, including evicted ones.
	count: u64,
}

impl RootHistory {
	pub fn new(capacity: u32) -> Result<Self, PoolError> {
		if capacity == 0 {
			return Err(PoolError::ZeroCapacity)
		}
		Ok(Self { slots: vec![None; capacity as usize], count: 0 })
	}

	/// Rebuilds the ring from the slots an index reports.
	///
	/// `count` is the on-chain total of recorded roots. If an index reports the same slot twice
	/// (it lags behind an overwrite), the entry recorded later wins.
	pub fn from_entries(
		capacity: u32,
		count: u64,
		entries: impl IntoIterator<Item = RootHistoryEntry>,
	) -> Result<Self, PoolError> {
		let mut history = Self::new(capacity)?;
		let mut seen = 0u64;
		for entry in entries {
			if entry.index >= capacity {
				return Err(PoolError::SlotOutOfRange { index: entry.index, capacity })
			}
			let slot = &mut history.slots[entry.index as usize];
			let newer = slot.as_ref().map_or(true, |current| {
				(entry.created_at_block, entry.created_at) >=
					(current.created_at_block, current.created_at)
			});
			if slot.is_none() {
				seen += 1;
			}
			if newer {
				*slot = Some(entry);
			}
		}
		history.count = count.max(seen);
		Ok(history)
	}

	pub fn capacity(&self) -> u32 {
		self.slots.len() as u32
	}

	pub fn count(&self) -> u64 {
		self.count
	}

	pub fn is_empty(&self) -> bool {
		self.count == 0
	}

	/// Records a new root, evicting the oldest slot once the ring is full. Returns the slot.
	pub fn push(&mut self, root: Field, created_at: u64, created_at_block: u64) -> u32 {
		let index = (self.count % self.capacity() as u64) as u32;
		self.slots[index as usize] =
			Some(RootHistoryEntry { index, root, created_at, created_at_block });
		self.count += 1;
		index
	}

	/// Slot of the most recently recorded root, `(count - 1) mod capacity`.
	pub fn current_index(&self) -> u32 {
		match self.count {
			0 => 0,
			n => ((n - 1) % self.capacity() as u64) as u32,
		}
	}

	pub fn get(&self, index: u32) -> Option<&RootHistoryEntry> {
		self.slots.get(index as usize).and_then(Option::as_ref)
	}

	/// Slot holding `root`. When a root value occurs in several slots the most recent one wins.
	pub fn find(&self, root: &Field) -> Option<u32> {
		self.iter_recent().find(|entry| entry.root == *root).map(|entry| entry.index)
	}

	pub fn contains(&self, root: &Field) -> bool {
		self.find(root).is_some()
	}

	/// Occupied slots, most recent first.
	pub fn iter_recent(&self) -> impl Iterator<Item = &RootHistoryEntry> + '_ {
		let capacity = self.slots.len();
		let head = self.current_index() as usize;
		(0..capacity)
			.map(move |offset| (head + capacity - offset) % capacity)
			.filter_map(move |i| self.slots[i].as_ref())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn root(n: u64) -> Field {
		Field::from(1000 + n)
	}

	fn filled(capacity: u32, n: u64) -> RootHistory {
		let mut history = RootHistory::new(capacity).unwrap();
		for i in 0..n {
			history.push(root(i), i, i);
		}
		history
	}

	#[test]
	fn zero_capacity_is_rejected() {
		assert_eq!(RootHistory::new(0), Err(PoolError::ZeroCapacity));
	}

	#[test]
	fn empty_history_points_at_slot_zero() {
		let history = RootHistory::new(8).unwrap();
		assert!(history.is_empty());
		assert_eq!(history.current_index(), 0);
		assert_eq!(history.find(&root(0)), None);
	}

	#[test]
	fn push_fills_slots_in_order() {
		let history = filled(8, 5);
		assert_eq!(history.current_index(), 4);
		for i in 0..5 {
			assert_eq!(history.find(&root(i)), Some(i as u32));
		}
	}

	#[test]
	fn push_evicts_oldest_when_full() {
		let history = filled(4, 6);
		assert_eq!(history.count(), 6);
		// roots 0 and 1 were overwritten by roots 4 and 5
		assert_eq!(history.find(&root(0)), None);
		assert_eq!(history.find(&root(1)), None);
		assert_eq!(history.find(&root(4)), Some(0));
		assert_eq!(history.find(&root(5)), Some(1));
		assert_eq!(history.current_index(), 1);
	}

	#[test]
	fn duplicate_root_prefers_most_recent_slot() {
		let mut history = RootHistory::new(8).unwrap();
		history.push(root(0), 0, 0);
		history.push(root(1), 1, 1);
		history.push(root(0), 2, 2);
		history.push(root(2), 3, 3);
		assert_eq!(history.find(&root(0)), Some(2));
	}

	#[test]
	fn duplicate_root_prefers_most_recent_across_wraparound() {
		let mut history = RootHistory::new(4).unwrap();
		// slots: 0 <- r7 (overwritten later), 1 <- r1, 2 <- r2, 3 <- r7, then 0 <- r9
		for (i, n) in [7u64, 1, 2, 7, 9].into_iter().enumerate() {
			history.push(root(n), i as u64, i as u64);
		}
		assert_eq!(history.current_index(), 0);
		assert_eq!(history.find(&root(7)), Some(3));
	}

	#[test]
	fn iter_recent_walks_backwards_from_head() {
		let history = filled(4, 6);
		let order: Vec<u32> = history.iter_recent().map(|e| e.index).collect();
		assert_eq!(order, vec![1, 0, 3, 2]);
	}

	#[test]
	fn from_entries_rebuilds_ring() {
		let entries = (0..10u32).map(|i| RootHistoryEntry {
			index: i,
			root: root(i as u64),
			created_at: i as u64,
			created_at_block: i as u64,
		});
		let history = RootHistory::from_entries(64, 10, entries).unwrap();
		assert_eq!(history.current_index(), 9);
		assert_eq!(history.find(&root(3)), Some(3));
		assert_eq!(history.get(9).map(|e| e.root), Some(root(9)));
	}

	#[test]
	fn from_entries_keeps_latest_entry_per_slot() {
		let stale =
			RootHistoryEntry { index: 0, root: root(0), created_at: 1, created_at_block: 1 };
		let fresh =
			RootHistoryEntry { index: 0, root: root(4), created_at: 9, created_at_block: 9 };
		let history = RootHistory::from_entries(4, 5, vec![fresh.clone(), stale]).unwrap();
		assert_eq!(history.get(0), Some(&fresh));
		assert_eq!(history.find(&root(0)), None);
	}

	#[test]
	fn from_entries_rejects_out_of_range_slot() {
		let entry =
			RootHistoryEntry { index: 4, root: root(0), created_at: 0, created_at_block: 0 };
		assert_eq!(
			RootHistory::from_entries(4, 1, vec![entry]),
			Err(PoolError::SlotOutOfRange { index: 4, capacity: 4 })
		);
	}

	#[test]
	fn from_entries_never_undercounts() {
		let entries = (0..3u32).map(|i| RootHistoryEntry {
			index: i,
			root: root(i as u64),
			created_at: 0,
			created_at_block: 0,
		});
		let history = RootHistory::from_entries(8, 0, entries).unwrap();
		assert_eq!(history.count(), 3);
		assert_eq!(history.current_index(), 2);
	}
}
