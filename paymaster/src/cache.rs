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

//! Read-through cache of pool snapshots.
//!
//! Only whole snapshots are cached. Member lists always go to the index, a witness must be
//! built from members at least as new as the resolved root.

use crate::{
	config::EngineConfig,
	gateway::{GatewayError, PoolIndexGateway},
};
use anon_paymaster_primitives::{Member, Pool, PoolId, PoolMetadata, RootHistoryEntry};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::{
	collections::HashMap,
	sync::atomic::{AtomicU64, Ordering},
	time::{Duration, Instant},
};

const LOG: &str = "anon-paymaster::cache";

struct CachedSnapshot {
	pool: Pool,
	fetched_at: Instant,
	/// Insertion order, for eviction
	sequence: u64,
}

pub struct CachedGateway<G> {
	inner: G,
	ttl: Duration,
	capacity: usize,
	snapshots: RwLock<HashMap<PoolId, CachedSnapshot>>,
	sequence: AtomicU64,
}

impl<G: PoolIndexGateway> CachedGateway<G> {
	pub fn new(inner: G, ttl: Duration, capacity: usize) -> Self {
		Self { inner, ttl, capacity, snapshots: Default::default(), sequence: AtomicU64::new(0) }
	}

	pub fn from_config(inner: G, config: &EngineConfig) -> Self {
		Self::new(inner, config.cache_ttl(), config.cache_capacity)
	}

	pub fn inner(&self) -> &G {
		&self.inner
	}

	pub fn len(&self) -> usize {
		self.snapshots.read().len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	fn fresh(&self, pool_id: &PoolId, history_capacity: u32) -> Option<Pool> {
		let snapshots = self.snapshots.read();
		let cached = snapshots.get(pool_id)?;
		(cached.fetched_at.elapsed() < self.ttl &&
			cached.pool.root_history.capacity() == history_capacity)
			.then(|| cached.pool.clone())
	}

	fn store(&self, pool: Pool) {
		if self.capacity == 0 {
			return
		}
		let mut snapshots = self.snapshots.write();
		if snapshots.len() >= self.capacity && !snapshots.contains_key(&pool.id()) {
			let oldest = snapshots
				.iter()
				.min_by_key(|(_, cached)| cached.sequence)
				.map(|(pool_id, _)| *pool_id);
			if let Some(oldest) = oldest {
				snapshots.remove(&oldest);
			}
		}
		let sequence = self.sequence.fetch_add(1, Ordering::Relaxed);
		snapshots.insert(pool.id(), CachedSnapshot { pool, fetched_at: Instant::now(), sequence });
	}
}

#[async_trait]
impl<G: PoolIndexGateway> PoolIndexGateway for CachedGateway<G> {
	async fn fetch_pool(&self, pool_id: PoolId) -> Result<PoolMetadata, GatewayError> {
		self.inner.fetch_pool(pool_id).await
	}

	async fn fetch_root_history(
		&self,
		pool_id: PoolId,
	) -> Result<Vec<RootHistoryEntry>, GatewayError> {
		self.inner.fetch_root_history(pool_id).await
	}

	async fn fetch_members(&self, pool_id: PoolId) -> Result<Vec<Member>, GatewayError> {
		self.inner.fetch_members(pool_id).await
	}

	fn invalidate(&self, pool_id: &PoolId) {
		if self.snapshots.write().remove(pool_id).is_some() {
			log::debug!(target: LOG, "dropped cached snapshot of pool {}", pool_id);
		}
		self.inner.invalidate(pool_id);
	}

	async fn fetch_snapshot(
		&self,
		pool_id: PoolId,
		history_capacity: u32,
	) -> Result<Pool, GatewayError> {
		if let Some(pool) = self.fresh(&pool_id, history_capacity) {
			log::debug!(target: LOG, "using cached snapshot of pool {}", pool_id);
			return Ok(pool)
		}
		match self.inner.fetch_snapshot(pool_id, history_capacity).await {
			Ok(pool) => {
				self.store(pool.clone());
				Ok(pool)
			},
			Err(e) => {
				log::warn!(target: LOG, "snapshot of pool {} not cached: {}", pool_id, e);
				Err(e)
			},
		}
	}
}
