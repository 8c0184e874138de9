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

//! In-memory pool index for tests and local development.

use crate::gateway::{GatewayError, PoolIndexGateway};
use anon_paymaster_primitives::{Member, PoolId, PoolMetadata, RootHistoryEntry};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::{
	collections::HashMap,
	sync::atomic::{AtomicUsize, Ordering},
	time::Duration,
};

#[derive(Clone, Debug)]
pub struct IndexedPool {
	pub metadata: PoolMetadata,
	pub root_history: Vec<RootHistoryEntry>,
	pub members: Vec<Member>,
}

#[cfg(test)]
impl From<&test_utils::PoolFixture> for IndexedPool {
	fn from(fixture: &test_utils::PoolFixture) -> Self {
		Self {
			metadata: fixture.metadata(),
			root_history: fixture.root_history(),
			members: fixture.members(),
		}
	}
}

#[derive(Default)]
pub struct MockGateway {
	pools: RwLock<HashMap<PoolId, IndexedPool>>,
	failure: RwLock<Option<GatewayError>>,
	delay: RwLock<Option<Duration>>,
	calls: AtomicUsize,
}

impl MockGateway {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_pool(self, pool: IndexedPool) -> Self {
		self.insert(pool);
		self
	}

	pub fn insert(&self, pool: IndexedPool) {
		self.pools.write().insert(pool.metadata.pool_id, pool);
	}

	/// Make every call fail with `failure` until cleared with `None`.
	pub fn set_failure(&self, failure: Option<GatewayError>) {
		*self.failure.write() = failure;
	}

	/// Delay every answer, for timeout tests.
	pub fn set_delay(&self, delay: Option<Duration>) {
		*self.delay.write() = delay;
	}

	/// Number of gateway calls served so far, including failed ones.
	pub fn calls(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}

	async fn lookup<T>(
		&self,
		pool_id: PoolId,
		select: impl FnOnce(&IndexedPool) -> T,
	) -> Result<T, GatewayError> {
		self.calls.fetch_add(1, Ordering::SeqCst);
		let delay = *self.delay.read();
		if let Some(delay) = delay {
			tokio::time::sleep(delay).await;
		}
		let failure = self.failure.read().clone();
		if let Some(failure) = failure {
			return Err(failure)
		}
		self.pools.read().get(&pool_id).map(select).ok_or(GatewayError::PoolNotFound(pool_id))
	}
}

#[async_trait]
impl PoolIndexGateway for MockGateway {
	async fn fetch_pool(&self, pool_id: PoolId) -> Result<PoolMetadata, GatewayError> {
		self.lookup(pool_id, |pool| pool.metadata.clone()).await
	}

	async fn fetch_root_history(
		&self,
		pool_id: PoolId,
	) -> Result<Vec<RootHistoryEntry>, GatewayError> {
		self.lookup(pool_id, |pool| pool.root_history.clone()).await
	}

	async fn fetch_members(&self, pool_id: PoolId) -> Result<Vec<Member>, GatewayError> {
		self.lookup(pool_id, |pool| pool.members.clone()).await
	}
}
