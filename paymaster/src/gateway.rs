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

//! Read access to the external pool index.

use anon_paymaster_primitives::{Member, Pool, PoolId, PoolMetadata, RootHistoryEntry};
use async_trait::async_trait;
use std::{sync::Arc, time::Duration};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
	#[error("pool {0} not found")]
	PoolNotFound(PoolId),
	#[error("index request failed: {0}")]
	Transport(String),
	#[error("index answered with http status {0}")]
	Status(u16),
	#[error("index query failed: {0}")]
	Query(String),
	#[error("malformed index response: {0}")]
	Malformed(String),
	#[error("index did not answer within {0:?}")]
	Timeout(Duration),
}

/// Source of pool state. All methods are side-effect free.
#[async_trait]
pub trait PoolIndexGateway: Send + Sync {
	async fn fetch_pool(&self, pool_id: PoolId) -> Result<PoolMetadata, GatewayError>;

	/// Occupied ring slots, in any order.
	async fn fetch_root_history(
		&self,
		pool_id: PoolId,
	) -> Result<Vec<RootHistoryEntry>, GatewayError>;

	/// Members ordered by leaf index.
	async fn fetch_members(&self, pool_id: PoolId) -> Result<Vec<Member>, GatewayError>;

	/// Metadata and root history of a pool, assembled into a snapshot.
	async fn fetch_snapshot(
		&self,
		pool_id: PoolId,
		history_capacity: u32,
	) -> Result<Pool, GatewayError> {
		fetch_pool_snapshot(self, pool_id, history_capacity).await
	}

	/// Drop anything remembered about `pool_id`. Gateways without local state ignore this.
	fn invalidate(&self, _pool_id: &PoolId) {}
}

pub async fn fetch_pool_snapshot<G: PoolIndexGateway + ?Sized>(
	gateway: &G,
	pool_id: PoolId,
	history_capacity: u32,
) -> Result<Pool, GatewayError> {
	let metadata = gateway.fetch_pool(pool_id).await?;
	if metadata.pool_id != pool_id {
		return Err(GatewayError::Malformed(format!(
			"asked for pool {} but got {}",
			pool_id, metadata.pool_id
		)))
	}
	let entries = gateway.fetch_root_history(pool_id).await?;
	Pool::new(metadata, history_capacity, entries)
		.map_err(|e| GatewayError::Malformed(e.to_string()))
}

#[async_trait]
impl<G: PoolIndexGateway + ?Sized> PoolIndexGateway for Arc<G> {
	async fn fetch_pool(&self, pool_id: PoolId) -> Result<PoolMetadata, GatewayError> {
		(**self).fetch_pool(pool_id).await
	}

	async fn fetch_root_history(
		&self,
		pool_id: PoolId,
	) -> Result<Vec<RootHistoryEntry>, GatewayError> {
		(**self).fetch_root_history(pool_id).await
	}

	async fn fetch_members(&self, pool_id: PoolId) -> Result<Vec<Member>, GatewayError> {
		(**self).fetch_members(pool_id).await
	}

	async fn fetch_snapshot(
		&self,
		pool_id: PoolId,
		history_capacity: u32,
	) -> Result<Pool, GatewayError> {
		(**self).fetch_snapshot(pool_id, history_capacity).await
	}

	fn invalidate(&self, pool_id: &PoolId) {
		(**self).invalidate(pool_id)
	}
}
