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

//! Pool index gateway speaking GraphQL over HTTP.
//!
//! The index serves `uint256` values as strings, some deployments in decimal and some as
//! `0x` hex. Small integers may also arrive as JSON numbers.

use crate::{
	config::EngineConfig,
	gateway::{GatewayError, PoolIndexGateway},
};
use anon_paymaster_primitives::{
	common::{parse_field, parse_uint256, WORD_LEN},
	Address, Field, Member, PoolId, PoolMetadata, RootHistoryEntry,
};
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::json;

const LOG: &str = "anon-paymaster::graphql";

const POOL_QUERY: &str = r#"query Pool($id: ID!) {
  pool(id: $id) {
    poolId
    paymaster
    joiningFee
    merkleTreeDepth
    merkleTreeSize
    currentMerkleTreeRoot
    rootHistoryCount
  }
}"#;

const ROOTS_QUERY: &str = r#"query Roots($pool: String!, $first: Int!) {
  merkleRoots(where: { pool: $pool }, orderBy: createdAt, orderDirection: desc, first: $first) {
    rootIndex
    root
    createdAt
    createdAtBlock
  }
}"#;

const MEMBERS_QUERY: &str = r#"query Members($pool: String!, $first: Int!, $skip: Int!) {
  poolMembers(
    where: { pool: $pool }
    orderBy: memberIndex
    orderDirection: asc
    first: $first
    skip: $skip
  ) {
    memberIndex
    identityCommitment
  }
}"#;

pub struct GraphQlGateway {
	client: reqwest::Client,
	url: String,
	history_capacity: u32,
	page_size: u32,
}

impl GraphQlGateway {
	/// A `page_size` of zero is treated as one, member paging would never end otherwise.
	pub fn new(url: impl Into<String>, history_capacity: u32, page_size: u32) -> Self {
		Self {
			client: reqwest::Client::new(),
			url: url.into(),
			history_capacity,
			page_size: page_size.max(1),
		}
	}

	pub fn from_config(config: &EngineConfig) -> Result<Self, GatewayError> {
		let client = reqwest::Client::builder()
			.timeout(config.index_timeout())
			.build()
			.map_err(|e| GatewayError::Transport(e.to_string()))?;
		Ok(Self {
			client,
			url: config.index_url.clone(),
			history_capacity: config.root_history_capacity,
			page_size: config.members_page_size.max(1),
		})
	}

	async fn query<T: DeserializeOwned>(
		&self,
		query: &str,
		variables: serde_json::Value,
	) -> Result<T, GatewayError> {
		let response = self
			.client
			.post(&self.url)
			.json(&json!({ "query": query, "variables": variables }))
			.send()
			.await
			.map_err(|e| GatewayError::Transport(e.to_string()))?;
		let status = response.status();
		if !status.is_success() {
			return Err(GatewayError::Status(status.as_u16()))
		}
		let body = response.text().await.map_err(|e| GatewayError::Transport(e.to_string()))?;
		decode_response(&body)
	}
}

#[async_trait]
impl PoolIndexGateway for GraphQlGateway {
	async fn fetch_pool(&self, pool_id: PoolId) -> Result<PoolMetadata, GatewayError> {
		log::debug!(target: LOG, "querying pool {}", pool_id);
		let data: PoolData = self.query(POOL_QUERY, json!({ "id": pool_id.to_string() })).await?;
		data.pool.ok_or(GatewayError::PoolNotFound(pool_id))?.into_metadata()
	}

	async fn fetch_root_history(
		&self,
		pool_id: PoolId,
	) -> Result<Vec<RootHistoryEntry>, GatewayError> {
		let data: RootsData = self
			.query(
				ROOTS_QUERY,
				json!({ "pool": pool_id.to_string(), "first": self.history_capacity }),
			)
			.await?;
		data.merkle_roots.into_iter().map(RootRecord::into_entry).collect()
	}

	async fn fetch_members(&self, pool_id: PoolId) -> Result<Vec<Member>, GatewayError> {
		let mut members = Vec::new();
		loop {
			let data: MembersData = self
				.query(
					MEMBERS_QUERY,
					json!({
						"pool": pool_id.to_string(),
						"first": self.page_size,
						"skip": members.len(),
					}),
				)
				.await?;
			let page_len = data.pool_members.len();
			for record in data.pool_members {
				members.push(record.into_member()?);
			}
			if page_len < self.page_size as usize {
				break
			}
		}
		log::debug!(target: LOG, "pool {} lists {} members", pool_id, members.len());
		Ok(members)
	}
}

#[derive(Deserialize)]
struct Response<T> {
	data: Option<T>,
	#[serde(default)]
	errors: Vec<QueryError>,
}

#[derive(Deserialize)]
struct QueryError {
	message: String,
}

fn decode_response<T: DeserializeOwned>(body: &str) -> Result<T, GatewayError> {
	let response: Response<T> =
		serde_json::from_str(body).map_err(|e| GatewayError::Malformed(e.to_string()))?;
	if !response.errors.is_empty() {
		let messages: Vec<_> = response.errors.into_iter().map(|e| e.message).collect();
		return Err(GatewayError::Query(messages.join("; ")))
	}
	response.data.ok_or_else(|| GatewayError::Malformed("response carries no data".into()))
}

/// A scalar as the index serves it.
#[derive(Deserialize, Clone, Debug)]
#[serde(untagged)]
enum Scalar {
	Number(u64),
	Text(String),
}

impl Scalar {
	fn uint256(&self, field: &'static str) -> Result<[u8; WORD_LEN], GatewayError> {
		match self {
			Scalar::Number(n) => {
				let mut bytes = [0u8; WORD_LEN];
				bytes[WORD_LEN - 8..].copy_from_slice(&n.to_be_bytes());
				Ok(bytes)
			},
			Scalar::Text(s) => parse_uint256(s).ok_or_else(|| malformed(field, s)),
		}
	}

	fn narrow<const N: usize>(&self, field: &'static str) -> Result<[u8; N], GatewayError> {
		let bytes = self.uint256(field)?;
		if bytes[..WORD_LEN - N].iter().any(|b| *b != 0) {
			return Err(GatewayError::Malformed(format!("{field} out of range")))
		}
		let mut out = [0u8; N];
		out.copy_from_slice(&bytes[WORD_LEN - N..]);
		Ok(out)
	}

	fn as_u8(&self, field: &'static str) -> Result<u8, GatewayError> {
		self.narrow::<1>(field).map(|b| b[0])
	}

	fn as_u32(&self, field: &'static str) -> Result<u32, GatewayError> {
		self.narrow(field).map(u32::from_be_bytes)
	}

	fn as_u64(&self, field: &'static str) -> Result<u64, GatewayError> {
		self.narrow(field).map(u64::from_be_bytes)
	}

	fn as_u128(&self, field: &'static str) -> Result<u128, GatewayError> {
		self.narrow(field).map(u128::from_be_bytes)
	}

	fn as_field(&self, field: &'static str) -> Result<Field, GatewayError> {
		match self {
			Scalar::Number(n) => Ok(Field::from(*n)),
			Scalar::Text(s) => parse_field(s).ok_or_else(|| malformed(field, s)),
		}
	}
}

fn malformed(field: &str, value: &str) -> GatewayError {
	GatewayError::Malformed(format!("invalid {field}: {value:?}"))
}

#[derive(Deserialize)]
struct PoolData {
	pool: Option<PoolRecord>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PoolRecord {
	pool_id: Scalar,
	paymaster: String,
	joining_fee: Scalar,
	merkle_tree_depth: Scalar,
	merkle_tree_size: Scalar,
	current_merkle_tree_root: Scalar,
	root_history_count: Scalar,
}

impl PoolRecord {
	fn into_metadata(self) -> Result<PoolMetadata, GatewayError> {
		Ok(PoolMetadata {
			pool_id: PoolId::from_be_bytes(self.pool_id.uint256("poolId")?),
			paymaster: self
				.paymaster
				.parse::<Address>()
				.map_err(|_| malformed("paymaster", &self.paymaster))?,
			joining_fee: self.joining_fee.as_u128("joiningFee")?,
			merkle_tree_depth: self.merkle_tree_depth.as_u8("merkleTreeDepth")?,
			merkle_tree_size: self.merkle_tree_size.as_u64("merkleTreeSize")?,
			current_merkle_tree_root: self
				.current_merkle_tree_root
				.as_field("currentMerkleTreeRoot")?,
			root_history_count: self.root_history_count.as_u64("rootHistoryCount")?,
		})
	}
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RootsData {
	merkle_roots: Vec<RootRecord>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RootRecord {
	root_index: Scalar,
	root: Scalar,
	created_at: Scalar,
	created_at_block: Scalar,
}

impl RootRecord {
	fn into_entry(self) -> Result<RootHistoryEntry, GatewayError> {
		Ok(RootHistoryEntry {
			index: self.root_index.as_u32("rootIndex")?,
			root: self.root.as_field("root")?,
			created_at: self.created_at.as_u64("createdAt")?,
			created_at_block: self.created_at_block.as_u64("createdAtBlock")?,
		})
	}
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MembersData {
	pool_members: Vec<MemberRecord>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MemberRecord {
	member_index: Scalar,
	identity_commitment: Scalar,
}

impl MemberRecord {
	fn into_member(self) -> Result<Member, GatewayError> {
		Ok(Member {
			index: self.member_index.as_u64("memberIndex")?,
			commitment: self.identity_commitment.as_field("identityCommitment")?,
		})
	}
}
