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

//! ERC-7677 paymaster web service (`pm_` namespace) on top of the data engine.

use anon_paymaster::{
	CachedGateway, ConfigError, EngineConfig, GasOverheadEstimator, GatewayError, GraphQlGateway,
	PaymasterDataAssembler, PoolIndexGateway,
};
use anon_paymaster_primitives::{
	pool::{MAX_TREE_DEPTH, MIN_TREE_DEPTH},
	Address,
};
use anon_paymaster_prover::{Identity, MembershipProver, ProverError, ProvingKeyStore};
use jsonrpsee::{
	core::{async_trait, RpcResult},
	proc_macros::rpc,
	server::{Server, ServerHandle},
};
use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, sync::Arc};

pub mod error;
pub mod types;

pub use error::Error;
use types::{
	parse_quantity, to_quantity, Bytes, PaymasterDataResponse, StubDataResponse, UserOperation,
};

const LOG: &str = "anon-paymaster::rpc";

#[rpc(server, namespace = "pm")]
pub trait PaymasterApi {
	#[method(name = "getPaymasterStubData")]
	async fn get_paymaster_stub_data(
		&self,
		user_op: UserOperation,
		entry_point: Address,
		chain_id: String,
		paymaster_context: Bytes,
	) -> RpcResult<StubDataResponse>;

	#[method(name = "getPaymasterData")]
	async fn get_paymaster_data(
		&self,
		user_op: UserOperation,
		entry_point: Address,
		chain_id: String,
		paymaster_context: Bytes,
	) -> RpcResult<PaymasterDataResponse>;

	#[method(name = "estimateGasOverhead")]
	async fn estimate_gas_overhead(&self, merkle_tree_depth: u8) -> RpcResult<String>;
}

pub struct PaymasterRpc<G> {
	assembler: PaymasterDataAssembler<G>,
	estimator: GasOverheadEstimator,
	identity: Option<Identity>,
	post_op_gas_limit: u64,
}

impl<G: PoolIndexGateway> PaymasterRpc<G> {
	pub fn new(
		assembler: PaymasterDataAssembler<G>,
		estimator: GasOverheadEstimator,
		identity: Option<Identity>,
		post_op_gas_limit: u64,
	) -> Self {
		PaymasterRpc { assembler, estimator, identity, post_op_gas_limit }
	}
}

#[async_trait]
impl<G: PoolIndexGateway + 'static> PaymasterApiServer for PaymasterRpc<G> {
	async fn get_paymaster_stub_data(
		&self,
		user_op: UserOperation,
		entry_point: Address,
		chain_id: String,
		paymaster_context: Bytes,
	) -> RpcResult<StubDataResponse> {
		let chain_id = parse_quantity("chainId", &chain_id)?;
		log::debug!(
			target: LOG,
			"stub data for {} via entry point {} on chain {}",
			user_op.sender,
			entry_point,
			chain_id
		);
		let (paymaster_data, pool) =
			self.assembler.stub_for_context(&paymaster_context.0).await.map_err(Error::from)?;

		Ok(StubDataResponse {
			paymaster: pool.metadata.paymaster,
			paymaster_data,
			paymaster_verification_gas_limit: to_quantity(self.estimator.estimate(&pool)),
			paymaster_post_op_gas_limit: to_quantity(self.post_op_gas_limit),
			is_final: false,
		})
	}

	async fn get_paymaster_data(
		&self,
		user_op: UserOperation,
		entry_point: Address,
		chain_id: String,
		paymaster_context: Bytes,
	) -> RpcResult<PaymasterDataResponse> {
		let identity = self.identity.as_ref().ok_or(Error::MissingIdentity)?;
		let chain_id = parse_quantity("chainId", &chain_id)?;
		let message = user_op.intent(entry_point, chain_id)?.message();

		let data = self
			.assembler
			.build_final_proof(&paymaster_context.0, identity, message, None)
			.await
			.map_err(Error::from)?;

		Ok(PaymasterDataResponse { paymaster: data.paymaster, paymaster_data: data.paymaster_data })
	}

	async fn estimate_gas_overhead(&self, merkle_tree_depth: u8) -> RpcResult<String> {
		if !(MIN_TREE_DEPTH..=MAX_TREE_DEPTH).contains(&merkle_tree_depth) {
			return Err(Error::InvalidParams(format!("merkleTreeDepth {merkle_tree_depth}")).into())
		}
		Ok(to_quantity(self.estimator.estimate_for_depth(merkle_tree_depth)))
	}
}

/// Service configuration: where to listen, which identity to prove with, and the engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RpcConfig {
	pub listen_addr: SocketAddr,
	/// `0x` hex of the identity secret, see [`Identity::secret_bytes`]
	pub identity_secret: Option<String>,
	pub engine: EngineConfig,
}

impl Default for RpcConfig {
	fn default() -> Self {
		Self {
			listen_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
			identity_secret: None,
			engine: EngineConfig::default(),
		}
	}
}

impl RpcConfig {
	pub fn from_json(json: &str) -> Result<Self, ServiceError> {
		let config: Self = serde_json::from_str(json).map_err(ConfigError::from)?;
		config.engine.validate()?;
		Ok(config)
	}

	pub fn identity(&self) -> Result<Option<Identity>, ServiceError> {
		let Some(secret) = &self.identity_secret else { return Ok(None) };
		let bytes = anon_paymaster_primitives::common::parse_uint256(secret)
			.ok_or(ServiceError::Identity(ProverError::InvalidSecret))?;
		Ok(Some(Identity::from_secret_bytes(&bytes)?))
	}
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
	#[error(transparent)]
	Config(#[from] ConfigError),
	#[error("invalid identity: {0}")]
	Identity(#[from] ProverError),
	#[error(transparent)]
	Gateway(#[from] GatewayError),
	#[error("cannot start server: {0}")]
	Io(#[from] std::io::Error),
}

/// Wire up gateway, cache, prover and rpc module from `config` and start serving.
pub async fn start_server(config: RpcConfig) -> Result<(SocketAddr, ServerHandle), ServiceError> {
	let engine = &config.engine;
	engine.validate()?;
	let identity = config.identity()?;
	if identity.is_none() {
		log::warn!(target: LOG, "no identity configured, pm_getPaymasterData will fail");
	}

	let keys = match &engine.proving_key_dir {
		Some(dir) => ProvingKeyStore::with_dir(dir),
		None => ProvingKeyStore::new(),
	};
	let gateway = CachedGateway::from_config(GraphQlGateway::from_config(engine)?, engine);
	let prover = Arc::new(MembershipProver::new(Arc::new(keys)));
	let assembler = PaymasterDataAssembler::new(gateway, prover, engine);
	let rpc = PaymasterRpc::new(
		assembler,
		GasOverheadEstimator::new(engine.gas),
		identity,
		engine.post_op_gas_limit,
	);

	let server = Server::builder().build(config.listen_addr).await?;
	let addr = server.local_addr()?;
	let handle = server.start(rpc.into_rpc());
	log::info!(target: LOG, "paymaster rpc listening on {}", addr);

	Ok((addr, handle))
}

#[cfg(test)]
mod tests;
