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

//! Builds the `paymasterData` bytes, as a stub for gas estimation and as the final payload.

use crate::{
	config::EngineConfig,
	error::Error,
	gateway::{GatewayError, PoolIndexGateway},
	resolver::{MerkleRootResolver, ResolvedRoot},
	witness::membership_witness,
};
use anon_paymaster_primitives::{
	error::ContextError, Address, Field, Member, PaymasterContext, PaymasterPayload, Pool, PoolId,
};
use anon_paymaster_prover::{
	stub_proof, Identity, MembershipProof, MembershipProver, ProofRequest, ProverError,
};
use std::{future::Future, sync::Arc, time::Duration};

const LOG: &str = "anon-paymaster::assembler";

/// Final paymaster data together with the proof it carries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FinalPaymasterData {
	/// Fee sponsor contract of the pool
	pub paymaster: Address,
	pub paymaster_data: Vec<u8>,
	pub resolved: ResolvedRoot,
	pub proof: MembershipProof,
}

/// Stub paymaster data for `context`, from an already fetched pool snapshot.
///
/// Takes no identity and performs no I/O.
pub fn build_stub(context: &[u8], pool: &Pool) -> Result<Vec<u8>, Error> {
	let context = PaymasterContext::decode(context)?;
	ensure_same_pool(&context, pool)?;

	let resolved = MerkleRootResolver.resolve(pool, None)?;
	let proof = stub_proof(pool.depth(), resolved.root, pool.id().scope(), Field::from(0u64));
	Ok(payload(&context, &resolved, &proof).encode())
}

fn ensure_same_pool(context: &PaymasterContext, pool: &Pool) -> Result<(), Error> {
	if context.pool_id() != pool.id() {
		return Err(ContextError::PoolMismatch { expected: pool.id(), actual: context.pool_id() }
			.into())
	}
	Ok(())
}

fn payload(
	context: &PaymasterContext,
	resolved: &ResolvedRoot,
	proof: &MembershipProof,
) -> PaymasterPayload {
	PaymasterPayload {
		mode: context.mode(),
		merkle_root_index: resolved.root_index,
		pool_id: context.pool_id(),
		merkle_tree_depth: proof.merkle_tree_depth,
		nullifier: proof.nullifier,
		points: proof.points,
	}
}

pub struct PaymasterDataAssembler<G> {
	gateway: G,
	prover: Arc<MembershipProver>,
	index_timeout: Duration,
	history_capacity: u32,
}

impl<G: PoolIndexGateway> PaymasterDataAssembler<G> {
	pub fn new(gateway: G, prover: Arc<MembershipProver>, config: &EngineConfig) -> Self {
		Self {
			gateway,
			prover,
			index_timeout: config.index_timeout(),
			history_capacity: config.root_history_capacity,
		}
	}

	pub fn gateway(&self) -> &G {
		&self.gateway
	}

	/// Current snapshot of `pool_id`, bounded by the index timeout.
	pub async fn fetch_pool(&self, pool_id: PoolId) -> Result<Pool, Error> {
		self.with_timeout(self.gateway.fetch_snapshot(pool_id, self.history_capacity)).await
	}

	/// Fetch the pool named by `context` and build stub data for it.
	pub async fn stub_for_context(&self, context: &[u8]) -> Result<(Vec<u8>, Pool), Error> {
		let pool_id = PaymasterContext::decode(context)?.pool_id();
		let pool = self.fetch_pool(pool_id).await?;
		Ok((build_stub(context, &pool)?, pool))
	}

	/// Final paymaster data proving membership at the pool's current root.
	pub async fn build_final(
		&self,
		context: &[u8],
		identity: &Identity,
		message: Field,
	) -> Result<Vec<u8>, Error> {
		self.build_final_at(context, identity, message, None).await
	}

	/// Like [`Self::build_final`], proving against `requested_root` if given.
	pub async fn build_final_at(
		&self,
		context: &[u8],
		identity: &Identity,
		message: Field,
		requested_root: Option<Field>,
	) -> Result<Vec<u8>, Error> {
		Ok(self
			.build_final_proof(context, identity, message, requested_root)
			.await?
			.paymaster_data)
	}

	pub async fn build_final_proof(
		&self,
		context: &[u8],
		identity: &Identity,
		message: Field,
		requested_root: Option<Field>,
	) -> Result<FinalPaymasterData, Error> {
		let context = PaymasterContext::decode(context)?;
		let mut pool = self.fetch_pool(context.pool_id()).await?;
		let resolved = match MerkleRootResolver.resolve(&pool, requested_root.as_ref()) {
			// a cached snapshot may predate the requested root
			Err(Error::StaleOrUnknownRoot { .. }) if requested_root.is_some() => {
				self.gateway.invalidate(&pool.id());
				pool = self.fetch_pool(context.pool_id()).await?;
				MerkleRootResolver.resolve(&pool, requested_root.as_ref())?
			},
			resolved => resolved?,
		};
		let members = self.with_timeout(self.gateway.fetch_members(pool.id())).await?;
		log::debug!(
			target: LOG,
			"pool {}: proving at slot {} with {} listed members",
			pool.id(),
			resolved.root_index,
			members.len()
		);

		let proof = self.prove(&pool, &resolved, members, identity, message).await?;
		let paymaster_data = payload(&context, &resolved, &proof).encode();
		log::info!(
			target: LOG,
			"built paymaster data for pool {} at root slot {}",
			pool.id(),
			resolved.root_index
		);

		Ok(FinalPaymasterData {
			paymaster: pool.metadata.paymaster,
			paymaster_data,
			resolved,
			proof,
		})
	}

	/// Witness replay and Groth16 proving, both CPU bound, on a blocking worker.
	async fn prove(
		&self,
		pool: &Pool,
		resolved: &ResolvedRoot,
		members: Vec<Member>,
		identity: &Identity,
		message: Field,
	) -> Result<MembershipProof, Error> {
		let prover = self.prover.clone();
		let identity = identity.clone();
		let depth = pool.depth();
		let root = resolved.root;
		let scope = pool.id().scope();

		tokio::task::spawn_blocking(move || -> Result<MembershipProof, Error> {
			let witness = membership_witness(depth, &members, &root, &identity.commitment())?;
			Ok(prover.generate(ProofRequest {
				identity,
				merkle_tree_depth: depth,
				merkle_tree_root: root,
				witness,
				scope,
				message,
			})?)
		})
		.await
		.map_err(|e| ProverError::Worker(e.to_string()))?
	}

	async fn with_timeout<T>(
		&self,
		call: impl Future<Output = Result<T, GatewayError>>,
	) -> Result<T, Error> {
		match tokio::time::timeout(self.index_timeout, call).await {
			Ok(result) => result.map_err(|e| {
				log::warn!(target: LOG, "index call failed: {}", e);
				Error::from(e)
			}),
			Err(_) => {
				log::warn!(target: LOG, "index call timed out after {:?}", self.index_timeout);
				Err(GatewayError::Timeout(self.index_timeout).into())
			},
		}
	}
}
