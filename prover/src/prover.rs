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

//! Groth16 proof generation for pool membership.
//!
//! This module provides:
//! - Trusted setup (key generation, per tree depth)
//! - A proving key store backed by a key directory
//! - Proof generation and the fixed-shape stub proof
//! - Conversion between arkworks proofs and the eight-word calldata form
//! - Test fixtures for e2e testing

use crate::{
	circuit::{poseidon_hash, MembershipCircuit},
	error::ProverError,
	identity::Identity,
	tree::MembershipWitness,
};
use anon_paymaster_primitives::{
	common::{field_from_be_bytes, field_to_be_bytes, hash_to_field},
	Field, ProofPoints,
};
use ark_bn254::{Bn254, Fq, Fq2, G1Affine, G1Projective, G2Affine, G2Projective};
use ark_ec::{AffineRepr, CurveGroup, Group};
use ark_ff::Zero;
use ark_groth16::{Groth16, PreparedVerifyingKey, Proof, ProvingKey, VerifyingKey};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use ark_snark::{CircuitSpecificSetupSNARK, SNARK};
use ark_std::rand::{rngs::StdRng, SeedableRng};
use parking_lot::RwLock;
use rand::rngs::OsRng;
use std::{
	collections::HashMap,
	path::{Path, PathBuf},
	sync::{Arc, OnceLock},
	time::Instant,
};

const LOG: &str = "anon-paymaster::prover";

/// Name of the proving key file for `depth` inside a key directory.
pub fn key_file_name(depth: u8) -> String {
	format!("membership-depth-{depth}.pk")
}

/// Result of trusted setup for one tree depth
pub struct TrustedSetup {
	pub depth: u8,
	pub proving_key: ProvingKey<Bn254>,
	pub verifying_key: VerifyingKey<Bn254>,
}

impl TrustedSetup {
	/// Perform trusted setup with a deterministic seed (FOR TESTING ONLY)
	/// In production, keys come out of a multi-party ceremony
	pub fn generate_with_seed(depth: u8, seed: u64) -> Result<Self, ProverError> {
		let mut rng = StdRng::seed_from_u64(seed ^ depth as u64);
		let circuit = MembershipCircuit::blank(depth as usize);

		let (proving_key, verifying_key) =
			Groth16::<Bn254>::circuit_specific_setup(circuit, &mut rng)
				.map_err(|e| ProverError::Synthesis(e.to_string()))?;

		Ok(Self { depth, proving_key, verifying_key })
	}

	/// Serialize the verifying key to bytes
	pub fn verifying_key_bytes(&self) -> Result<Vec<u8>, ProverError> {
		let mut bytes = Vec::new();
		self.verifying_key
			.serialize_compressed(&mut bytes)
			.map_err(|e| ProverError::KeyEncoding { depth: self.depth, reason: e.to_string() })?;
		Ok(bytes)
	}

	/// Serialize the proving key to bytes
	pub fn proving_key_bytes(&self) -> Result<Vec<u8>, ProverError> {
		let mut bytes = Vec::new();
		self.proving_key
			.serialize_compressed(&mut bytes)
			.map_err(|e| ProverError::KeyEncoding { depth: self.depth, reason: e.to_string() })?;
		Ok(bytes)
	}

	/// Deserialize a proving key from bytes
	pub fn proving_key_from_bytes(
		depth: u8,
		bytes: &[u8],
	) -> Result<ProvingKey<Bn254>, ProverError> {
		ProvingKey::<Bn254>::deserialize_compressed(bytes)
			.map_err(|e| ProverError::KeyEncoding { depth, reason: e.to_string() })
	}
}

/// Proving keys by tree depth.
///
/// Keys inserted directly win over the key directory. Files are read on first use.
#[derive(Default)]
pub struct ProvingKeyStore {
	dir: Option<PathBuf>,
	keys: RwLock<HashMap<u8, Arc<ProvingKey<Bn254>>>>,
}

impl ProvingKeyStore {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
		Self { dir: Some(dir.into()), keys: Default::default() }
	}

	pub fn dir(&self) -> Option<&Path> {
		self.dir.as_deref()
	}

	pub fn insert(&self, depth: u8, key: ProvingKey<Bn254>) {
		self.keys.write().insert(depth, Arc::new(key));
	}

	pub fn contains(&self, depth: u8) -> bool {
		self.keys.read().contains_key(&depth) ||
			self.dir.as_ref().map_or(false, |dir| dir.join(key_file_name(depth)).is_file())
	}

	pub fn get(&self, depth: u8) -> Result<Arc<ProvingKey<Bn254>>, ProverError> {
		if let Some(key) = self.keys.read().get(&depth) {
			return Ok(key.clone())
		}
		let path = match &self.dir {
			Some(dir) => dir.join(key_file_name(depth)),
			None => return Err(ProverError::MissingProvingKey(depth)),
		};
		if !path.is_file() {
			return Err(ProverError::MissingProvingKey(depth))
		}

		log::info!(target: LOG, "loading proving key for depth {} from {}", depth, path.display());
		let bytes = std::fs::read(&path)?;
		let key = Arc::new(TrustedSetup::proving_key_from_bytes(depth, &bytes)?);
		Ok(self.keys.write().entry(depth).or_insert(key).clone())
	}
}

/// Everything needed to prove membership at one root.
#[derive(Clone, Debug)]
pub struct ProofRequest {
	pub identity: Identity,
	pub merkle_tree_depth: u8,
	pub merkle_tree_root: Field,
	pub witness: MembershipWitness,
	pub scope: Field,
	pub message: Field,
}

/// A proof together with the public signals it was computed for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MembershipProof {
	pub merkle_tree_depth: u8,
	pub merkle_tree_root: Field,
	pub nullifier: Field,
	pub message: Field,
	pub scope: Field,
	pub points: ProofPoints,
}

impl MembershipProof {
	/// Public inputs in circuit order
	pub fn public_inputs(&self) -> Vec<Field> {
		vec![self.merkle_tree_root, self.nullifier, self.message, self.scope]
	}
}

pub struct MembershipProver {
	keys: Arc<ProvingKeyStore>,
}

impl MembershipProver {
	pub fn new(keys: Arc<ProvingKeyStore>) -> Self {
		Self { keys }
	}

	pub fn keys(&self) -> &Arc<ProvingKeyStore> {
		&self.keys
	}

	/// Generate a Groth16 membership proof.
	///
	/// The witness is checked against the requested root before any proving work starts.
	/// CPU bound, callers on an async runtime should run this on a blocking worker.
	pub fn generate(&self, request: ProofRequest) -> Result<MembershipProof, ProverError> {
		let depth = request.merkle_tree_depth;
		if request.witness.depth() != depth as usize {
			return Err(ProverError::WitnessDepth {
				expected: depth as usize,
				actual: request.witness.depth(),
			})
		}

		let computed = request.witness.compute_root(&request.identity.commitment());
		if computed != request.merkle_tree_root {
			return Err(ProverError::RootMismatch { expected: request.merkle_tree_root, computed })
		}

		let proving_key = self.keys.get(depth)?;
		let circuit = MembershipCircuit::new(
			request.identity.secret(),
			&request.witness,
			request.scope,
			request.message,
		);
		let nullifier = circuit.nullifier;

		let started = Instant::now();
		let proof = Groth16::<Bn254>::prove(&proving_key, circuit, &mut OsRng)
			.map_err(|e| ProverError::Synthesis(e.to_string()))?;
		log::debug!(
			target: LOG,
			"membership proof at depth {} took {:?}",
			depth,
			started.elapsed()
		);

		Ok(MembershipProof {
			merkle_tree_depth: depth,
			merkle_tree_root: request.merkle_tree_root,
			nullifier,
			message: request.message,
			scope: request.scope,
			points: pack_proof(&proof),
		})
	}
}

/// Placeholder with the exact shape of a real proof, used for gas estimation.
///
/// Points are fixed multiples of the group generators, so they are valid curve points with
/// a realistic byte profile. The nullifier is derived from the scope alone and never from
/// an identity secret.
pub fn stub_proof(depth: u8, root: Field, scope: Field, message: Field) -> MembershipProof {
	MembershipProof {
		merkle_tree_depth: depth,
		merkle_tree_root: root,
		nullifier: poseidon_hash(&[stub_nullifier_domain(), scope]),
		message,
		scope,
		points: *stub_points(),
	}
}

fn stub_nullifier_domain() -> Field {
	hash_to_field(b"anon-paymaster/stub-nullifier")
}

fn stub_points() -> &'static ProofPoints {
	static POINTS: OnceLock<ProofPoints> = OnceLock::new();
	POINTS.get_or_init(|| {
		let k = hash_to_field(b"anon-paymaster/stub-proof");
		let g1 = (G1Projective::generator() * k).into_affine();
		let g2 = (G2Projective::generator() * k).into_affine();
		pack_proof(&Proof { a: g1, b: g2, c: g1 })
	})
}

/// Flatten a proof into `A.x, A.y, B.x.c1, B.x.c0, B.y.c1, B.y.c0, C.x, C.y`.
///
/// The point at infinity is written as `(0, 0)`.
pub fn pack_proof(proof: &Proof<Bn254>) -> ProofPoints {
	let (ax, ay) = g1_coordinates(&proof.a);
	let (bx, by) = proof.b.xy().map(|(x, y)| (*x, *y)).unwrap_or_default();
	let (cx, cy) = g1_coordinates(&proof.c);

	ProofPoints([
		field_to_be_bytes(&ax),
		field_to_be_bytes(&ay),
		field_to_be_bytes(&bx.c1),
		field_to_be_bytes(&bx.c0),
		field_to_be_bytes(&by.c1),
		field_to_be_bytes(&by.c0),
		field_to_be_bytes(&cx),
		field_to_be_bytes(&cy),
	])
}

/// Inverse of [`pack_proof`]. `None` for non-canonical coordinates or points off the curve.
pub fn unpack_proof(points: &ProofPoints) -> Option<Proof<Bn254>> {
	let coordinate = |i: usize| field_from_be_bytes::<Fq>(&points.0[i]);

	let a = g1_from_coordinates(coordinate(0)?, coordinate(1)?)?;
	let b = g2_from_coordinates(
		Fq2::new(coordinate(3)?, coordinate(2)?),
		Fq2::new(coordinate(5)?, coordinate(4)?),
	)?;
	let c = g1_from_coordinates(coordinate(6)?, coordinate(7)?)?;

	Some(Proof { a, b, c })
}

fn g1_coordinates(point: &G1Affine) -> (Fq, Fq) {
	point.xy().map(|(x, y)| (*x, *y)).unwrap_or_default()
}

fn g1_from_coordinates(x: Fq, y: Fq) -> Option<G1Affine> {
	if x.is_zero() && y.is_zero() {
		return Some(G1Affine::zero())
	}
	let point = G1Affine::new_unchecked(x, y);
	(point.is_on_curve() && point.is_in_correct_subgroup_assuming_on_curve()).then_some(point)
}

fn g2_from_coordinates(x: Fq2, y: Fq2) -> Option<G2Affine> {
	if x.is_zero() && y.is_zero() {
		return Some(G2Affine::zero())
	}
	let point = G2Affine::new_unchecked(x, y);
	(point.is_on_curve() && point.is_in_correct_subgroup_assuming_on_curve()).then_some(point)
}

/// Verify a packed proof against its own public signals.
///
/// Off-chain sanity check only, the fee sponsor runs its own verifier.
pub fn verify_proof(verifying_key: &VerifyingKey<Bn254>, proof: &MembershipProof) -> bool {
	let Some(groth16_proof) = unpack_proof(&proof.points) else { return false };
	let pvk: PreparedVerifyingKey<Bn254> = verifying_key.clone().into();
	matches!(Groth16::<Bn254>::verify_proof(&pvk, &groth16_proof, &proof.public_inputs()), Ok(true))
}

/// Well-known test seed for deterministic trusted setup
/// This seed should ONLY be used for testing
pub const TEST_SETUP_SEED: u64 = 0xDEADBEEF_CAFEBABE;

/// Pre-generated test fixtures using TEST_SETUP_SEED
pub mod test_fixtures {
	use super::*;
	use parking_lot::Mutex;

	static TEST_SETUPS: OnceLock<Mutex<HashMap<u8, Arc<TrustedSetup>>>> = OnceLock::new();

	/// Get the test trusted setup for `depth` (lazily initialized)
	pub fn get_test_setup(depth: u8) -> Arc<TrustedSetup> {
		let mut setups = TEST_SETUPS.get_or_init(Default::default).lock();
		setups
			.entry(depth)
			.or_insert_with(|| {
				Arc::new(
					TrustedSetup::generate_with_seed(depth, TEST_SETUP_SEED)
						.expect("blank circuit always synthesizes"),
				)
			})
			.clone()
	}

	/// Key store holding the test proving keys for `depths`
	pub fn test_key_store(depths: &[u8]) -> Arc<ProvingKeyStore> {
		let store = ProvingKeyStore::new();
		for depth in depths {
			store.insert(*depth, get_test_setup(*depth).proving_key.clone());
		}
		Arc::new(store)
	}
}
