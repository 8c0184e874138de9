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

//! ZK circuit for pool membership proofs.
//!
//! This circuit proves:
//! - Knowledge of `secret` such that `commitment = Poseidon(secret)`
//! - `commitment` is a leaf of the membership tree with root `root`
//! - Nullifier correctness: `nullifier = Poseidon(NULLIFIER_DOMAIN, scope, secret)`
//!
//! Public inputs: root, nullifier, message, scope
//! Private inputs: secret, merkle path (siblings and direction bits)

use crate::tree::MembershipWitness;
use ark_bn254::Fr;
use ark_crypto_primitives::sponge::{
	constraints::CryptographicSpongeVar,
	poseidon::{
		constraints::PoseidonSpongeVar, find_poseidon_ark_and_mds, PoseidonConfig, PoseidonSponge,
	},
	CryptographicSponge,
};
use ark_ff::PrimeField;
use ark_r1cs_std::{fields::fp::FpVar, prelude::*};
use ark_relations::r1cs::{ConstraintSynthesizer, ConstraintSystemRef, SynthesisError};
use std::sync::OnceLock;

/// Domain tag absorbed first into every nullifier, keeps nullifiers apart from tree nodes.
pub const NULLIFIER_DOMAIN: u64 = 0x6e75_6c6c_6966_6965; // "nullifie"

pub const POSEIDON_FULL_ROUNDS: usize = 8;
pub const POSEIDON_PARTIAL_ROUNDS: usize = 57;
pub const POSEIDON_ALPHA: u64 = 5;
pub const POSEIDON_RATE: usize = 2;

/// Poseidon over the BN254 scalar field, width 3 (rate 2, capacity 1).
///
/// Round constants and MDS matrix come from the Grain LFSR of the Poseidon reference
/// parameter generation, the same constants circomlib ships for width 3.
pub fn poseidon_config() -> &'static PoseidonConfig<Fr> {
	static CONFIG: OnceLock<PoseidonConfig<Fr>> = OnceLock::new();
	CONFIG.get_or_init(|| {
		let (ark, mds) = find_poseidon_ark_and_mds::<Fr>(
			Fr::MODULUS_BIT_SIZE as u64,
			POSEIDON_RATE,
			POSEIDON_FULL_ROUNDS as u64,
			POSEIDON_PARTIAL_ROUNDS as u64,
			0,
		);
		PoseidonConfig::new(
			POSEIDON_FULL_ROUNDS,
			POSEIDON_PARTIAL_ROUNDS,
			POSEIDON_ALPHA,
			mds,
			ark,
			POSEIDON_RATE,
			1,
		)
	})
}

/// Compute Poseidon hash of inputs
pub fn poseidon_hash(inputs: &[Fr]) -> Fr {
	let mut sponge = PoseidonSponge::new(poseidon_config());
	for input in inputs {
		sponge.absorb(input);
	}
	sponge.squeeze_field_elements::<Fr>(1)[0]
}

/// Compute commitment = Poseidon(secret)
pub fn compute_commitment(secret: &Fr) -> Fr {
	poseidon_hash(&[*secret])
}

/// Compute nullifier = Poseidon(NULLIFIER_DOMAIN, scope, secret)
pub fn compute_nullifier(scope: &Fr, secret: &Fr) -> Fr {
	poseidon_hash(&[Fr::from(NULLIFIER_DOMAIN), *scope, *secret])
}

/// Inner node of the membership tree.
pub fn hash_nodes(left: &Fr, right: &Fr) -> Fr {
	poseidon_hash(&[*left, *right])
}

/// The membership circuit, one instance per tree depth.
#[derive(Clone)]
pub struct MembershipCircuit {
	// Public inputs
	/// Root of the membership tree the proof is computed against
	pub root: Fr,
	/// Nullifier = Poseidon(NULLIFIER_DOMAIN, scope, secret)
	pub nullifier: Fr,
	/// Bound payload, hash of the sponsored operation's intent
	pub message: Fr,
	/// Pool scope
	pub scope: Fr,

	// Private inputs (witnesses)
	/// The identity secret
	pub secret: Fr,
	/// Sibling nodes, leaf level first
	pub siblings: Vec<Fr>,
	/// `true` where the path node is the right child
	pub path_bits: Vec<bool>,
}

impl MembershipCircuit {
	pub fn new(secret: Fr, witness: &MembershipWitness, scope: Fr, message: Fr) -> Self {
		let commitment = compute_commitment(&secret);

		Self {
			root: witness.compute_root(&commitment),
			nullifier: compute_nullifier(&scope, &secret),
			message,
			scope,
			secret,
			siblings: witness.siblings.clone(),
			path_bits: witness.path_bits(),
		}
	}

	/// Shape-only instance for key generation.
	pub fn blank(depth: usize) -> Self {
		let witness = MembershipWitness { leaf_index: 0, siblings: vec![Fr::from(0u64); depth] };
		Self::new(Fr::from(1u64), &witness, Fr::from(1u64), Fr::from(1u64))
	}

	pub fn depth(&self) -> usize {
		self.siblings.len()
	}

	/// Public inputs in the order the verifier expects them
	pub fn public_inputs(&self) -> Vec<Fr> {
		vec![self.root, self.nullifier, self.message, self.scope]
	}
}

impl ConstraintSynthesizer<Fr> for MembershipCircuit {
	fn generate_constraints(self, cs: ConstraintSystemRef<Fr>) -> Result<(), SynthesisError> {
		let config = poseidon_config();

		// Allocate public inputs
		let root_var = FpVar::new_input(cs.clone(), || Ok(self.root))?;
		let nullifier_var = FpVar::new_input(cs.clone(), || Ok(self.nullifier))?;
		let message_var = FpVar::new_input(cs.clone(), || Ok(self.message))?;
		let scope_var = FpVar::new_input(cs.clone(), || Ok(self.scope))?;

		// Allocate private witnesses
		let secret_var = FpVar::new_witness(cs.clone(), || Ok(self.secret))?;

		// Constraint 1: commitment = Poseidon(secret)
		let mut commitment_sponge = PoseidonSpongeVar::new(cs.clone(), config);
		commitment_sponge.absorb(&vec![secret_var.clone()])?;
		let mut node = commitment_sponge.squeeze_field_elements(1)?[0].clone();

		// Constraint 2: walk the merkle path up to the public root
		for (sibling, is_right) in self.siblings.iter().zip(self.path_bits.iter()) {
			let sibling_var = FpVar::new_witness(cs.clone(), || Ok(*sibling))?;
			let bit = Boolean::new_witness(cs.clone(), || Ok(*is_right))?;

			let left = FpVar::conditionally_select(&bit, &sibling_var, &node)?;
			let right = FpVar::conditionally_select(&bit, &node, &sibling_var)?;

			let mut node_sponge = PoseidonSpongeVar::new(cs.clone(), config);
			node_sponge.absorb(&vec![left, right])?;
			node = node_sponge.squeeze_field_elements(1)?[0].clone();
		}
		node.enforce_equal(&root_var)?;

		// Constraint 3: nullifier = Poseidon(NULLIFIER_DOMAIN, scope, secret)
		let domain_var = FpVar::new_constant(cs.clone(), Fr::from(NULLIFIER_DOMAIN))?;
		let mut nullifier_sponge = PoseidonSpongeVar::new(cs.clone(), config);
		nullifier_sponge.absorb(&vec![domain_var, scope_var, secret_var])?;
		let computed_nullifier = nullifier_sponge.squeeze_field_elements(1)?[0].clone();
		computed_nullifier.enforce_equal(&nullifier_var)?;

		// Constraint 4: bind the message so the proof cannot be replayed for another operation
		let message_square = message_var.square()?;
		message_square.enforce_equal(&(&message_var * &message_var))?;

		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{identity::Identity, tree::MembershipTree};
	use ark_ff::BigInteger;
	use ark_relations::r1cs::ConstraintSystem;
	use proptest::prelude::*;
	use std::str::FromStr;

	fn member_circuit() -> MembershipCircuit {
		let secret = Fr::from(12345u64);
		let mut tree = MembershipTree::new(4).unwrap();
		tree.insert(Fr::from(1u64)).unwrap();
		let index = tree.insert(compute_commitment(&secret)).unwrap();
		tree.insert(Fr::from(3u64)).unwrap();

		let witness = tree.witness(index).unwrap();
		MembershipCircuit::new(secret, &witness, Fr::from(7u64), Fr::from(1000u64))
	}

	#[test]
	fn test_poseidon_round_constants_are_grain_lfsr() {
		let config = poseidon_config();
		let first = Fr::from_str(
			"6745197990210204598374042828761989596302876299545964402857411729872131034734",
		)
		.unwrap();

		assert_eq!(config.ark[0][0], first);
		assert_eq!(config.ark.len(), POSEIDON_FULL_ROUNDS + POSEIDON_PARTIAL_ROUNDS);
		assert!(config.ark.iter().all(|round| round.len() == POSEIDON_RATE + 1));
		assert_eq!(config.mds.len(), POSEIDON_RATE + 1);
		assert!(config.ark.iter().flatten().all(|c| c.into_bigint().num_bits() > 64));
	}

	#[test]
	fn test_poseidon_hash_deterministic() {
		let input = Fr::from(12345u64);
		assert_eq!(poseidon_hash(&[input]), poseidon_hash(&[input]));
	}

	#[test]
	fn test_nullifier_depends_on_scope_only() {
		let secret = Fr::from(42u64);

		let nullifier1 = compute_nullifier(&Fr::from(1u64), &secret);
		let nullifier2 = compute_nullifier(&Fr::from(2u64), &secret);

		assert_ne!(nullifier1, nullifier2);
		assert_eq!(nullifier1, compute_nullifier(&Fr::from(1u64), &secret));
	}

	#[test]
	fn test_nullifier_is_not_a_tree_node() {
		let secret = Fr::from(42u64);
		let scope = Fr::from(1u64);
		assert_ne!(compute_nullifier(&scope, &secret), hash_nodes(&scope, &secret));
	}

	#[test]
	fn test_circuit_constraints_satisfied() {
		let circuit = member_circuit();

		let cs = ConstraintSystem::<Fr>::new_ref();
		circuit.generate_constraints(cs.clone()).unwrap();

		assert!(cs.is_satisfied().unwrap());
	}

	#[test]
	fn test_blank_circuit_is_satisfied() {
		let cs = ConstraintSystem::<Fr>::new_ref();
		MembershipCircuit::blank(3).generate_constraints(cs.clone()).unwrap();
		assert!(cs.is_satisfied().unwrap());
	}

	#[test]
	fn test_circuit_with_wrong_root_fails() {
		let mut circuit = member_circuit();
		circuit.root = Fr::from(99999u64);

		let cs = ConstraintSystem::<Fr>::new_ref();
		circuit.generate_constraints(cs.clone()).unwrap();

		assert!(!cs.is_satisfied().unwrap());
	}

	#[test]
	fn test_circuit_with_wrong_nullifier_fails() {
		let mut circuit = member_circuit();
		circuit.nullifier = Fr::from(99999u64);

		let cs = ConstraintSystem::<Fr>::new_ref();
		circuit.generate_constraints(cs.clone()).unwrap();

		assert!(!cs.is_satisfied().unwrap());
	}

	#[test]
	fn test_circuit_with_flipped_path_bit_fails() {
		let mut circuit = member_circuit();
		circuit.path_bits[0] = !circuit.path_bits[0];

		let cs = ConstraintSystem::<Fr>::new_ref();
		circuit.generate_constraints(cs.clone()).unwrap();

		assert!(!cs.is_satisfied().unwrap());
	}

	proptest! {
		#[test]
		fn nullifier_is_a_function_of_secret_and_scope(
			secret in 1u64..,
			scope in any::<u64>(),
			other_scope in any::<u64>(),
		) {
			let (secret, scope) = (Fr::from(secret), Fr::from(scope));
			let nullifier = compute_nullifier(&scope, &secret);
			prop_assert_eq!(nullifier, compute_nullifier(&scope, &secret));
			prop_assert_eq!(nullifier, Identity::from_secret(secret).unwrap().nullifier(&scope));
			if other_scope != 0 {
				let other = scope + Fr::from(other_scope);
				prop_assert_ne!(nullifier, compute_nullifier(&other, &secret));
			}
		}
	}
}
