//! Core ZK circuit and prover logic for anonymous gas pool membership.
//!
//! Pure arkworks code, no network and no async. Used by the engine crate, which runs
//! [`prover::MembershipProver::generate`] on a blocking worker.

pub mod circuit;
pub mod error;
pub mod identity;
pub mod prover;
pub mod tree;

pub use error::ProverError;
pub use identity::Identity;
pub use prover::{
	stub_proof, MembershipProof, MembershipProver, ProofRequest, ProvingKeyStore, TrustedSetup,
};
pub use tree::{MembershipTree, MembershipWitness};
