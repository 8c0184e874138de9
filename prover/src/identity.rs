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

//! Membership identity: a secret scalar and its public commitment.

use crate::{
	circuit::{compute_commitment, compute_nullifier},
	error::ProverError,
};
use anon_paymaster_primitives::{
	common::{field_from_be_bytes, field_to_be_bytes},
	Field,
};
use ark_ff::{PrimeField, UniformRand, Zero};
use ark_std::rand::{CryptoRng, RngCore};
use blake2::{Blake2b512, Digest};

const PHRASE_DOMAIN: &[u8] = b"anon-paymaster/identity/v1";

/// The secret never leaves this type except through [`Identity::secret_bytes`], and
/// `Debug` only shows the commitment.
#[derive(Clone, PartialEq, Eq)]
pub struct Identity {
	secret: Field,
	commitment: Field,
}

impl Identity {
	pub fn from_secret(secret: Field) -> Result<Self, ProverError> {
		if secret.is_zero() {
			return Err(ProverError::InvalidSecret)
		}
		Ok(Self { commitment: compute_commitment(&secret), secret })
	}

	/// Big-endian canonical scalar, as produced by [`Identity::secret_bytes`].
	pub fn from_secret_bytes(bytes: &[u8; 32]) -> Result<Self, ProverError> {
		Self::from_secret(field_from_be_bytes(bytes).ok_or(ProverError::InvalidSecret)?)
	}

	/// Derive an identity from a passphrase.
	pub fn from_phrase(phrase: &str) -> Result<Self, ProverError> {
		let digest = Blake2b512::new()
			.chain_update(PHRASE_DOMAIN)
			.chain_update(phrase.as_bytes())
			.finalize();
		Self::from_secret(Field::from_le_bytes_mod_order(&digest))
	}

	pub fn random<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
		loop {
			if let Ok(identity) = Self::from_secret(Field::rand(rng)) {
				return identity
			}
		}
	}

	pub fn commitment(&self) -> Field {
		self.commitment
	}

	/// Nullifier this identity produces within `scope`.
	pub fn nullifier(&self, scope: &Field) -> Field {
		compute_nullifier(scope, &self.secret)
	}

	pub fn secret_bytes(&self) -> [u8; 32] {
		field_to_be_bytes(&self.secret)
	}

	pub(crate) fn secret(&self) -> Field {
		self.secret
	}
}

impl core::fmt::Debug for Identity {
	fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
		f.debug_struct("Identity")
			.field("commitment", &self.commitment)
			.finish_non_exhaustive()
	}
}
