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

//! Types shared by the prover, the engine and the rpc layer.
//!
//! Nothing in here performs I/O. The two wire formats the fee sponsor cares about,
//! the paymaster context and the paymaster data, live in [`context`] and [`payload`].

pub mod common;
pub mod context;
pub mod error;
pub mod payload;
pub mod pool;
pub mod root_history;
pub mod serde_hex;

pub use common::{Address, PoolId};
pub use context::{PaymasterContext, SpendingMode};
pub use payload::{PaymasterPayload, ProofPoints, PAYMASTER_DATA_LEN};
pub use pool::{Member, Pool, PoolMetadata};
pub use root_history::{RootHistory, RootHistoryEntry};

/// Scalar field of BN254. Roots, commitments, nullifiers, messages and scopes live here.
pub use ark_bn254::Fr as Field;
