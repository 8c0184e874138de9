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

//! # Anonymous paymaster data engine
//!
//! Produces the `paymasterData` a fee sponsor needs to pay gas for a member of a prepaid pool
//! without learning which member it is.
//!
//! - [`gateway`]: read pool state from the external index ([`graphql`], [`cache`])
//! - [`resolver`]: pick the membership root to prove against
//! - [`assembler`]: stub and final paymaster data, proofs run on a blocking worker
//! - [`gas`]: verification gas overhead by tree depth

pub mod assembler;
pub mod cache;
pub mod config;
pub mod error;
pub mod gas;
pub mod gateway;
pub mod graphql;
pub mod intent;
pub mod mock;
pub mod resolver;
pub mod witness;

pub use assembler::{build_stub, FinalPaymasterData, PaymasterDataAssembler};
pub use cache::CachedGateway;
pub use config::{ConfigError, EngineConfig};
pub use error::Error;
pub use gas::{GasOverheadEstimator, GasSchedule};
pub use gateway::{fetch_pool_snapshot, GatewayError, PoolIndexGateway};
pub use graphql::GraphQlGateway;
pub use intent::UserOperationIntent;
pub use resolver::{MerkleRootResolver, ResolvedRoot};
