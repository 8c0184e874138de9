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

//! Engine configuration, read from a camelCase JSON document. Every key is optional.

use crate::gas::GasSchedule;
use anon_paymaster_primitives::root_history::DEFAULT_ROOT_HISTORY_CAPACITY;
use serde::{Deserialize, Serialize};
use std::{path::PathBuf, time::Duration};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	#[error("cannot read config file: {0}")]
	Io(#[from] std::io::Error),
	#[error("invalid config: {0}")]
	Json(#[from] serde_json::Error),
	#[error("invalid config: {0}")]
	Invalid(&'static str),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
	/// GraphQL endpoint of the pool index
	pub index_url: String,
	pub index_timeout_ms: u64,
	/// Snapshot cache lifetime, keep it below the root rotation interval
	pub cache_ttl_secs: u64,
	/// Pools held in the snapshot cache, 0 disables caching
	pub cache_capacity: usize,
	pub root_history_capacity: u32,
	pub members_page_size: u32,
	/// Directory holding `membership-depth-{d}.pk` files
	pub proving_key_dir: Option<PathBuf>,
	pub gas: GasSchedule,
	pub post_op_gas_limit: u64,
}

impl Default for EngineConfig {
	fn default() -> Self {
		Self {
			index_url: "http://localhost:8000/graphql".into(),
			index_timeout_ms: 10_000,
			cache_ttl_secs: 12,
			cache_capacity: 32,
			root_history_capacity: DEFAULT_ROOT_HISTORY_CAPACITY,
			members_page_size: 1000,
			proving_key_dir: None,
			gas: GasSchedule::default(),
			post_op_gas_limit: 65_000,
		}
	}
}

impl EngineConfig {
	pub fn from_json(json: &str) -> Result<Self, ConfigError> {
		let config: Self = serde_json::from_str(json)?;
		config.validate()?;
		Ok(config)
	}

	pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
		Self::from_json(&std::fs::read_to_string(path)?)
	}

	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.root_history_capacity == 0 {
			return Err(ConfigError::Invalid("rootHistoryCapacity must be non-zero"))
		}
		if self.members_page_size == 0 {
			return Err(ConfigError::Invalid("membersPageSize must be non-zero"))
		}
		if self.index_timeout_ms == 0 {
			return Err(ConfigError::Invalid("indexTimeoutMs must be non-zero"))
		}
		Ok(())
	}

	pub fn index_timeout(&self) -> Duration {
		Duration::from_millis(self.index_timeout_ms)
	}

	pub fn cache_ttl(&self) -> Duration {
		Duration::from_secs(self.cache_ttl_secs)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn empty_document_gives_defaults() {
		assert_eq!(EngineConfig::from_json("{}").unwrap(), EngineConfig::default());
	}

	#[test]
	fn keys_are_camel_case() {
		let config = EngineConfig::from_json(
			r#"{
				"indexUrl": "https://index.example/graphql",
				"indexTimeoutMs": 2500,
				"rootHistoryCapacity": 30,
				"provingKeyDir": "/var/lib/keys",
				"gas": { "base": 100000 }
			}"#,
		)
		.unwrap();

		assert_eq!(config.index_url, "https://index.example/graphql");
		assert_eq!(config.index_timeout(), Duration::from_millis(2500));
		assert_eq!(config.root_history_capacity, 30);
		assert_eq!(config.proving_key_dir, Some(PathBuf::from("/var/lib/keys")));
		assert_eq!(config.gas, GasSchedule { base: 100_000, per_level: 2_000 });
		assert_eq!(config.cache_ttl(), Duration::from_secs(12));
	}

	#[test]
	fn zero_capacity_is_rejected() {
		assert!(matches!(
			EngineConfig::from_json(r#"{"rootHistoryCapacity": 0}"#),
			Err(ConfigError::Invalid(_))
		));
	}

	#[test]
	fn unparsable_document_is_rejected() {
		assert!(matches!(EngineConfig::from_json("{"), Err(ConfigError::Json(_))));
	}
}
