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

use anon_paymaster_primitives::Pool;
use serde::{Deserialize, Serialize};

/// Gas the fee sponsor spends on proof verification: `base + per_level * depth`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GasSchedule {
	/// Pairing checks and payload decoding
	pub base: u64,
	/// Public input handling per tree level
	pub per_level: u64,
}

impl Default for GasSchedule {
	fn default() -> Self {
		Self { base: 280_000, per_level: 2_000 }
	}
}

#[derive(Clone, Copy, Debug, Default)]
pub struct GasOverheadEstimator {
	schedule: GasSchedule,
}

impl GasOverheadEstimator {
	pub fn new(schedule: GasSchedule) -> Self {
		Self { schedule }
	}

	pub fn schedule(&self) -> GasSchedule {
		self.schedule
	}

	pub fn estimate(&self, pool: &Pool) -> u64 {
		self.estimate_for_depth(pool.depth())
	}

	pub fn estimate_for_depth(&self, depth: u8) -> u64 {
		self.schedule
			.base
			.saturating_add(self.schedule.per_level.saturating_mul(depth as u64))
	}
}
