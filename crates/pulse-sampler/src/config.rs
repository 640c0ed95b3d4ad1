// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Configuration for the sampler engine.

use serde::{Deserialize, Serialize};

const DEFAULT_REPORT_INTERVAL_MS: u64 = 1000;

/// Configuration for a sampler engine instance.
///
/// The pacing interval is not configured here; it is derived from the
/// device's maximum sample rate stored in the
/// [`RuntimeContext`](pulse_core::RuntimeContext).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SamplerConfig {
    /// Length of the reporting window in milliseconds. Ticks are
    /// aggregated into one published rate per window, and a runtime that
    /// produces no tick for a full window is considered stalled.
    pub report_interval_ms: u64,
}

impl SamplerConfig {
    /// Load a sampler configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load a sampler configuration from a JSON file.
    pub fn from_file(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::from_json(&content)?)
    }

    /// Save this configuration to a JSON file.
    pub fn to_file(&self, path: &str) -> Result<(), Box<dyn std::error::Error>> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            report_interval_ms: DEFAULT_REPORT_INTERVAL_MS,
        }
    }
}
