// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Engine-wide configuration knobs, threaded through ingest, the optimizer,
//! the physical planner and the executor.

use std::time::{Duration, Instant};

/// Tunable knobs for a [`crate::frozen::Frozen`] collection and the queries
/// run against it. `Default` matches spec's enumerated defaults exactly.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Dictionary-encode a string column when `distinct_count / total_count`
    /// is at or below this threshold.
    pub dictionary_threshold: f64,
    /// Rows per zone-map chunk.
    pub zone_map_chunk_size: usize,
    /// Whether the physical planner may choose the `parallel` strategy at all.
    pub parallel_enabled: bool,
    /// Rows per parallel work chunk.
    pub parallel_chunk_size: usize,
    /// Minimum row count before the planner considers the parallel strategy.
    pub parallel_threshold_rows: usize,
    /// Soft cap on the number of entries held by the plan cache.
    pub plan_cache_capacity: usize,
    /// Whether `UnsupportedExpression` may fall back to host-side row
    /// materialization instead of aborting the query.
    pub fallback_allowed: bool,
    /// Optional wall-clock deadline applied to every query issued against
    /// this configuration.
    pub deadline: Option<Duration>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            dictionary_threshold: 0.5,
            zone_map_chunk_size: 16 * 1024,
            parallel_enabled: true,
            parallel_chunk_size: 16 * 1024,
            parallel_threshold_rows: 50_000,
            plan_cache_capacity: 1024,
            fallback_allowed: false,
            deadline: None,
        }
    }
}

impl EngineConfig {
    /// Builds an absolute deadline `Instant` from `self.deadline`, anchored
    /// to `now`, if one is configured.
    pub fn deadline_from(&self, now: Instant) -> Option<Instant> {
        self.deadline.map(|d| now + d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.dictionary_threshold, 0.5);
        assert_eq!(cfg.zone_map_chunk_size, 16384);
        assert!(cfg.parallel_enabled);
        assert_eq!(cfg.parallel_chunk_size, 16384);
        assert_eq!(cfg.parallel_threshold_rows, 50_000);
        assert_eq!(cfg.plan_cache_capacity, 1024);
        assert!(!cfg.fallback_allowed);
        assert!(cfg.deadline.is_none());
    }
}
