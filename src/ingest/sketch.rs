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

//! A HyperLogLog-lite cardinality sketch, used once ingest's streaming
//! distinct-value sample exceeds the 1 Mi-value cap (spec §4.1). Trades
//! exactness for O(1) space; the estimate is flagged via
//! `ColumnStatistics::distinct_count_is_estimate`.

use ahash::AHasher;
use std::hash::{Hash, Hasher};

/// Number of buckets is `2^BUCKET_BITS`; `BUCKET_BITS = 11` (2048 buckets)
/// keeps the standard error around 2.3%, plenty for a selectivity
/// heuristic input rather than an exact count.
const BUCKET_BITS: u32 = 11;
const BUCKET_COUNT: usize = 1 << BUCKET_BITS;

pub struct HyperLogLiteSketch {
    buckets: Vec<u8>,
}

impl Default for HyperLogLiteSketch {
    fn default() -> Self {
        Self::new()
    }
}

impl HyperLogLiteSketch {
    pub fn new() -> Self {
        Self { buckets: vec![0u8; BUCKET_COUNT] }
    }

    pub fn insert<H: Hash>(&mut self, value: &H) {
        let mut hasher = AHasher::default();
        value.hash(&mut hasher);
        let hash = hasher.finish();

        let bucket = (hash & (BUCKET_COUNT as u64 - 1)) as usize;
        let rest = hash >> BUCKET_BITS;
        // Position of the lowest set bit among the remaining bits, 1-based;
        // an all-zero remainder (vanishingly unlikely) counts as the widest
        // possible run.
        let rank = (rest.trailing_zeros() + 1).min(64 - BUCKET_BITS) as u8;
        if rank > self.buckets[bucket] {
            self.buckets[bucket] = rank;
        }
    }

    /// The standard HyperLogLog harmonic-mean estimator with the
    /// small-range linear-counting correction.
    pub fn estimate(&self) -> u64 {
        let m = BUCKET_COUNT as f64;
        let alpha = 0.7213 / (1.0 + 1.079 / m);

        let sum: f64 = self.buckets.iter().map(|&b| 2f64.powi(-(b as i32))).sum();
        let raw = alpha * m * m / sum;

        let zero_buckets = self.buckets.iter().filter(|&&b| b == 0).count();
        if raw <= 2.5 * m && zero_buckets > 0 {
            (m * (m / zero_buckets as f64).ln()).round().max(0.0) as u64
        } else {
            raw.round().max(0.0) as u64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn estimates_within_rough_tolerance_of_true_cardinality() {
        let mut sketch = HyperLogLiteSketch::new();
        let true_cardinality = 50_000usize;
        for i in 0..true_cardinality {
            sketch.insert(&i);
        }
        let estimate = sketch.estimate() as f64;
        let err = (estimate - true_cardinality as f64).abs() / true_cardinality as f64;
        assert!(err < 0.1, "estimate {estimate} too far from {true_cardinality}");
    }

    #[test]
    fn repeated_inserts_do_not_inflate_the_estimate() {
        let mut sketch = HyperLogLiteSketch::new();
        for _ in 0..10_000 {
            sketch.insert(&"same-value");
        }
        assert!(sketch.estimate() < 10);
    }

    #[test]
    fn empty_sketch_estimates_zero() {
        let sketch = HyperLogLiteSketch::new();
        assert_eq!(sketch.estimate(), 0);
    }
}
