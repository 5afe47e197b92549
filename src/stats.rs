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

//! Per-column statistics computed once during ingest and consulted by the
//! optimizer (predicate reordering, selectivity estimates) and the
//! physical planner.

use arrow_schema::DataType;

use crate::predicate::ScalarConst;

/// Orderable column bound, stored as the engine's scalar-constant
/// representation so min/max can be compared against predicate constants
/// without re-downcasting arrays.
#[derive(Debug, Clone, PartialEq)]
pub struct MinMax {
    pub min: ScalarConst,
    pub max: ScalarConst,
}

/// Statistics computed for a single column during ingest. Immutable after
/// construction; shared read-only by every query issued against the
/// owning [`crate::frozen::Frozen`] collection.
#[derive(Debug, Clone)]
pub struct ColumnStatistics {
    pub name: String,
    pub value_type: DataType,
    pub total_count: usize,
    pub null_count: usize,
    /// Exact below the streaming-sample cap (1 Mi values); an estimate
    /// from a cardinality sketch above it. See `ingest::sketch`.
    pub distinct_count: usize,
    pub distinct_count_is_estimate: bool,
    pub min_max: Option<MinMax>,
}

impl ColumnStatistics {
    /// Estimated selectivity in `[0.0, 1.0]` of an equality predicate
    /// against this column, assuming a uniform distribution over distinct
    /// values. Ties in the optimizer's predicate ordering are broken by
    /// zone-map/dictionary evaluability, not by finer selectivity
    /// distinctions, so a uniform-distribution heuristic is adequate here;
    /// spec leaves the exact constants open for string predicates
    /// (resolved in DESIGN.md).
    pub fn equality_selectivity(&self) -> f64 {
        if self.total_count == 0 || self.distinct_count == 0 {
            return 0.0;
        }
        1.0 / self.distinct_count as f64
    }

    /// Heuristic selectivity for a range/between predicate when min/max
    /// bounds are known: proportional to the requested range's overlap
    /// with `[min, max]`, clamped to `[0, 1]`. Falls back to `0.33` (a
    /// deliberately conservative default, documented in DESIGN.md) when
    /// bounds are unavailable (non-orderable columns, all-null columns).
    pub fn range_selectivity(&self, lo: Option<&ScalarConst>, hi: Option<&ScalarConst>) -> f64 {
        let Some(mm) = &self.min_max else {
            return 0.33;
        };
        let (Some(span), Some(overlap)) = (mm.max.numeric_span(&mm.min), {
            let lo = lo.cloned().unwrap_or_else(|| mm.min.clone());
            let hi = hi.cloned().unwrap_or_else(|| mm.max.clone());
            (mm.max.numeric_span(&mm.min), hi.numeric_span(&lo))
        }) else {
            return 0.33;
        };
        if span <= 0.0 {
            return 1.0;
        }
        (overlap / span).clamp(0.0, 1.0)
    }

    /// Heuristic selectivity for string predicates, per the open question
    /// in spec §9 — resolved (see DESIGN.md) as: equality uses
    /// [`Self::equality_selectivity`]; prefix/suffix/contains/like use a
    /// fixed `0.25` unless the column is dictionary-eligible, in which
    /// case `1.0 / distinct_count` is a tighter, still-heuristic bound.
    pub fn string_op_selectivity(&self) -> f64 {
        if self.distinct_count > 0 {
            (1.0 / self.distinct_count as f64).max(0.05)
        } else {
            0.25
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(total: usize, distinct: usize) -> ColumnStatistics {
        ColumnStatistics {
            name: "c".into(),
            value_type: DataType::Int32,
            total_count: total,
            null_count: 0,
            distinct_count: distinct,
            distinct_count_is_estimate: false,
            min_max: None,
        }
    }

    #[test]
    fn equality_selectivity_is_inverse_of_cardinality() {
        let s = stats(1000, 10);
        assert_eq!(s.equality_selectivity(), 0.1);
    }

    #[test]
    fn empty_column_has_zero_selectivity() {
        let s = stats(0, 0);
        assert_eq!(s.equality_selectivity(), 0.0);
    }

    #[test]
    fn range_selectivity_without_bounds_falls_back() {
        let s = stats(1000, 1000);
        assert_eq!(s.range_selectivity(None, None), 0.33);
    }
}
