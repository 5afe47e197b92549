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

//! Reorders a `Filter` node's top-level predicate list ascending by
//! estimated selectivity, so the cheapest-to-satisfy predicate runs
//! first and gives the `And` short-circuit (see
//! `Predicate::evaluate`) the best chance of an early empty bitmap.
//! Ties are broken in favor of zone-map-evaluable predicates, then
//! dictionary-fast-path candidates, then original order (a stable sort).

use super::{map_input, OptimizerRule};
use crate::error::Result;
use crate::logical_plan::LogicalPlan;
use crate::stats::ColumnStatistics;

pub struct PredicateReorder;

impl OptimizerRule for PredicateReorder {
    fn name(&self) -> &str {
        "predicate_reorder"
    }

    fn optimize(&self, plan: &LogicalPlan, stats: &[ColumnStatistics]) -> Result<LogicalPlan> {
        if let LogicalPlan::Filter { input, predicates, estimated_selectivity } = plan {
            let mut ordered = predicates.clone();
            if !stats.is_empty() {
                ordered.sort_by(|a, b| {
                    let sel_a = a.estimated_selectivity(stats);
                    let sel_b = b.estimated_selectivity(stats);
                    sel_a
                        .partial_cmp(&sel_b)
                        .unwrap_or(std::cmp::Ordering::Equal)
                        .then_with(|| tier(b).cmp(&tier(a)))
                });
            }
            return Ok(LogicalPlan::Filter {
                input: std::sync::Arc::new(self.optimize(input, stats)?),
                predicates: ordered,
                estimated_selectivity: *estimated_selectivity,
            });
        }
        map_input(plan, &mut |child| self.optimize(child, stats))
    }
}

/// Higher tiers are preferred on a selectivity tie: zone-map-evaluable
/// predicates can skip whole chunks without even touching row data;
/// dictionary fast-path predicates are still O(d) + O(n) rather than
/// O(n) string comparisons.
fn tier(p: &crate::predicate::Predicate) -> u8 {
    if p.is_zone_map_evaluable() {
        2
    } else if p.is_dictionary_fast_path_candidate() {
        1
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logical_plan::builder::LogicalPlanBuilder;
    use crate::predicate::{CompareOp, Predicate, ScalarConst};
    use crate::stats::ColumnStatistics;
    use arrow_schema::{DataType, Field, Schema};
    use std::sync::Arc;

    fn schema() -> arrow_schema::SchemaRef {
        Arc::new(Schema::new(vec![
            Field::new("a", DataType::Int32, false),
            Field::new("b", DataType::Int32, false),
        ]))
    }

    fn stats() -> Vec<ColumnStatistics> {
        vec![
            ColumnStatistics {
                name: "a".into(),
                value_type: DataType::Int32,
                total_count: 100,
                null_count: 0,
                distinct_count: 50,
                distinct_count_is_estimate: false,
                min_max: None,
            },
            ColumnStatistics {
                name: "b".into(),
                value_type: DataType::Int32,
                total_count: 100,
                null_count: 0,
                distinct_count: 2,
                distinct_count_is_estimate: false,
                min_max: None,
            },
        ]
    }

    #[test]
    fn puts_most_selective_predicate_first() {
        let loose = Arc::new(Predicate::Comparison { column: 0, op: CompareOp::Eq, value: ScalarConst::Int64(1) });
        let tight = Arc::new(Predicate::Comparison { column: 1, op: CompareOp::Eq, value: ScalarConst::Int64(1) });
        let plan = LogicalPlanBuilder::scan(schema(), 100)
            .filter(vec![loose, tight], 1.0)
            .build();
        let rewritten = PredicateReorder.optimize(&plan, &stats()).unwrap();
        match rewritten {
            LogicalPlan::Filter { predicates, .. } => match predicates[0].as_ref() {
                Predicate::Comparison { column, .. } => assert_eq!(*column, 1),
                _ => panic!(),
            },
            _ => panic!("expected Filter"),
        }
    }
}
