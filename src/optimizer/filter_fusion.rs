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

//! Merges two directly-nested `Filter` nodes into one, so later rules
//! (predicate reordering, zone-map evaluation) see a single flat
//! predicate list instead of having to recurse through a chain.

use std::sync::Arc;

use super::{map_input, OptimizerRule};
use crate::error::Result;
use crate::logical_plan::LogicalPlan;
use crate::stats::ColumnStatistics;

pub struct FilterFusion;

impl OptimizerRule for FilterFusion {
    fn name(&self) -> &str {
        "filter_fusion"
    }

    fn optimize(&self, plan: &LogicalPlan, stats: &[ColumnStatistics]) -> Result<LogicalPlan> {
        if let LogicalPlan::Filter { input, predicates, estimated_selectivity } = plan {
            if let LogicalPlan::Filter {
                input: inner_input,
                predicates: inner_predicates,
                estimated_selectivity: inner_selectivity,
            } = input.as_ref()
            {
                let mut merged = inner_predicates.clone();
                merged.extend(predicates.iter().cloned());
                let fused = LogicalPlan::Filter {
                    input: Arc::new(self.optimize(inner_input, stats)?),
                    predicates: merged,
                    estimated_selectivity: estimated_selectivity * inner_selectivity,
                };
                // Re-run in case of a longer chain (A over B over C).
                return self.optimize(&fused, stats);
            }
        }
        map_input(plan, &mut |child| self.optimize(child, stats))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logical_plan::builder::LogicalPlanBuilder;
    use crate::predicate::{CompareOp, Predicate, ScalarConst};
    use arrow_schema::{DataType, Field, Schema};

    fn schema() -> arrow_schema::SchemaRef {
        Arc::new(Schema::new(vec![Field::new("a", DataType::Int32, false)]))
    }

    fn cmp(col: usize, v: i64) -> Arc<Predicate> {
        Arc::new(Predicate::Comparison { column: col, op: CompareOp::Gt, value: ScalarConst::Int64(v) })
    }

    #[test]
    fn collapses_two_nested_filters_into_one() {
        let plan = LogicalPlanBuilder::scan(schema(), 10)
            .filter(vec![cmp(0, 1)], 0.5)
            .filter(vec![cmp(0, 2)], 0.5)
            .build();
        let rewritten = FilterFusion.optimize(&plan, &[]).unwrap();
        assert_eq!(rewritten.node_name(), "Filter");
        match &rewritten {
            LogicalPlan::Filter { predicates, input, .. } => {
                assert_eq!(predicates.len(), 2);
                assert_eq!(input.node_name(), "Scan");
            }
            _ => panic!("expected Filter"),
        }
    }
}
