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

//! Marks a `Filter` directly feeding an `Aggregate` as fusable by
//! moving its predicates into `Aggregate::fused_filter` and eliding the
//! `Filter` node. The physical planner then recognizes `fused_filter.is_some()`
//! and lowers the pair to a single fused filter+aggregate operator that
//! never materializes the intermediate selection bitmap (spec §4.4).

use std::sync::Arc;

use super::{map_input, OptimizerRule};
use crate::error::Result;
use crate::logical_plan::LogicalPlan;
use crate::stats::ColumnStatistics;

pub struct AggregateFilterFusion;

impl OptimizerRule for AggregateFilterFusion {
    fn name(&self) -> &str {
        "aggregate_filter_fusion"
    }

    fn optimize(&self, plan: &LogicalPlan, stats: &[ColumnStatistics]) -> Result<LogicalPlan> {
        if let LogicalPlan::Aggregate { input, op, column, output_name, fused_filter: None } = plan {
            if let LogicalPlan::Filter { input: filter_input, predicates, .. } = input.as_ref() {
                return Ok(LogicalPlan::Aggregate {
                    input: Arc::new(self.optimize(filter_input, stats)?),
                    op: *op,
                    column: *column,
                    output_name: output_name.clone(),
                    fused_filter: Some(predicates.clone()),
                });
            }
        }
        map_input(plan, &mut |child| self.optimize(child, stats))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logical_plan::builder::LogicalPlanBuilder;
    use crate::logical_plan::AggregateOp;
    use crate::predicate::{CompareOp, Predicate, ScalarConst};
    use arrow_schema::{DataType, Field, Schema};

    fn schema() -> arrow_schema::SchemaRef {
        Arc::new(Schema::new(vec![Field::new("a", DataType::Int32, false)]))
    }

    #[test]
    fn fuses_filter_directly_feeding_an_aggregate() {
        let plan = LogicalPlanBuilder::scan(schema(), 100)
            .filter(
                vec![Arc::new(Predicate::Comparison { column: 0, op: CompareOp::Gt, value: ScalarConst::Int64(1) })],
                0.5,
            )
            .aggregate(AggregateOp::Count, None, "n")
            .build();
        let rewritten = AggregateFilterFusion.optimize(&plan, &[]).unwrap();
        match rewritten {
            LogicalPlan::Aggregate { input, fused_filter, .. } => {
                assert_eq!(input.node_name(), "Scan");
                assert_eq!(fused_filter.unwrap().len(), 1);
            }
            _ => panic!("expected Aggregate"),
        }
    }
}
