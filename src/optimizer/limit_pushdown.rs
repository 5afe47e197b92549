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

//! Pushes `Limit` through nodes that cannot change which rows would
//! have been produced first (`Project`, `Offset`), and merges directly
//! nested `Limit`s by taking the smaller bound.
//!
//! `Limit` is never pushed below `Filter`, `GroupBy`, `Aggregate`, `Sort`
//! or `Distinct`: each of those can change the row count or row
//! identity in ways that would make a smaller upstream limit unsound
//! (a `Filter` below a pushed `Limit` could discard exactly the rows
//! the limit was meant to keep).

use std::sync::Arc;

use super::{map_input, OptimizerRule};
use crate::error::Result;
use crate::logical_plan::LogicalPlan;
use crate::stats::ColumnStatistics;

pub struct LimitPushDown;

impl OptimizerRule for LimitPushDown {
    fn name(&self) -> &str {
        "limit_pushdown"
    }

    fn optimize(&self, plan: &LogicalPlan, stats: &[ColumnStatistics]) -> Result<LogicalPlan> {
        if let LogicalPlan::Limit { input, n } = plan {
            match input.as_ref() {
                LogicalPlan::Limit { input: inner_input, n: inner_n } => {
                    let merged = LogicalPlan::Limit {
                        input: inner_input.clone(),
                        n: (*n).min(*inner_n),
                    };
                    return self.optimize(&merged, stats);
                }
                LogicalPlan::Project { input: proj_input, columns } => {
                    let pushed = LogicalPlan::Project {
                        input: Arc::new(LogicalPlan::Limit {
                            input: proj_input.clone(),
                            n: *n,
                        }),
                        columns: columns.clone(),
                    };
                    return self.optimize(&pushed, stats);
                }
                LogicalPlan::Offset { input: off_input, n: offset_n } => {
                    let pushed = LogicalPlan::Offset {
                        input: Arc::new(LogicalPlan::Limit {
                            input: off_input.clone(),
                            n: n.saturating_add(*offset_n),
                        }),
                        n: *offset_n,
                    };
                    return self.optimize(&pushed, stats);
                }
                _ => {}
            }
        }
        map_input(plan, &mut |child| self.optimize(child, stats))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logical_plan::builder::LogicalPlanBuilder;
    use arrow_schema::{DataType, Field, Schema};

    fn schema() -> arrow_schema::SchemaRef {
        Arc::new(Schema::new(vec![Field::new("a", DataType::Int32, false)]))
    }

    #[test]
    fn pushes_limit_below_project() {
        let plan = LogicalPlanBuilder::scan(schema(), 100)
            .project(vec![0])
            .limit(5)
            .build();
        let rewritten = LimitPushDown.optimize(&plan, &[]).unwrap();
        assert_eq!(rewritten.node_name(), "Project");
        assert_eq!(rewritten.input().unwrap().node_name(), "Limit");
    }

    #[test]
    fn merges_nested_limits_to_the_smaller_bound() {
        let plan = LogicalPlanBuilder::scan(schema(), 100).limit(10).limit(3).build();
        let rewritten = LimitPushDown.optimize(&plan, &[]).unwrap();
        match rewritten {
            LogicalPlan::Limit { n, .. } => assert_eq!(n, 3),
            _ => panic!("expected Limit"),
        }
    }

    #[test]
    fn does_not_push_limit_below_filter() {
        let plan = LogicalPlanBuilder::scan(schema(), 100)
            .filter(vec![], 1.0)
            .limit(5)
            .build();
        let rewritten = LimitPushDown.optimize(&plan, &[]).unwrap();
        assert_eq!(rewritten.node_name(), "Limit");
        assert_eq!(rewritten.input().unwrap().node_name(), "Filter");
    }
}
