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

//! Pushes a `Filter` below an intervening `Project`, so predicates run
//! against the widest available row set and closest to the scan (where
//! zone maps and dictionaries live), rather than after columns have
//! already been dropped or reordered.

use std::sync::Arc;

use super::{map_input, OptimizerRule};
use crate::error::Result;
use crate::logical_plan::LogicalPlan;
use crate::predicate::Predicate;
use crate::stats::ColumnStatistics;

pub struct PredicatePushDown;

impl OptimizerRule for PredicatePushDown {
    fn name(&self) -> &str {
        "predicate_pushdown"
    }

    fn optimize(&self, plan: &LogicalPlan, stats: &[ColumnStatistics]) -> Result<LogicalPlan> {
        if let LogicalPlan::Filter { input, predicates, estimated_selectivity } = plan {
            if let LogicalPlan::Project { input: proj_input, columns } = input.as_ref() {
                let remapped: Vec<Arc<Predicate>> = predicates
                    .iter()
                    .map(|p| Arc::new(remap_columns(p, columns)))
                    .collect();
                let pushed = LogicalPlan::Project {
                    input: Arc::new(LogicalPlan::Filter {
                        input: Arc::new(self.optimize(proj_input, stats)?),
                        predicates: remapped,
                        estimated_selectivity: *estimated_selectivity,
                    }),
                    columns: columns.clone(),
                };
                return self.optimize(&pushed, stats);
            }
        }
        map_input(plan, &mut |child| self.optimize(child, stats))
    }
}

/// Rewrites every column reference in `predicate` from a `Project`'s
/// output index to the corresponding input index, via `columns[output]
/// = input`.
fn remap_columns(predicate: &Predicate, columns: &[usize]) -> Predicate {
    match predicate {
        Predicate::NullTest { column, is_null } => {
            Predicate::NullTest { column: columns[*column], is_null: *is_null }
        }
        Predicate::Comparison { column, op, value } => Predicate::Comparison {
            column: columns[*column],
            op: *op,
            value: value.clone(),
        },
        Predicate::Between { column, lo, hi, lo_inclusive, hi_inclusive } => Predicate::Between {
            column: columns[*column],
            lo: lo.clone(),
            hi: hi.clone(),
            lo_inclusive: *lo_inclusive,
            hi_inclusive: *hi_inclusive,
        },
        Predicate::StringEquality { column, value, mode } => Predicate::StringEquality {
            column: columns[*column],
            value: value.clone(),
            mode: *mode,
        },
        Predicate::StringOperation { column, pattern, op, mode } => Predicate::StringOperation {
            column: columns[*column],
            pattern: pattern.clone(),
            op: *op,
            mode: *mode,
        },
        Predicate::And(children) => {
            Predicate::And(children.iter().map(|c| Arc::new(remap_columns(c, columns))).collect())
        }
        Predicate::Or(children) => {
            Predicate::Or(children.iter().map(|c| Arc::new(remap_columns(c, columns))).collect())
        }
        Predicate::Not(child) => Predicate::Not(Arc::new(remap_columns(child, columns))),
    }
}
