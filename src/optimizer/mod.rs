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

//! Logical-plan optimization, applied to a fixpoint. Each rule is
//! idempotent and side-effect free, mirroring the teacher's
//! `OptimizerRule` trait (see `datafusion/core/src/optimizer/limit_push_down.rs`).

mod aggregate_filter_fusion;
mod filter_fusion;
mod limit_pushdown;
mod predicate_pushdown;
mod predicate_reorder;
mod projection_pruning;

use crate::error::Result;
use crate::logical_plan::LogicalPlan;
use crate::stats::ColumnStatistics;

/// A single, self-contained rewrite over a [`LogicalPlan`].
pub trait OptimizerRule: Send + Sync {
    fn optimize(&self, plan: &LogicalPlan, stats: &[ColumnStatistics]) -> Result<LogicalPlan>;
    fn name(&self) -> &str;
}

/// Runs the standard rule set to a fixpoint (at most `max_passes` times,
/// as a termination backstop against an accidentally non-idempotent rule).
pub struct Optimizer {
    rules: Vec<Box<dyn OptimizerRule>>,
    max_passes: usize,
}

impl Default for Optimizer {
    fn default() -> Self {
        Self {
            rules: vec![
                Box::new(filter_fusion::FilterFusion),
                Box::new(predicate_pushdown::PredicatePushDown),
                Box::new(predicate_reorder::PredicateReorder),
                Box::new(projection_pruning::ProjectionPruning),
                Box::new(limit_pushdown::LimitPushDown),
                Box::new(aggregate_filter_fusion::AggregateFilterFusion),
            ],
            max_passes: 8,
        }
    }
}

impl Optimizer {
    pub fn optimize(&self, plan: &LogicalPlan, stats: &[ColumnStatistics]) -> Result<LogicalPlan> {
        let mut current = plan.clone();
        for pass in 0..self.max_passes {
            let before = format!("{current:?}");
            for rule in &self.rules {
                current = rule.optimize(&current, stats)?;
                log::debug!("optimizer rule `{}` applied (pass {pass})", rule.name());
            }
            if format!("{current:?}") == before {
                break;
            }
        }
        Ok(current)
    }
}

/// Shared helper: rewrites `plan`'s input in place via `f`, leaving every
/// other field untouched. Used by rules that only care about one node
/// kind and otherwise need to recurse transparently, mirroring the
/// teacher's `utils::from_plan` recursion idiom.
pub(crate) fn map_input(
    plan: &LogicalPlan,
    f: &mut dyn FnMut(&LogicalPlan) -> Result<LogicalPlan>,
) -> Result<LogicalPlan> {
    use std::sync::Arc;
    use LogicalPlan::*;
    Ok(match plan {
        Scan { .. } => plan.clone(),
        Filter { input, predicates, estimated_selectivity } => Filter {
            input: Arc::new(f(input)?),
            predicates: predicates.clone(),
            estimated_selectivity: *estimated_selectivity,
        },
        Project { input, columns } => Project {
            input: Arc::new(f(input)?),
            columns: columns.clone(),
        },
        Aggregate { input, op, column, output_name, fused_filter } => Aggregate {
            input: Arc::new(f(input)?),
            op: *op,
            column: *column,
            output_name: output_name.clone(),
            fused_filter: fused_filter.clone(),
        },
        GroupBy { input, key_column, aggregations, result_key_name } => GroupBy {
            input: Arc::new(f(input)?),
            key_column: *key_column,
            aggregations: aggregations.clone(),
            result_key_name: result_key_name.clone(),
        },
        Sort { input, keys } => Sort {
            input: Arc::new(f(input)?),
            keys: keys.clone(),
        },
        Distinct { input, columns } => Distinct {
            input: Arc::new(f(input)?),
            columns: columns.clone(),
        },
        Limit { input, n } => Limit {
            input: Arc::new(f(input)?),
            n: *n,
        },
        Offset { input, n } => Offset {
            input: Arc::new(f(input)?),
            n: *n,
        },
    })
}
