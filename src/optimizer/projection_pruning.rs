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

//! Computes, top-down, the set of columns actually demanded of each
//! node and annotates `Scan::projection` with it, so the executor never
//! materializes a column nothing downstream reads.
//!
//! If a predicate pushed down onto a `Scan` that was already pruned by
//! an earlier pass (or built with an explicit narrow projection) needs
//! a column outside that projection, the column is added back rather
//! than left to panic later, and the event is logged at `warn`.

use std::sync::Arc;

use super::OptimizerRule;
use crate::error::Result;
use crate::logical_plan::LogicalPlan;
use crate::stats::ColumnStatistics;

pub struct ProjectionPruning;

impl OptimizerRule for ProjectionPruning {
    fn name(&self) -> &str {
        "projection_pruning"
    }

    fn optimize(&self, plan: &LogicalPlan, _stats: &[ColumnStatistics]) -> Result<LogicalPlan> {
        prune(plan, None)
    }
}

/// `demand`: columns required by everything above this node, in terms
/// of *this node's own output* schema. `None` means "all columns" (the
/// query root, or any node whose consumer we can't see through, e.g.
/// a full-batch render).
fn prune(plan: &LogicalPlan, demand: Option<&[usize]>) -> Result<LogicalPlan> {
    match plan {
        LogicalPlan::Scan { schema, estimated_rows, projection, limit } => {
            let mut new_projection = projection.clone();
            if let Some(cols) = demand {
                let mut merged: Vec<usize> = match &projection {
                    Some(existing) => {
                        let mut m = existing.clone();
                        let missing: Vec<usize> = cols
                            .iter()
                            .copied()
                            .filter(|c| !existing.contains(c))
                            .collect();
                        if !missing.is_empty() {
                            log::warn!(
                                "un-pruning scan projection: columns {missing:?} required by a \
                                 pushed-down consumer were absent from the existing projection {existing:?}"
                            );
                            m.extend(missing);
                        }
                        m
                    }
                    None => cols.to_vec(),
                };
                merged.sort_unstable();
                merged.dedup();
                new_projection = Some(merged);
            }
            Ok(LogicalPlan::Scan {
                schema: schema.clone(),
                estimated_rows: *estimated_rows,
                projection: new_projection,
                limit: *limit,
            })
        }
        LogicalPlan::Filter { input, predicates, estimated_selectivity } => {
            let mut required: Vec<usize> = demand.map(|d| d.to_vec()).unwrap_or_default();
            let all_demanded = demand.is_none();
            for p in predicates {
                p.referenced_columns(&mut required);
            }
            let child_demand = if all_demanded { None } else { Some(required.as_slice()) };
            Ok(LogicalPlan::Filter {
                input: Arc::new(prune(input, child_demand)?),
                predicates: predicates.clone(),
                estimated_selectivity: *estimated_selectivity,
            })
        }
        LogicalPlan::Project { input, columns } => {
            let child_demand: Vec<usize> = match demand {
                Some(d) => d.iter().map(|&i| columns[i]).collect(),
                None => columns.clone(),
            };
            Ok(LogicalPlan::Project {
                input: Arc::new(prune(input, Some(&child_demand))?),
                columns: columns.clone(),
            })
        }
        LogicalPlan::Aggregate { input, op, column, output_name, fused_filter } => {
            let mut required: Vec<usize> = column.into_iter().copied().collect();
            if let Some(fused) = fused_filter {
                for p in fused {
                    p.referenced_columns(&mut required);
                }
            }
            Ok(LogicalPlan::Aggregate {
                input: Arc::new(prune(input, Some(&required))?),
                op: *op,
                column: *column,
                output_name: output_name.clone(),
                fused_filter: fused_filter.clone(),
            })
        }
        LogicalPlan::GroupBy { input, key_column, aggregations, result_key_name } => {
            let mut required = vec![*key_column];
            for a in aggregations {
                if let Some(c) = a.column {
                    required.push(c);
                }
            }
            Ok(LogicalPlan::GroupBy {
                input: Arc::new(prune(input, Some(&required))?),
                key_column: *key_column,
                aggregations: aggregations.clone(),
                result_key_name: result_key_name.clone(),
            })
        }
        LogicalPlan::Sort { input, keys } => {
            let mut required: Vec<usize> = demand.map(|d| d.to_vec()).unwrap_or_default();
            let all_demanded = demand.is_none();
            required.extend(keys.iter().map(|k| k.column));
            let child_demand = if all_demanded { None } else { Some(required.as_slice()) };
            Ok(LogicalPlan::Sort {
                input: Arc::new(prune(input, child_demand)?),
                keys: keys.clone(),
            })
        }
        LogicalPlan::Distinct { input, columns } => {
            let mut required: Vec<usize> = demand.map(|d| d.to_vec()).unwrap_or_default();
            let all_demanded = demand.is_none();
            required.extend(columns.iter().copied());
            let child_demand = if all_demanded { None } else { Some(required.as_slice()) };
            Ok(LogicalPlan::Distinct {
                input: Arc::new(prune(input, child_demand)?),
                columns: columns.clone(),
            })
        }
        LogicalPlan::Limit { input, n } => Ok(LogicalPlan::Limit {
            input: Arc::new(prune(input, demand)?),
            n: *n,
        }),
        LogicalPlan::Offset { input, n } => Ok(LogicalPlan::Offset {
            input: Arc::new(prune(input, demand)?),
            n: *n,
        }),
    }
}
