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

//! Physical plan nodes: a mirror of [`crate::logical_plan::LogicalPlan`],
//! each additionally annotated with the [`ExecutionStrategy`] the planner
//! chose for it and a rough cost estimate (spec §3, §4.5).

pub mod planner;

use std::sync::Arc;

use arrow_schema::SchemaRef;

use crate::logical_plan::{AggregateExpr, AggregateOp, SortKey};
use crate::predicate::Predicate;

/// The strategy a node will execute with. Chosen once, at planning time,
/// from the cost model in spec §4.5; never re-chosen mid-execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionStrategy {
    /// Scalar, row-by-row.
    Sequential,
    /// Lane-width vectorized kernels (falls back to scalar on stable
    /// builds without the `simd` feature; still "the SIMD path"
    /// conceptually, see `predicate::simd`).
    Simd,
    /// Chunked fan-out across a bounded worker pool. Carries the chunk
    /// size actually used (spec's `parallel_chunk_size`, possibly
    /// overridden by config).
    Parallel(usize),
    /// Filter + Aggregate collapsed into a single pass that never
    /// materializes the intermediate selection bitmap (spec §4.4's
    /// fusion marker, realized here).
    Fused,
}

/// A physical plan node. Structurally identical to [`crate::logical_plan::LogicalPlan`]
/// but each node additionally carries the strategy the planner chose and
/// an estimated cost (rows × the strategy's per-row cost constant).
#[derive(Debug, Clone)]
pub enum PhysicalPlan {
    Scan {
        schema: SchemaRef,
        estimated_rows: usize,
        projection: Option<Vec<usize>>,
        limit: Option<usize>,
        strategy: ExecutionStrategy,
        cost: f64,
    },
    Filter {
        input: Arc<PhysicalPlan>,
        predicates: Vec<Arc<Predicate>>,
        strategy: ExecutionStrategy,
        cost: f64,
    },
    Project {
        input: Arc<PhysicalPlan>,
        columns: Vec<usize>,
    },
    Aggregate {
        input: Arc<PhysicalPlan>,
        op: AggregateOp,
        column: Option<usize>,
        output_name: String,
        fused_filter: Option<Vec<Arc<Predicate>>>,
        strategy: ExecutionStrategy,
        cost: f64,
    },
    GroupBy {
        input: Arc<PhysicalPlan>,
        key_column: usize,
        aggregations: Vec<AggregateExpr>,
        result_key_name: String,
        strategy: ExecutionStrategy,
        cost: f64,
    },
    Sort {
        input: Arc<PhysicalPlan>,
        keys: Vec<SortKey>,
    },
    Distinct {
        input: Arc<PhysicalPlan>,
        columns: Vec<usize>,
    },
    Limit {
        input: Arc<PhysicalPlan>,
        n: usize,
    },
    Offset {
        input: Arc<PhysicalPlan>,
        n: usize,
    },
}

impl PhysicalPlan {
    pub fn input(&self) -> Option<&Arc<PhysicalPlan>> {
        match self {
            PhysicalPlan::Scan { .. } => None,
            PhysicalPlan::Filter { input, .. }
            | PhysicalPlan::Project { input, .. }
            | PhysicalPlan::Aggregate { input, .. }
            | PhysicalPlan::GroupBy { input, .. }
            | PhysicalPlan::Sort { input, .. }
            | PhysicalPlan::Distinct { input, .. }
            | PhysicalPlan::Limit { input, .. }
            | PhysicalPlan::Offset { input, .. } => Some(input),
        }
    }

    pub fn node_name(&self) -> &'static str {
        match self {
            PhysicalPlan::Scan { .. } => "Scan",
            PhysicalPlan::Filter { .. } => "Filter",
            PhysicalPlan::Project { .. } => "Project",
            PhysicalPlan::Aggregate { .. } => "Aggregate",
            PhysicalPlan::GroupBy { .. } => "GroupBy",
            PhysicalPlan::Sort { .. } => "Sort",
            PhysicalPlan::Distinct { .. } => "Distinct",
            PhysicalPlan::Limit { .. } => "Limit",
            PhysicalPlan::Offset { .. } => "Offset",
        }
    }

    /// Human-readable rendering of the chosen strategy per node, the
    /// backbone of the public `explain()` diagnostic (spec §6).
    pub fn display_indented(&self) -> String {
        let mut out = String::new();
        self.write_indented(&mut out, 0);
        out
    }

    fn write_indented(&self, out: &mut String, depth: usize) {
        for _ in 0..depth {
            out.push_str("  ");
        }
        out.push_str(&self.node_detail());
        out.push('\n');
        if let Some(input) = self.input() {
            input.write_indented(out, depth + 1);
        }
    }

    fn node_detail(&self) -> String {
        match self {
            PhysicalPlan::Scan { estimated_rows, projection, limit, strategy, cost, .. } => format!(
                "Scan: rows~={estimated_rows}, projection={projection:?}, limit={limit:?}, strategy={strategy:?}, cost~={cost:.1}"
            ),
            PhysicalPlan::Filter { predicates, strategy, cost, .. } => format!(
                "Filter: predicates={}, strategy={strategy:?}, cost~={cost:.1}",
                predicates.len()
            ),
            PhysicalPlan::Project { columns, .. } => format!("Project: columns={columns:?}"),
            PhysicalPlan::Aggregate { op, column, output_name, fused_filter, strategy, cost, .. } => {
                let fused = fused_filter.as_ref().map(|p| p.len()).unwrap_or(0);
                format!(
                    "Aggregate: {}({:?}) as {output_name}, fused_predicates={fused}, strategy={strategy:?}, cost~={cost:.1}",
                    op.name(),
                    column
                )
            }
            PhysicalPlan::GroupBy { key_column, aggregations, strategy, cost, .. } => format!(
                "GroupBy: key=#{key_column}, aggregations={}, strategy={strategy:?}, cost~={cost:.1}",
                aggregations.len()
            ),
            PhysicalPlan::Sort { keys, .. } => format!("Sort: keys={}", keys.len()),
            PhysicalPlan::Distinct { columns, .. } => format!("Distinct: columns={columns:?}"),
            PhysicalPlan::Limit { n, .. } => format!("Limit: {n}"),
            PhysicalPlan::Offset { n, .. } => format!("Offset: {n}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::logical_plan::builder::LogicalPlanBuilder;
    use arrow_schema::{DataType, Field, Schema};

    fn schema() -> SchemaRef {
        Arc::new(Schema::new(vec![Field::new("a", DataType::Int32, false)]))
    }

    #[test]
    fn display_indented_includes_strategy() {
        let logical = LogicalPlanBuilder::scan(schema(), 100).limit(5).build();
        let physical = planner::PhysicalPlanner::new(EngineConfig::default())
            .plan(&logical, &[], None)
            .unwrap();
        let rendered = physical.display_indented();
        assert!(rendered.contains("strategy"));
    }
}
