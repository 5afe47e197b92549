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

//! Immutable logical plan trees: `Scan / Filter / Project / Aggregate /
//! GroupBy / Sort / Distinct / Limit / Offset`.

pub mod builder;

use std::sync::Arc;

use arrow_schema::SchemaRef;

use crate::predicate::Predicate;

/// A single aggregation within an `Aggregate` or `GroupBy` node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateOp {
    Count,
    Sum,
    Avg,
    Min,
    Max,
}

impl AggregateOp {
    pub fn name(self) -> &'static str {
        match self {
            AggregateOp::Count => "count",
            AggregateOp::Sum => "sum",
            AggregateOp::Avg => "avg",
            AggregateOp::Min => "min",
            AggregateOp::Max => "max",
        }
    }
}

/// One requested aggregation: `op(column)`, or `op` alone for `Count`
/// over all rows.
#[derive(Debug, Clone)]
pub struct AggregateExpr {
    pub op: AggregateOp,
    pub column: Option<usize>,
    pub output_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

#[derive(Debug, Clone)]
pub struct SortKey {
    pub column: usize,
    pub direction: SortDirection,
}

/// An immutable logical plan node. Trees are built bottom-up and are
/// value-equal/structurally hashable (see [`crate::plan_cache`]);
/// short-lived, one per query.
#[derive(Debug, Clone)]
pub enum LogicalPlan {
    Scan {
        schema: SchemaRef,
        estimated_rows: usize,
        /// `None` means all columns; set by projection pruning.
        projection: Option<Vec<usize>>,
        limit: Option<usize>,
    },
    Filter {
        input: Arc<LogicalPlan>,
        predicates: Vec<Arc<Predicate>>,
        estimated_selectivity: f64,
    },
    Project {
        input: Arc<LogicalPlan>,
        columns: Vec<usize>,
    },
    Aggregate {
        input: Arc<LogicalPlan>,
        op: AggregateOp,
        column: Option<usize>,
        output_name: String,
        /// Set by the optimizer's aggregate+filter fusion rule when a
        /// `Filter` directly fed this `Aggregate` and both are simple
        /// enough to fuse (spec §4.4's "Aggregate+Filter fusion marker").
        /// `input` above is then the filter's own input (e.g. the scan),
        /// with the filter node itself elided.
        fused_filter: Option<Vec<Arc<Predicate>>>,
    },
    GroupBy {
        input: Arc<LogicalPlan>,
        key_column: usize,
        aggregations: Vec<AggregateExpr>,
        result_key_name: String,
    },
    Sort {
        input: Arc<LogicalPlan>,
        keys: Vec<SortKey>,
    },
    Distinct {
        input: Arc<LogicalPlan>,
        columns: Vec<usize>,
    },
    Limit {
        input: Arc<LogicalPlan>,
        n: usize,
    },
    Offset {
        input: Arc<LogicalPlan>,
        n: usize,
    },
}

impl LogicalPlan {
    pub fn input(&self) -> Option<&Arc<LogicalPlan>> {
        match self {
            LogicalPlan::Scan { .. } => None,
            LogicalPlan::Filter { input, .. }
            | LogicalPlan::Project { input, .. }
            | LogicalPlan::Aggregate { input, .. }
            | LogicalPlan::GroupBy { input, .. }
            | LogicalPlan::Sort { input, .. }
            | LogicalPlan::Distinct { input, .. }
            | LogicalPlan::Limit { input, .. }
            | LogicalPlan::Offset { input, .. } => Some(input),
        }
    }

    /// A short, stable node-kind tag used by the plan cache's fingerprint
    /// and by `explain()`'s rendering.
    pub fn node_name(&self) -> &'static str {
        match self {
            LogicalPlan::Scan { .. } => "Scan",
            LogicalPlan::Filter { .. } => "Filter",
            LogicalPlan::Project { .. } => "Project",
            LogicalPlan::Aggregate { .. } => "Aggregate",
            LogicalPlan::GroupBy { .. } => "GroupBy",
            LogicalPlan::Sort { .. } => "Sort",
            LogicalPlan::Distinct { .. } => "Distinct",
            LogicalPlan::Limit { .. } => "Limit",
            LogicalPlan::Offset { .. } => "Offset",
        }
    }

    /// Renders the plan tree one node per line, indented by depth — the
    /// backbone of `explain()`.
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
            LogicalPlan::Scan { estimated_rows, projection, limit, .. } => format!(
                "Scan: rows~={estimated_rows}, projection={projection:?}, limit={limit:?}"
            ),
            LogicalPlan::Filter { predicates, estimated_selectivity, .. } => format!(
                "Filter: predicates={}, selectivity~={estimated_selectivity:.4}",
                predicates.len()
            ),
            LogicalPlan::Project { columns, .. } => format!("Project: columns={columns:?}"),
            LogicalPlan::Aggregate { op, column, output_name, fused_filter, .. } => {
                let fused = fused_filter.as_ref().map(|p| p.len()).unwrap_or(0);
                format!(
                    "Aggregate: {}({:?}) as {output_name}, fused_predicates={fused}",
                    op.name(),
                    column
                )
            }
            LogicalPlan::GroupBy { key_column, aggregations, .. } => format!(
                "GroupBy: key=#{key_column}, aggregations={}",
                aggregations.len()
            ),
            LogicalPlan::Sort { keys, .. } => format!("Sort: keys={}", keys.len()),
            LogicalPlan::Distinct { columns, .. } => format!("Distinct: columns={columns:?}"),
            LogicalPlan::Limit { n, .. } => format!("Limit: {n}"),
            LogicalPlan::Offset { n, .. } => format!("Offset: {n}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::builder::LogicalPlanBuilder;
    use arrow_schema::{DataType, Field, Schema, SchemaRef};
    use std::sync::Arc;

    fn test_schema() -> SchemaRef {
        Arc::new(Schema::new(vec![
            Field::new("id", DataType::Int32, false),
            Field::new("age", DataType::Int32, true),
        ]))
    }

    #[test]
    fn display_indented_nests_by_depth() {
        let plan = LogicalPlanBuilder::scan(test_schema(), 100)
            .limit(10)
            .build();
        let rendered = plan.display_indented();
        assert!(rendered.starts_with("Limit: 10"));
        assert!(rendered.contains("  Scan:"));
    }
}
