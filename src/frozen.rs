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

//! `Frozen<T>`: an immutable, queryable collection (spec §6). Construct
//! via [`Frozen::freeze`] (from a row iterator through a [`RowCodec`]) or
//! [`Frozen::freeze_raw`] (from an already-built `RecordBatch`), then call
//! [`Frozen::query`] to get a [`Queryable`] builder.

use std::sync::Arc;
use std::time::Instant;

use arrow::record_batch::RecordBatch;
use arrow_schema::SchemaRef;

use crate::config::EngineConfig;
use crate::error::{GlacierError, Result};
use crate::execution::{AggregateValue, CancellationToken, Executor, ExecutionOutput, GroupByResult};
use crate::ingest::{self, RowCodec};
use crate::logical_plan::builder::LogicalPlanBuilder;
use crate::logical_plan::{AggregateExpr, AggregateOp, LogicalPlan};
use crate::optimizer::Optimizer;
use crate::physical_plan::PhysicalPlan;
use crate::physical_plan::planner::PhysicalPlanner;
use crate::plan_cache::PlanCache;
use crate::predicate::Predicate;
use crate::query_result::QueryResult;
use crate::render::{self, LazyRows};
use crate::stats::ColumnStatistics;
use crate::zonemap::ZoneMap;

struct FrozenInner<T> {
    batch: RecordBatch,
    statistics: Vec<ColumnStatistics>,
    zone_maps: Vec<Option<ZoneMap>>,
    schema: SchemaRef,
    codec: Arc<dyn RowCodec<T>>,
    config: EngineConfig,
    plan_cache: PlanCache,
}

/// An immutable, in-process columnar collection frozen from either a row
/// sequence or a pre-built `RecordBatch`. Cheap to clone: every query
/// shares the same underlying batch and statistics.
pub struct Frozen<T> {
    inner: Arc<FrozenInner<T>>,
}

impl<T> Clone for Frozen<T> {
    fn clone(&self) -> Self {
        Self { inner: self.inner.clone() }
    }
}

impl<T> Frozen<T> {
    /// Ingests `records` through `codec` into a single batch, computing
    /// statistics and zone maps once (spec §6's `freeze`).
    pub fn freeze(
        records: impl Iterator<Item = T>,
        codec: Arc<dyn RowCodec<T>>,
        config: EngineConfig,
    ) -> Result<Self> {
        let out = ingest::ingest(records, codec.as_ref(), &config)?;
        Self::from_ingest(out, codec, config)
    }

    /// Wraps an already-built `RecordBatch` without re-encoding any
    /// column, computing statistics and zone maps directly from it (spec
    /// §6's `freeze_raw`). `codec` is still required: it is what later
    /// lets `to_list`/`first`/etc. materialize rows of `T` from this
    /// batch.
    pub fn freeze_raw(batch: RecordBatch, codec: Arc<dyn RowCodec<T>>, config: EngineConfig) -> Result<Self> {
        let out = ingest::ingest_raw(batch, &config)?;
        Self::from_ingest(out, codec, config)
    }

    fn from_ingest(out: ingest::IngestOutput, codec: Arc<dyn RowCodec<T>>, config: EngineConfig) -> Result<Self> {
        let schema = out.batch.schema();
        Ok(Self {
            inner: Arc::new(FrozenInner {
                batch: out.batch,
                statistics: out.statistics,
                zone_maps: out.zone_maps,
                schema,
                codec,
                plan_cache: PlanCache::new(config.plan_cache_capacity),
                config,
            }),
        })
    }

    pub fn schema(&self) -> &SchemaRef {
        &self.inner.schema
    }

    pub fn statistics(&self) -> &[ColumnStatistics] {
        &self.inner.statistics
    }

    pub fn num_rows(&self) -> usize {
        self.inner.batch.num_rows()
    }

    /// Starts a new query against this collection, scanning every row and
    /// column until narrowed by a combinator.
    pub fn query(&self) -> Queryable<T> {
        Queryable::new(self.inner.clone())
    }
}

/// A human-readable rendering of a query's chosen logical and physical
/// plans (spec §6's `explain`).
#[derive(Debug, Clone)]
pub struct PlanDescription {
    pub logical: String,
    pub physical: String,
}

impl std::fmt::Display for PlanDescription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Logical plan:\n{}", self.logical)?;
        write!(f, "Physical plan:\n{}", self.physical)
    }
}

/// A fluent, lazily-built query over a [`Frozen`] collection. Every
/// combinator consumes and returns `Self`; nothing executes until a
/// terminator (`count`, `first`, `to_list`, ...) is called.
pub struct Queryable<T> {
    frozen: Arc<FrozenInner<T>>,
    plan: LogicalPlan,
}

impl<T> Queryable<T> {
    fn new(frozen: Arc<FrozenInner<T>>) -> Self {
        let rows = frozen.batch.num_rows();
        let schema = frozen.schema.clone();
        Self {
            frozen,
            plan: LogicalPlanBuilder::scan(schema, rows).build(),
        }
    }

    fn rebuild(self, f: impl FnOnce(LogicalPlanBuilder) -> LogicalPlanBuilder) -> Self {
        let builder = f(LogicalPlanBuilder::from_plan(self.plan));
        Self { frozen: self.frozen, plan: builder.build() }
    }

    /// Narrows the selection by `predicates`, ANDed together.
    pub fn where_(self, predicates: Vec<Arc<Predicate>>) -> Self {
        let selectivity = Predicate::And(predicates.clone()).estimated_selectivity(&self.frozen.statistics);
        self.rebuild(|b| b.filter(predicates, selectivity))
    }

    pub fn select(self, columns: Vec<usize>) -> Self {
        self.rebuild(|b| b.project(columns))
    }

    pub fn order_by(self, column: usize, descending: bool) -> Self {
        self.rebuild(|b| b.order_by(column, descending))
    }

    pub fn group_by(self, key_column: usize, aggregations: Vec<AggregateExpr>, result_key_name: impl Into<String>) -> Self {
        self.rebuild(|b| b.group_by(key_column, aggregations, result_key_name))
    }

    pub fn distinct(self, columns: Vec<usize>) -> Self {
        self.rebuild(|b| b.distinct(columns))
    }

    pub fn limit(self, n: usize) -> Self {
        self.rebuild(|b| b.limit(n))
    }

    pub fn offset(self, n: usize) -> Self {
        self.rebuild(|b| b.offset(n))
    }

    fn token(&self) -> CancellationToken {
        CancellationToken::new(self.frozen.config.deadline_from(Instant::now()))
    }

    fn compile(&self, plan: &LogicalPlan) -> Result<Arc<PhysicalPlan>> {
        let optimized = Optimizer::default().optimize(plan, &self.frozen.statistics)?;
        let planner = PhysicalPlanner::new(self.frozen.config.clone());
        self.frozen
            .plan_cache
            .get_or_compile(&optimized, &planner, &self.frozen.statistics, Some(self.frozen.schema.as_ref()))
    }

    fn run(&self, plan: &LogicalPlan) -> Result<ExecutionOutput> {
        let physical = self.compile(plan)?;
        let executor = Executor::new(self.frozen.config.clone());
        executor.execute(&physical, &self.frozen.batch, &self.frozen.zone_maps, &self.token())
    }

    fn rows(&self) -> Result<QueryResult> {
        match self.run(&self.plan)? {
            ExecutionOutput::Rows(r) => Ok(r),
            _ => Err(GlacierError::Internal("expected a row-producing plan".to_string())),
        }
    }

    fn terminal_aggregate(&self, op: AggregateOp, column: Option<usize>) -> Result<AggregateValue> {
        let plan = LogicalPlanBuilder::from_plan(self.plan.clone())
            .aggregate(op, column, op.name())
            .build();
        match self.run(&plan)? {
            ExecutionOutput::Aggregate(v) => Ok(v),
            _ => Err(GlacierError::Internal("expected an aggregate plan".to_string())),
        }
    }

    /// Number of selected rows.
    pub fn count(&self) -> Result<u64> {
        Ok(self.rows()?.selected_indices.len() as u64)
    }

    /// True iff at least one row is selected.
    pub fn any(&self) -> Result<bool> {
        Ok(!self.rows()?.selected_indices.is_empty())
    }

    /// The first selected row, or `NoElements` if none matched.
    pub fn first(&self) -> Result<T> {
        let result = self.rows()?;
        let idx = result
            .selected_indices
            .iter()
            .next()
            .ok_or_else(|| GlacierError::NoElements { op: "first".to_string() })?;
        self.frozen.codec.read(&result.batch, idx)
    }

    /// Like [`Self::first`], but returns `T::default()` instead of
    /// `NoElements` over an empty selection (spec §8's boundary behavior).
    pub fn first_or_default(&self) -> Result<T>
    where
        T: Default,
    {
        match self.first() {
            Ok(v) => Ok(v),
            Err(GlacierError::NoElements { .. }) => Ok(T::default()),
            Err(e) => Err(e),
        }
    }

    pub fn sum(&self, column: usize) -> Result<AggregateValue> {
        self.terminal_aggregate(AggregateOp::Sum, Some(column))
    }

    pub fn avg(&self, column: usize) -> Result<AggregateValue> {
        self.terminal_aggregate(AggregateOp::Avg, Some(column))
    }

    pub fn min(&self, column: usize) -> Result<AggregateValue> {
        self.terminal_aggregate(AggregateOp::Min, Some(column))
    }

    pub fn max(&self, column: usize) -> Result<AggregateValue> {
        self.terminal_aggregate(AggregateOp::Max, Some(column))
    }

    /// Runs this query as a `GroupBy` terminator, returning one row per
    /// group. The query must have been built with [`Self::group_by`].
    pub fn grouped(&self) -> Result<GroupByResult> {
        match self.run(&self.plan)? {
            ExecutionOutput::Groups(g) => Ok(g),
            _ => Err(GlacierError::Internal("query was not built with group_by".to_string())),
        }
    }

    /// Materializes every selected row into `Vec<T>`.
    pub fn to_list(&self) -> Result<Vec<T>>
    where
        T: Send,
    {
        render::to_rows(&self.rows()?, self.frozen.codec.as_ref())
    }

    /// Alias for [`Self::to_list`] (spec §6 names both).
    pub fn to_array(&self) -> Result<Vec<T>>
    where
        T: Send,
    {
        self.to_list()
    }

    /// Renders the selection as a standalone `RecordBatch`, zero-copy
    /// where possible.
    pub fn to_batch(&self) -> Result<RecordBatch> {
        render::to_batch(&self.rows()?)
    }

    /// A lazily-materializing row sequence: nothing is read until the
    /// iterator is advanced.
    pub fn to_lazy_sequence(&self) -> Result<LazyQueryRows<T>> {
        Ok(LazyQueryRows { result: self.rows()?, codec: self.frozen.codec.clone() })
    }

    /// Renders the chosen logical and physical plans for this query
    /// (spec §6's `explain`).
    pub fn explain(&self) -> Result<PlanDescription> {
        let optimized = Optimizer::default().optimize(&self.plan, &self.frozen.statistics)?;
        let physical = self.compile(&self.plan)?;
        Ok(PlanDescription {
            logical: optimized.display_indented(),
            physical: physical.display_indented(),
        })
    }
}

/// Owns its `QueryResult` so the lazy sequence can outlive the `Queryable`
/// that produced it.
pub struct LazyQueryRows<T> {
    result: QueryResult,
    codec: Arc<dyn RowCodec<T>>,
}

impl<T> LazyQueryRows<T> {
    pub fn iter(&self) -> LazyRows<'_, T> {
        render::to_lazy_rows(&self.result, self.codec.as_ref())
    }
}

impl<T> IntoIterator for LazyQueryRows<T> {
    type Item = Result<T>;
    type IntoIter = std::vec::IntoIter<Result<T>>;

    fn into_iter(self) -> Self::IntoIter {
        let indices = self.result.selected_indices.to_vec();
        let rows: Vec<Result<T>> = indices
            .into_iter()
            .map(|i| self.codec.read(&self.result.batch, i as usize))
            .collect();
        rows.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predicate::{CompareOp, ScalarConst};
    use arrow::array::{ArrayRef, Int32Array};
    use arrow_schema::{DataType, Field, Schema};

    #[derive(Debug, Clone, PartialEq, Default)]
    struct Row {
        id: i32,
    }

    struct RowCodecImpl {
        schema: SchemaRef,
    }

    impl RowCodec<Row> for RowCodecImpl {
        fn read(&self, batch: &RecordBatch, row: usize) -> Result<Row> {
            let id = batch.column(0).as_any().downcast_ref::<Int32Array>().unwrap().value(row);
            Ok(Row { id })
        }
        fn write(&self, builders: &mut dyn crate::ingest::RowBuilders, item: &Row) -> Result<()> {
            builders.append(0, crate::ingest::CellValue::Int(item.id as i64))
        }
        fn schema(&self) -> SchemaRef {
            self.schema.clone()
        }
    }

    fn frozen(values: Vec<i32>) -> Frozen<Row> {
        let codec = Arc::new(RowCodecImpl {
            schema: Arc::new(Schema::new(vec![Field::new("id", DataType::Int32, false)])),
        });
        let rows = values.into_iter().map(|id| Row { id });
        Frozen::freeze(rows, codec, EngineConfig::default()).unwrap()
    }

    #[test]
    fn count_over_an_unfiltered_query_is_the_full_row_count() {
        let f = frozen(vec![1, 2, 3]);
        assert_eq!(f.query().count().unwrap(), 3);
    }

    #[test]
    fn where_narrows_the_selection() {
        let f = frozen(vec![1, 2, 3, 4, 5]);
        let predicate = Arc::new(Predicate::Comparison { column: 0, op: CompareOp::Gt, value: ScalarConst::Int64(3) });
        let n = f.query().where_(vec![predicate]).count().unwrap();
        assert_eq!(n, 2);
    }

    #[test]
    fn first_or_default_returns_default_on_empty_selection() {
        let f = frozen(vec![1, 2, 3]);
        let predicate = Arc::new(Predicate::Comparison { column: 0, op: CompareOp::Gt, value: ScalarConst::Int64(100) });
        let row = f.query().where_(vec![predicate]).first_or_default().unwrap();
        assert_eq!(row, Row::default());
    }

    #[test]
    fn to_list_materializes_every_selected_row_in_order() {
        let f = frozen(vec![10, 20, 30]);
        let rows = f.query().to_list().unwrap();
        assert_eq!(rows, vec![Row { id: 10 }, Row { id: 20 }, Row { id: 30 }]);
    }

    #[test]
    fn sum_aggregates_the_selected_column() {
        let f = frozen(vec![1, 2, 3, 4]);
        match f.query().sum(0).unwrap() {
            AggregateValue::Sum(ScalarConst::Int64(n)) => assert_eq!(n, 10),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn explain_renders_both_plans() {
        let f = frozen(vec![1, 2, 3]);
        let description = f.query().limit(2).explain().unwrap();
        assert!(description.logical.contains("Limit"));
        assert!(description.physical.contains("strategy"));
    }
}
