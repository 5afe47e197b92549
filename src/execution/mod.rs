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

//! Walks a [`PhysicalPlan`] against a single `RecordBatch`, producing
//! either selected rows, a scalar aggregate, or grouped aggregates (spec
//! §3, §5). Cancellation is checked at every node boundary and again
//! between chunks of a fused filter+aggregate pass.

pub mod aggregate;
pub mod cancellation;
pub mod distinct;
pub mod groupby;
pub mod parallel;
pub mod sort;

use std::sync::Arc;

use arrow::record_batch::RecordBatch;

pub use aggregate::AggregateValue;
pub use cancellation::CancellationToken;
pub use groupby::GroupByResult;

use crate::bitmap::pool::BitmapPool;
use crate::config::EngineConfig;
use crate::error::{GlacierError, Result};
use crate::physical_plan::{ExecutionStrategy, PhysicalPlan};
use crate::predicate::Predicate;
use crate::query_result::{QueryMetadata, QueryResult, SelectedIndices};
use crate::zonemap::ZoneMap;

/// What a plan produced: a set of rows, a single scalar, or one row per
/// group, matching the three logical-plan shapes spec §3 distinguishes.
pub enum ExecutionOutput {
    Rows(QueryResult),
    Aggregate(AggregateValue),
    Groups(GroupByResult),
}

/// Executes physical plans against one batch at a time. Owns a
/// [`BitmapPool`] so repeated `Filter`/fused-aggregate evaluations across
/// chunks reuse the same handful of allocations instead of paying a fresh
/// one per chunk.
pub struct Executor {
    config: EngineConfig,
    bitmap_pool: BitmapPool,
}

impl Executor {
    pub fn new(config: EngineConfig) -> Self {
        Self { config, bitmap_pool: BitmapPool::new() }
    }

    pub fn execute(
        &self,
        plan: &PhysicalPlan,
        batch: &RecordBatch,
        zone_maps: &[Option<ZoneMap>],
        token: &CancellationToken,
    ) -> Result<ExecutionOutput> {
        token.check()?;
        match plan {
            PhysicalPlan::Aggregate { .. } => Ok(ExecutionOutput::Aggregate(
                self.execute_aggregate(plan, batch, zone_maps, token)?,
            )),
            PhysicalPlan::GroupBy { .. } => Ok(ExecutionOutput::Groups(
                self.execute_group_by(plan, batch, zone_maps, token)?,
            )),
            _ => Ok(ExecutionOutput::Rows(self.execute_rows(plan, batch, zone_maps, token)?)),
        }
    }

    fn execute_rows(
        &self,
        plan: &PhysicalPlan,
        batch: &RecordBatch,
        zone_maps: &[Option<ZoneMap>],
        token: &CancellationToken,
    ) -> Result<QueryResult> {
        token.check()?;
        match plan {
            PhysicalPlan::Scan { projection, limit, .. } => {
                let mut result = QueryResult::full_scan(batch.clone());
                result.projected_columns = projection.clone();
                result.metadata.strategy = Some("scan".to_string());
                if let Some(n) = limit {
                    result.selected_indices = result.selected_indices.limit(*n);
                }
                Ok(result)
            }
            PhysicalPlan::Filter { input, predicates, strategy, .. } => {
                let input_result = self.execute_rows(input, batch, zone_maps, token)?;
                let input_indices: Vec<u32> = input_result.selected_indices.to_vec();
                let selected =
                    self.evaluate_predicates(batch, zone_maps, predicates, &input_indices, *strategy, token)?;
                Ok(QueryResult {
                    batch: batch.clone(),
                    selected_indices: SelectedIndices::List(selected),
                    projected_columns: input_result.projected_columns,
                    metadata: QueryMetadata {
                        strategy: Some(format!("{strategy:?}")),
                        ..input_result.metadata
                    },
                })
            }
            PhysicalPlan::Project { input, columns } => {
                let mut result = self.execute_rows(input, batch, zone_maps, token)?;
                result.projected_columns = Some(columns.clone());
                Ok(result)
            }
            PhysicalPlan::Sort { input, keys } => {
                let input_result = self.execute_rows(input, batch, zone_maps, token)?;
                let sorted = sort::sort_indices(batch, keys, input_result.selected_indices.iter())?;
                Ok(QueryResult {
                    batch: batch.clone(),
                    selected_indices: SelectedIndices::List(sorted),
                    projected_columns: input_result.projected_columns,
                    metadata: input_result.metadata,
                })
            }
            PhysicalPlan::Distinct { input, columns } => {
                let input_result = self.execute_rows(input, batch, zone_maps, token)?;
                let deduped = distinct::distinct_indices(batch, columns, input_result.selected_indices.iter())?;
                Ok(QueryResult {
                    batch: batch.clone(),
                    selected_indices: SelectedIndices::List(deduped),
                    projected_columns: input_result.projected_columns,
                    metadata: input_result.metadata,
                })
            }
            PhysicalPlan::Limit { input, n } => {
                let mut result = self.execute_rows(input, batch, zone_maps, token)?;
                result.selected_indices = result.selected_indices.limit(*n);
                Ok(result)
            }
            PhysicalPlan::Offset { input, n } => {
                let mut result = self.execute_rows(input, batch, zone_maps, token)?;
                result.selected_indices = result.selected_indices.offset(*n);
                Ok(result)
            }
            PhysicalPlan::Aggregate { .. } | PhysicalPlan::GroupBy { .. } => Err(GlacierError::Internal(
                "aggregate/group-by plans do not produce rows".to_string(),
            )),
        }
    }

    fn execute_aggregate(
        &self,
        plan: &PhysicalPlan,
        batch: &RecordBatch,
        zone_maps: &[Option<ZoneMap>],
        token: &CancellationToken,
    ) -> Result<AggregateValue> {
        match plan {
            PhysicalPlan::Aggregate { input, op, column, fused_filter, strategy, .. } => {
                token.check()?;
                let indices: Vec<usize> = match fused_filter {
                    Some(predicates) => {
                        self.fused_filtered_indices(input, batch, predicates, zone_maps, token, *strategy)?
                    }
                    None => {
                        let input_result = self.execute_rows(input, batch, zone_maps, token)?;
                        input_result.selected_indices.iter().collect()
                    }
                };
                aggregate::aggregate(batch, *op, *column, indices.into_iter())
            }
            _ => Err(GlacierError::Internal("expected an aggregate plan".to_string())),
        }
    }

    /// Evaluates `predicates` over `input_indices`, using one pooled
    /// scratch bitmap per chunk so the full-range selection is never
    /// materialized at once (spec §4.4's fusion marker). Under
    /// `ExecutionStrategy::Parallel`, chunks fan out across
    /// `execution::parallel::map_chunks`'s worker pool; results still come
    /// back in ascending chunk-index order.
    fn evaluate_predicates(
        &self,
        batch: &RecordBatch,
        zone_maps: &[Option<ZoneMap>],
        predicates: &[Arc<Predicate>],
        input_indices: &[u32],
        strategy: ExecutionStrategy,
        token: &CancellationToken,
    ) -> Result<Vec<u32>> {
        let len = batch.num_rows();
        let eval_chunk = |chunk: &[u32]| -> Result<Vec<u32>> {
            token.check()?;
            let mut scratch = self.bitmap_pool.acquire_cleared(len);
            for &i in chunk {
                scratch.set(i as usize);
            }
            for predicate in predicates {
                predicate.evaluate(batch, zone_maps, &mut scratch)?;
                if scratch.is_all_clear() {
                    break;
                }
            }
            Ok(scratch.iterate_set())
        };

        match strategy {
            ExecutionStrategy::Parallel(chunk_size) => {
                let chunk_size = chunk_size.max(1);
                let chunked: Vec<Result<Vec<u32>>> =
                    parallel::map_chunks(input_indices.len(), chunk_size, |start, end| {
                        eval_chunk(&input_indices[start..end])
                    });
                let mut out = Vec::new();
                for r in chunked {
                    out.extend(r?);
                }
                Ok(out)
            }
            _ => {
                let chunk_size = self.config.parallel_chunk_size.max(1);
                let mut out = Vec::new();
                for chunk in input_indices.chunks(chunk_size) {
                    out.extend(eval_chunk(chunk)?);
                }
                Ok(out)
            }
        }
    }

    fn fused_filtered_indices(
        &self,
        input: &PhysicalPlan,
        batch: &RecordBatch,
        predicates: &[Arc<Predicate>],
        zone_maps: &[Option<ZoneMap>],
        token: &CancellationToken,
        strategy: ExecutionStrategy,
    ) -> Result<Vec<usize>> {
        let input_result = self.execute_rows(input, batch, zone_maps, token)?;
        let input_indices: Vec<u32> = input_result.selected_indices.to_vec();
        let selected = self.evaluate_predicates(batch, zone_maps, predicates, &input_indices, strategy, token)?;
        Ok(selected.into_iter().map(|i| i as usize).collect())
    }

    fn execute_group_by(
        &self,
        plan: &PhysicalPlan,
        batch: &RecordBatch,
        zone_maps: &[Option<ZoneMap>],
        token: &CancellationToken,
    ) -> Result<GroupByResult> {
        match plan {
            PhysicalPlan::GroupBy { input, key_column, aggregations, result_key_name, .. } => {
                token.check()?;
                let input_result = self.execute_rows(input, batch, zone_maps, token)?;
                groupby::group_by(
                    batch,
                    *key_column,
                    aggregations,
                    result_key_name,
                    input_result.selected_indices.iter(),
                )
            }
            _ => Err(GlacierError::Internal("expected a group-by plan".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logical_plan::AggregateOp;
    use crate::physical_plan::ExecutionStrategy;
    use crate::predicate::{CompareOp, ScalarConst};
    use arrow::array::{ArrayRef, Int32Array};
    use arrow_schema::{DataType, Field, Schema, SchemaRef};
    use std::sync::Arc as StdArc;

    fn schema() -> SchemaRef {
        StdArc::new(Schema::new(vec![Field::new("a", DataType::Int32, false)]))
    }

    fn batch() -> RecordBatch {
        let a = StdArc::new(Int32Array::from(vec![1, 5, 10, 15, 20])) as ArrayRef;
        RecordBatch::try_new(schema(), vec![a]).unwrap()
    }

    fn no_zone_maps() -> Vec<Option<ZoneMap>> {
        vec![None]
    }

    #[test]
    fn scan_then_filter_selects_matching_rows() {
        let executor = Executor::new(EngineConfig::default());
        let scan = PhysicalPlan::Scan {
            schema: schema(),
            estimated_rows: 5,
            projection: None,
            limit: None,
            strategy: ExecutionStrategy::Sequential,
            cost: 5.0,
        };
        let filter = PhysicalPlan::Filter {
            input: StdArc::new(scan),
            predicates: vec![StdArc::new(Predicate::Comparison {
                column: 0,
                op: CompareOp::Gt,
                value: ScalarConst::Int64(9),
            })],
            strategy: ExecutionStrategy::Sequential,
            cost: 5.0,
        };
        let b = batch();
        let output = executor
            .execute(&filter, &b, &no_zone_maps(), &CancellationToken::none())
            .unwrap();
        match output {
            ExecutionOutput::Rows(result) => {
                assert_eq!(result.selected_indices.to_vec(), vec![2, 3, 4]);
            }
            _ => panic!("expected rows"),
        }
    }

    #[test]
    fn fused_filter_aggregate_counts_matching_rows_without_a_filter_node() {
        let executor = Executor::new(EngineConfig::default());
        let scan = PhysicalPlan::Scan {
            schema: schema(),
            estimated_rows: 5,
            projection: None,
            limit: None,
            strategy: ExecutionStrategy::Sequential,
            cost: 5.0,
        };
        let plan = PhysicalPlan::Aggregate {
            input: StdArc::new(scan),
            op: AggregateOp::Count,
            column: None,
            output_name: "n".to_string(),
            fused_filter: Some(vec![StdArc::new(Predicate::Comparison {
                column: 0,
                op: CompareOp::Gt,
                value: ScalarConst::Int64(9),
            })]),
            strategy: ExecutionStrategy::Fused,
            cost: 1.0,
        };
        let b = batch();
        let output = executor
            .execute(&plan, &b, &no_zone_maps(), &CancellationToken::none())
            .unwrap();
        match output {
            ExecutionOutput::Aggregate(AggregateValue::Count(n)) => assert_eq!(n, 3),
            _ => panic!("expected an aggregate"),
        }
    }

    #[test]
    fn cancellation_short_circuits_execution() {
        let executor = Executor::new(EngineConfig::default());
        let scan = PhysicalPlan::Scan {
            schema: schema(),
            estimated_rows: 5,
            projection: None,
            limit: None,
            strategy: ExecutionStrategy::Sequential,
            cost: 5.0,
        };
        let token = CancellationToken::none();
        token.cancel();
        let result = executor.execute(&scan, &batch(), &no_zone_maps(), &token);
        assert!(matches!(result, Err(GlacierError::Cancelled)));
    }
}
