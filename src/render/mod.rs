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

//! Turns a [`QueryResult`] into a caller-visible output (spec §4.8): rows
//! of `T` via a [`RowCodec`], a columnar `RecordBatch` with zero-copy fast
//! paths, or a lazy one-row-at-a-time sequence. Renderers never mutate the
//! input batch.

use std::sync::Arc;

use arrow::compute::take;
use arrow::record_batch::RecordBatch;
use arrow_schema::{Schema, SchemaRef};

use crate::error::Result;
use crate::ingest::RowCodec;
use crate::query_result::{QueryResult, SelectedIndices};

/// Threshold above which `to_list` splits the index range across worker
/// chunks instead of materializing rows on the calling thread (spec
/// §4.8's "fan out to workers" for large result sets), matching the
/// executor's own parallel-vs-sequential cutoff.
const ROW_FANOUT_THRESHOLD: usize = 50_000;

/// Materializes every selected row of `result` into `Vec<T>` via `codec`.
/// Large result sets fan out across `execution::parallel::map_chunks`'s
/// worker pool; row order always matches `result.selected_indices`.
pub fn to_rows<T: Send>(result: &QueryResult, codec: &dyn RowCodec<T>) -> Result<Vec<T>> {
    let indices = result.selected_indices.to_vec();
    if indices.len() < ROW_FANOUT_THRESHOLD {
        return indices
            .into_iter()
            .map(|i| codec.read(&result.batch, i as usize))
            .collect();
    }

    let chunks = crate::execution::parallel::map_chunks(indices.len(), ROW_FANOUT_THRESHOLD / 4 + 1, |start, end| {
        indices[start..end]
            .iter()
            .map(|&i| codec.read(&result.batch, i as usize))
            .collect::<Result<Vec<T>>>()
    });
    let mut out = Vec::with_capacity(indices.len());
    for chunk in chunks {
        out.extend(chunk?);
    }
    Ok(out)
}

/// A lazy, one-row-at-a-time view over `result`: nothing is materialized
/// until [`Iterator::next`] is called (spec §4.8's "lazy sequence").
pub struct LazyRows<'a, T> {
    batch: &'a RecordBatch,
    codec: &'a dyn RowCodec<T>,
    indices: std::vec::IntoIter<u32>,
}

impl<'a, T> Iterator for LazyRows<'a, T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        self.indices.next().map(|i| self.codec.read(self.batch, i as usize))
    }
}

pub fn to_lazy_rows<'a, T>(result: &'a QueryResult, codec: &'a dyn RowCodec<T>) -> LazyRows<'a, T> {
    LazyRows {
        batch: &result.batch,
        codec,
        indices: result.selected_indices.to_vec().into_iter(),
    }
}

/// Renders `result` as a standalone `RecordBatch`, applying zero-copy
/// fast paths per spec §4.8:
///
/// - full scan + full projection: the original batch, untouched;
/// - full scan + subset projection: a new batch sharing column `Arc`s,
///   no row copying;
/// - otherwise: every column is filtered through `arrow::compute::take`,
///   which preserves null semantics for every array type this crate's
///   predicate layer already supports.
pub fn to_batch(result: &QueryResult) -> Result<RecordBatch> {
    let is_full_scan = matches!(
        &result.selected_indices,
        SelectedIndices::Range(start, end) if *start == 0 && *end == result.batch.num_rows()
    );

    match (&result.projected_columns, is_full_scan) {
        (None, true) => Ok(result.batch.clone()),
        (Some(columns), true) => project_columns(&result.batch, columns),
        _ => {
            let projected = match &result.projected_columns {
                Some(columns) => project_columns(&result.batch, columns)?,
                None => result.batch.clone(),
            };
            take_rows(&projected, &result.selected_indices)
        }
    }
}

fn project_columns(batch: &RecordBatch, columns: &[usize]) -> Result<RecordBatch> {
    let schema: SchemaRef = Arc::new(Schema::new(
        columns.iter().map(|&i| batch.schema().field(i).clone()).collect::<Vec<_>>(),
    ));
    let arrays = columns.iter().map(|&i| batch.column(i).clone()).collect::<Vec<_>>();
    Ok(RecordBatch::try_new(schema, arrays)?)
}

fn take_rows(batch: &RecordBatch, selected: &SelectedIndices) -> Result<RecordBatch> {
    let indices = arrow::array::UInt32Array::from(selected.to_vec());
    let arrays = batch
        .columns()
        .iter()
        .map(|col| take(col.as_ref(), &indices, None))
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(RecordBatch::try_new(batch.schema(), arrays)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query_result::QueryMetadata;
    use arrow::array::{ArrayRef, Int32Array};
    use arrow_schema::{DataType, Field};

    fn batch() -> RecordBatch {
        let a = Arc::new(Int32Array::from(vec![1, 2, 3, 4, 5])) as ArrayRef;
        let schema = Arc::new(Schema::new(vec![Field::new("a", DataType::Int32, false)]));
        RecordBatch::try_new(schema, vec![a]).unwrap()
    }

    #[test]
    fn full_scan_full_projection_returns_the_original_batch() {
        let b = batch();
        let result = QueryResult::full_scan(b.clone());
        let out = to_batch(&result).unwrap();
        assert_eq!(out.num_rows(), 5);
    }

    #[test]
    fn filtered_selection_preserves_only_selected_rows() {
        let b = batch();
        let result = QueryResult {
            batch: b,
            selected_indices: SelectedIndices::List(vec![1, 3]),
            projected_columns: None,
            metadata: QueryMetadata::default(),
        };
        let out = to_batch(&result).unwrap();
        let col = out.column(0).as_any().downcast_ref::<Int32Array>().unwrap();
        assert_eq!(col.values(), &[2, 4]);
    }

    #[test]
    fn subset_projection_on_a_full_scan_shares_column_references() {
        let b = batch();
        let mut result = QueryResult::full_scan(b);
        result.projected_columns = Some(vec![0]);
        let out = to_batch(&result).unwrap();
        assert_eq!(out.num_columns(), 1);
    }
}
