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

//! `QueryResult`: the row-returning executor's output, consumed by
//! [`crate::render`]. Deliberately avoids eagerly materializing a full
//! index list for a full, unfiltered scan (spec §3's "lazy range"
//! representation).

use arrow::record_batch::RecordBatch;

/// The set of rows a query selected out of its source batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectedIndices {
    /// `[start, end)`, monotonically increasing by construction. Used for
    /// full (or contiguous limit/offset-trimmed) scans so a full scan
    /// costs O(1) rather than O(n) to represent.
    Range(usize, usize),
    /// An explicit, ascending, deduplicated index list. Used once a
    /// `Filter`, `Sort`, `GroupBy` or `Distinct` has reordered or removed
    /// rows non-contiguously.
    List(Vec<u32>),
}

impl SelectedIndices {
    pub fn full_range(len: usize) -> Self {
        SelectedIndices::Range(0, len)
    }

    pub fn len(&self) -> usize {
        match self {
            SelectedIndices::Range(start, end) => end.saturating_sub(*start),
            SelectedIndices::List(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Ascending iterator over every selected row index, regardless of
    /// which representation is in play.
    pub fn iter(&self) -> Box<dyn Iterator<Item = usize> + '_> {
        match self {
            SelectedIndices::Range(start, end) => Box::new(*start..*end),
            SelectedIndices::List(v) => Box::new(v.iter().map(|&i| i as usize)),
        }
    }

    pub fn to_vec(&self) -> Vec<u32> {
        match self {
            SelectedIndices::Range(start, end) => (*start as u32..*end as u32).collect(),
            SelectedIndices::List(v) => v.clone(),
        }
    }

    /// Trims to at most `n` rows, keeping the head.
    pub fn limit(&self, n: usize) -> Self {
        match self {
            SelectedIndices::Range(start, end) => {
                SelectedIndices::Range(*start, (*start + n).min(*end))
            }
            SelectedIndices::List(v) => SelectedIndices::List(v.iter().take(n).copied().collect()),
        }
    }

    /// Drops the first `n` rows.
    pub fn offset(&self, n: usize) -> Self {
        match self {
            SelectedIndices::Range(start, end) => {
                SelectedIndices::Range((*start + n).min(*end), *end)
            }
            SelectedIndices::List(v) => SelectedIndices::List(v.iter().skip(n).copied().collect()),
        }
    }
}

/// Diagnostic metadata attached to a `QueryResult`, surfaced by `explain()`
/// and useful for tests asserting zone-map skip behavior (spec scenario E6).
#[derive(Debug, Clone, Default)]
pub struct QueryMetadata {
    pub chunks_scanned: Option<usize>,
    pub chunks_total: Option<usize>,
    pub strategy: Option<String>,
}

/// `(batch, selected_indices, projected_columns?, metadata?)` per spec §3.
#[derive(Debug, Clone)]
pub struct QueryResult {
    pub batch: RecordBatch,
    pub selected_indices: SelectedIndices,
    /// `None` means every column; `Some` is a subset by index into `batch`'s
    /// schema.
    pub projected_columns: Option<Vec<usize>>,
    pub metadata: QueryMetadata,
}

impl QueryResult {
    pub fn full_scan(batch: RecordBatch) -> Self {
        let len = batch.num_rows();
        Self {
            batch,
            selected_indices: SelectedIndices::full_range(len),
            projected_columns: None,
            metadata: QueryMetadata::default(),
        }
    }
}
