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

//! `Distinct`: insertion-order-preserving hash deduplication over a
//! projected subset of columns (spec §4.6). Output order is stable across
//! runs but otherwise unspecified unless a subsequent `Sort` is layered on
//! top.

use indexmap::IndexSet;

use arrow::record_batch::RecordBatch;

use crate::error::Result;
use crate::predicate::scalar::array_value_as_scalar;

/// Returns the first row index seen for each distinct combination of
/// `columns`' values, in first-seen order.
pub fn distinct_indices(
    batch: &RecordBatch,
    columns: &[usize],
    indices: impl Iterator<Item = usize>,
) -> Result<Vec<u32>> {
    let arrays: Vec<_> = columns.iter().map(|&c| batch.column(c).clone()).collect();
    let mut seen: IndexSet<String> = IndexSet::new();
    let mut out = Vec::new();

    for i in indices {
        let key = row_key(&arrays, i);
        if seen.insert(key) {
            out.push(i as u32);
        }
    }

    Ok(out)
}

fn row_key(arrays: &[arrow::array::ArrayRef], row: usize) -> String {
    let mut key = String::new();
    for array in arrays {
        match array_value_as_scalar(array, row) {
            Some(v) => key.push_str(&v.hash_key()),
            None => key.push_str("n"),
        }
        key.push('\u{1f}');
    }
    key
}
