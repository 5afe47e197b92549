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

//! Multi-key stable sort over a set of selected row indices (spec §4.7).
//! Nulls sort last in every key regardless of direction, and ties fall
//! through to the next key in order, then to input order (Rust's
//! pattern-defeating `sort_by` is stable).

use std::cmp::Ordering;

use arrow::record_batch::RecordBatch;

use crate::error::Result;
use crate::logical_plan::{SortDirection, SortKey};
use crate::predicate::ScalarConst;
use crate::predicate::scalar::array_value_as_scalar;

pub fn sort_indices(
    batch: &RecordBatch,
    keys: &[SortKey],
    indices: impl Iterator<Item = usize>,
) -> Result<Vec<u32>> {
    let mut rows: Vec<usize> = indices.collect();
    let columns: Vec<_> = keys.iter().map(|k| batch.column(k.column).clone()).collect();

    rows.sort_by(|&a, &b| {
        for (key, array) in keys.iter().zip(&columns) {
            let va = array_value_as_scalar(array, a);
            let vb = array_value_as_scalar(array, b);
            let ord = cmp_key(&va, &vb, key.direction);
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    });

    Ok(rows.into_iter().map(|i| i as u32).collect())
}

/// Nulls always sort last, independent of `direction`; non-null values
/// compare via [`ScalarConst::partial_compare`] (incomparable pairs, i.e.
/// `NaN`, are treated as equal for ordering purposes rather than panicking
/// or producing an inconsistent total order).
fn cmp_key(a: &Option<ScalarConst>, b: &Option<ScalarConst>, direction: SortDirection) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(x), Some(y)) => {
            let ord = x.partial_compare(y).unwrap_or(Ordering::Equal);
            match direction {
                SortDirection::Ascending => ord,
                SortDirection::Descending => ord.reverse(),
            }
        }
    }
}
