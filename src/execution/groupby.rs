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

//! `GroupBy`: partitions the selected rows by a key column, then runs each
//! requested aggregation per group (spec §4.6). Groups come back in
//! first-seen order, keyed off [`ScalarConst::hash_key`] since the key's
//! float variant has no natural `Hash`/`Eq`.

use indexmap::IndexMap;

use arrow::record_batch::RecordBatch;

use crate::error::Result;
use crate::execution::aggregate::{self, AggregateValue};
use crate::logical_plan::AggregateExpr;
use crate::predicate::ScalarConst;
use crate::predicate::scalar::array_value_as_scalar;

#[derive(Debug, Clone, PartialEq)]
pub struct GroupRow {
    pub key: ScalarConst,
    pub values: Vec<AggregateValue>,
}

#[derive(Debug, Clone)]
pub struct GroupByResult {
    pub key_name: String,
    pub rows: Vec<GroupRow>,
}

pub fn group_by(
    batch: &RecordBatch,
    key_column: usize,
    aggregations: &[AggregateExpr],
    result_key_name: &str,
    indices: impl Iterator<Item = usize>,
) -> Result<GroupByResult> {
    let key_array = batch.column(key_column);

    // First pass: bucket row indices by key, preserving first-seen order.
    let mut groups: IndexMap<String, (ScalarConst, Vec<usize>)> = IndexMap::new();
    for i in indices {
        let key = array_value_as_scalar(key_array, i).unwrap_or(ScalarConst::Null);
        groups
            .entry(key.hash_key())
            .or_insert_with(|| (key, Vec::new()))
            .1
            .push(i);
    }

    let mut rows = Vec::with_capacity(groups.len());
    for (_, (key, member_indices)) in groups {
        let mut values = Vec::with_capacity(aggregations.len());
        for agg in aggregations {
            values.push(aggregate::aggregate(
                batch,
                agg.op,
                agg.column,
                member_indices.iter().copied(),
            )?);
        }
        rows.push(GroupRow { key, values });
    }

    Ok(GroupByResult {
        key_name: result_key_name.to_string(),
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logical_plan::AggregateOp;
    use arrow::array::{ArrayRef, Int32Array};
    use arrow_schema::{DataType, Field, Schema};
    use std::sync::Arc;

    fn batch() -> RecordBatch {
        let cat = Arc::new(Int32Array::from(vec![1, 1, 2, 2, 2, 3])) as ArrayRef;
        let val = Arc::new(Int32Array::from(vec![10, 20, 1, 2, 3, 100])) as ArrayRef;
        let schema = Arc::new(Schema::new(vec![
            Field::new("cat", DataType::Int32, false),
            Field::new("val", DataType::Int32, false),
        ]));
        RecordBatch::try_new(schema, vec![cat, val]).unwrap()
    }

    #[test]
    fn groups_keep_first_seen_order_and_aggregate_per_group() {
        let b = batch();
        let aggs = vec![
            AggregateExpr { op: AggregateOp::Count, column: None, output_name: "n".into() },
            AggregateExpr { op: AggregateOp::Sum, column: Some(1), output_name: "total".into() },
        ];
        let result = group_by(&b, 0, &aggs, "cat", 0..6).unwrap();
        assert_eq!(result.rows.len(), 3);
        assert_eq!(result.rows[0].key, ScalarConst::Int64(1));
        assert_eq!(result.rows[0].values[0], AggregateValue::Count(2));
        assert_eq!(result.rows[0].values[1], AggregateValue::Sum(ScalarConst::Int64(30)));
        assert_eq!(result.rows[1].key, ScalarConst::Int64(2));
        assert_eq!(result.rows[1].values[1], AggregateValue::Sum(ScalarConst::Int64(6)));
        assert_eq!(result.rows[2].key, ScalarConst::Int64(3));
    }

    #[test]
    fn restricting_to_a_subset_of_indices_only_groups_those_rows() {
        let b = batch();
        let aggs = vec![AggregateExpr { op: AggregateOp::Count, column: None, output_name: "n".into() }];
        let result = group_by(&b, 0, &aggs, "cat", vec![0, 2, 3].into_iter()).unwrap();
        assert_eq!(result.rows.len(), 2);
        assert_eq!(result.rows[1].values[0], AggregateValue::Count(2));
    }
}
