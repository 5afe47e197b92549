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

//! Non-fused aggregate kernels: `count`/`sum`/`avg`/`min`/`max` over a
//! column restricted to a set of selected row indices.
//!
//! Per spec §9's open question, `avg` promotes integer inputs to an `f64`
//! accumulator rather than a fixed-precision decimal; `sum` keeps an
//! `i128` accumulator for integer columns (narrowed to `i64` on return,
//! wide enough for any realistic analytical batch) and an `f64`
//! accumulator for floating columns, documented in DESIGN.md.

use arrow::record_batch::RecordBatch;

use crate::error::{GlacierError, Result};
use crate::logical_plan::AggregateOp;
use crate::predicate::ScalarConst;
use crate::predicate::scalar::array_value_as_scalar;

/// The result of a single, non-grouped aggregate. `NoElements` cases
/// (avg/min/max/first over zero rows) are reported as
/// `GlacierError::NoElements` rather than a value, per spec §8.
#[derive(Debug, Clone, PartialEq)]
pub enum AggregateValue {
    Count(u64),
    Sum(ScalarConst),
    Avg(f64),
    Min(ScalarConst),
    Max(ScalarConst),
}

fn required_column(column: Option<usize>, op: &str) -> Result<usize> {
    column.ok_or_else(|| GlacierError::Internal(format!("`{op}` requires a column")))
}

pub fn aggregate(
    batch: &RecordBatch,
    op: AggregateOp,
    column: Option<usize>,
    indices: impl Iterator<Item = usize> + Clone,
) -> Result<AggregateValue> {
    match op {
        AggregateOp::Count => Ok(count(batch, column, indices)),
        AggregateOp::Sum => {
            let col = required_column(column, "sum")?;
            Ok(AggregateValue::Sum(sum_and_count(batch, col, indices)?.0))
        }
        AggregateOp::Avg => {
            let col = required_column(column, "avg")?;
            let (sum, count) = sum_and_count(batch, col, indices)?;
            if count == 0 {
                return Err(GlacierError::NoElements { op: "avg".to_string() });
            }
            let total = sum.as_f64().ok_or_else(|| {
                GlacierError::TypeMismatch {
                    column: batch.schema().field(col).name().clone(),
                    detail: "avg requires a numeric column".to_string(),
                }
            })?;
            Ok(AggregateValue::Avg(total / count as f64))
        }
        AggregateOp::Min => min_max(batch, required_column(column, "min")?, indices, true),
        AggregateOp::Max => min_max(batch, required_column(column, "max")?, indices, false),
    }
}

fn count(batch: &RecordBatch, column: Option<usize>, indices: impl Iterator<Item = usize>) -> AggregateValue {
    match column {
        None => AggregateValue::Count(indices.count() as u64),
        Some(col) => {
            let array = batch.column(col);
            let n = indices.filter(|&i| !array.is_null(i)).count();
            AggregateValue::Count(n as u64)
        }
    }
}

/// Single pass: accumulates both the sum (as the widest safe type for the
/// column's family) and the non-null count, since `avg` needs both.
fn sum_and_count(
    batch: &RecordBatch,
    column: usize,
    indices: impl Iterator<Item = usize>,
) -> Result<(ScalarConst, u64)> {
    let array = batch.column(column);
    let mut int_acc: i128 = 0;
    let mut float_acc: f64 = 0.0;
    let mut saw_float = false;
    let mut saw_any = false;
    let mut count = 0u64;
    for i in indices {
        let Some(v) = array_value_as_scalar(array, i) else {
            continue;
        };
        count += 1;
        saw_any = true;
        match v {
            ScalarConst::Int64(x) => int_acc += x as i128,
            ScalarConst::UInt64(x) => int_acc += x as i128,
            ScalarConst::Float64(x) => {
                saw_float = true;
                float_acc += x;
            }
            other => {
                return Err(GlacierError::TypeMismatch {
                    column: batch.schema().field(column).name().clone(),
                    detail: format!("sum/avg over non-numeric value {other:?}"),
                });
            }
        }
    }
    if !saw_any {
        return Ok((ScalarConst::Int64(0), 0));
    }
    if saw_float {
        Ok((ScalarConst::Float64(float_acc + int_acc as f64), count))
    } else {
        Ok((ScalarConst::Int64(int_acc as i64), count))
    }
}

fn min_max(
    batch: &RecordBatch,
    column: usize,
    indices: impl Iterator<Item = usize>,
    is_min: bool,
) -> Result<AggregateValue> {
    let array = batch.column(column);
    let op_name = if is_min { "min" } else { "max" };
    let mut best: Option<ScalarConst> = None;
    for i in indices {
        let Some(v) = array_value_as_scalar(array, i) else {
            continue;
        };
        best = Some(match best {
            None => v,
            Some(current) => match v.partial_compare(&current) {
                // NaN (or any incomparable pair) never displaces the
                // running best, per spec §8's IEEE-754 boundary behavior.
                Some(std::cmp::Ordering::Less) if is_min => v,
                Some(std::cmp::Ordering::Greater) if !is_min => v,
                _ => current,
            },
        });
    }
    best.map(|v| if is_min { AggregateValue::Min(v) } else { AggregateValue::Max(v) })
        .ok_or_else(|| GlacierError::NoElements { op: op_name.to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Float64Array, Int32Array};
    use arrow::array::ArrayRef;
    use arrow_schema::{DataType, Field, Schema};
    use std::sync::Arc;

    fn int_batch(values: Vec<Option<i32>>) -> RecordBatch {
        let array = Arc::new(Int32Array::from(values)) as ArrayRef;
        let schema = Arc::new(Schema::new(vec![Field::new("v", DataType::Int32, true)]));
        RecordBatch::try_new(schema, vec![array]).unwrap()
    }

    fn float_batch(values: Vec<Option<f64>>) -> RecordBatch {
        let array = Arc::new(Float64Array::from(values)) as ArrayRef;
        let schema = Arc::new(Schema::new(vec![Field::new("v", DataType::Float64, true)]));
        RecordBatch::try_new(schema, vec![array]).unwrap()
    }

    #[test]
    fn count_over_empty_range_is_zero() {
        let batch = int_batch(vec![]);
        let v = aggregate(&batch, AggregateOp::Count, None, std::iter::empty()).unwrap();
        assert_eq!(v, AggregateValue::Count(0));
    }

    #[test]
    fn sum_over_empty_range_is_zero() {
        let batch = int_batch(vec![]);
        let v = aggregate(&batch, AggregateOp::Sum, Some(0), std::iter::empty()).unwrap();
        assert_eq!(v, AggregateValue::Sum(ScalarConst::Int64(0)));
    }

    #[test]
    fn avg_min_max_over_empty_range_errors() {
        let batch = int_batch(vec![]);
        assert!(matches!(
            aggregate(&batch, AggregateOp::Avg, Some(0), std::iter::empty()),
            Err(GlacierError::NoElements { .. })
        ));
        assert!(matches!(
            aggregate(&batch, AggregateOp::Min, Some(0), std::iter::empty()),
            Err(GlacierError::NoElements { .. })
        ));
        assert!(matches!(
            aggregate(&batch, AggregateOp::Max, Some(0), std::iter::empty()),
            Err(GlacierError::NoElements { .. })
        ));
    }

    #[test]
    fn avg_of_integers_promotes_to_f64() {
        let batch = int_batch(vec![Some(1), Some(2), Some(3), Some(4)]);
        let v = aggregate(&batch, AggregateOp::Avg, Some(0), 0..4).unwrap();
        assert_eq!(v, AggregateValue::Avg(2.5));
    }

    #[test]
    fn min_max_skip_nulls() {
        let batch = int_batch(vec![Some(5), None, Some(1), Some(9)]);
        let min = aggregate(&batch, AggregateOp::Min, Some(0), 0..4).unwrap();
        let max = aggregate(&batch, AggregateOp::Max, Some(0), 0..4).unwrap();
        assert_eq!(min, AggregateValue::Min(ScalarConst::Int64(1)));
        assert_eq!(max, AggregateValue::Max(ScalarConst::Int64(9)));
    }

    #[test]
    fn nan_never_becomes_the_running_min_or_max() {
        let batch = float_batch(vec![Some(1.0), Some(f64::NAN), Some(3.0)]);
        let min = aggregate(&batch, AggregateOp::Min, Some(0), 0..3).unwrap();
        let max = aggregate(&batch, AggregateOp::Max, Some(0), 0..3).unwrap();
        assert_eq!(min, AggregateValue::Min(ScalarConst::Float64(1.0)));
        assert_eq!(max, AggregateValue::Max(ScalarConst::Float64(3.0)));
    }

    #[test]
    fn count_of_column_skips_nulls_count_star_does_not() {
        let batch = int_batch(vec![Some(1), None, Some(3)]);
        let star = aggregate(&batch, AggregateOp::Count, None, 0..3).unwrap();
        let col = aggregate(&batch, AggregateOp::Count, Some(0), 0..3).unwrap();
        assert_eq!(star, AggregateValue::Count(3));
        assert_eq!(col, AggregateValue::Count(2));
    }
}
