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

//! Scalar (non-SIMD) predicate kernels. Used for the SIMD tail, for types
//! with no lane-width kernel (decimal, half-precision on hosts without a
//! native comparator), and as the reference implementation the SIMD
//! kernels are cross-checked against in property tests.

use arrow::array::{Array, ArrayRef};
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;

use super::{CompareOp, ScalarConst};
use crate::bitmap::SelectionBitmap;
use crate::error::{GlacierError, Result};

/// Reads the value at `idx` as a comparable [`ScalarConst`], or `None` if
/// the value is null. Half-precision values are transparently upcast to
/// `f32`-then-`f64` for comparison, per spec §9's resolution for hardware
/// without native `f16` compare support.
pub fn array_value_as_scalar(array: &ArrayRef, idx: usize) -> Option<ScalarConst> {
    use arrow::array::*;
    use arrow::datatypes::*;

    if array.is_null(idx) {
        return None;
    }
    Some(match array.data_type() {
        DataType::Int8 => ScalarConst::Int64(array.as_any().downcast_ref::<Int8Array>()?.value(idx) as i64),
        DataType::Int16 => ScalarConst::Int64(array.as_any().downcast_ref::<Int16Array>()?.value(idx) as i64),
        DataType::Int32 => ScalarConst::Int64(array.as_any().downcast_ref::<Int32Array>()?.value(idx) as i64),
        DataType::Int64 => ScalarConst::Int64(array.as_any().downcast_ref::<Int64Array>()?.value(idx)),
        DataType::UInt8 => ScalarConst::UInt64(array.as_any().downcast_ref::<UInt8Array>()?.value(idx) as u64),
        DataType::UInt16 => ScalarConst::UInt64(array.as_any().downcast_ref::<UInt16Array>()?.value(idx) as u64),
        DataType::UInt32 => ScalarConst::UInt64(array.as_any().downcast_ref::<UInt32Array>()?.value(idx) as u64),
        DataType::UInt64 => ScalarConst::UInt64(array.as_any().downcast_ref::<UInt64Array>()?.value(idx)),
        DataType::Float16 => ScalarConst::Float64(
            f32::from(array.as_any().downcast_ref::<Float16Array>()?.value(idx)) as f64,
        ),
        DataType::Float32 => {
            ScalarConst::Float64(array.as_any().downcast_ref::<Float32Array>()?.value(idx) as f64)
        }
        DataType::Float64 => ScalarConst::Float64(array.as_any().downcast_ref::<Float64Array>()?.value(idx)),
        DataType::Boolean => ScalarConst::Boolean(array.as_any().downcast_ref::<BooleanArray>()?.value(idx)),
        DataType::Date32 => ScalarConst::Int64(array.as_any().downcast_ref::<Date32Array>()?.value(idx) as i64),
        DataType::Date64 => ScalarConst::Int64(array.as_any().downcast_ref::<Date64Array>()?.value(idx)),
        DataType::Timestamp(unit, _) => {
            let v = match unit {
                TimeUnit::Second => array.as_any().downcast_ref::<TimestampSecondArray>()?.value(idx),
                TimeUnit::Millisecond => array
                    .as_any()
                    .downcast_ref::<TimestampMillisecondArray>()?
                    .value(idx),
                TimeUnit::Microsecond => array
                    .as_any()
                    .downcast_ref::<TimestampMicrosecondArray>()?
                    .value(idx),
                TimeUnit::Nanosecond => array
                    .as_any()
                    .downcast_ref::<TimestampNanosecondArray>()?
                    .value(idx),
            };
            ScalarConst::Int64(v)
        }
        DataType::Utf8 => ScalarConst::Utf8(
            array
                .as_any()
                .downcast_ref::<StringArray>()?
                .value(idx)
                .to_string(),
        ),
        DataType::LargeUtf8 => ScalarConst::Utf8(
            array
                .as_any()
                .downcast_ref::<LargeStringArray>()?
                .value(idx)
                .to_string(),
        ),
        _ => return None,
    })
}

/// Evaluates `IsNull`/`IsNotNull` directly against the column's validity
/// bitmap, without touching values.
pub fn eval_null_test(
    batch: &RecordBatch,
    column: usize,
    is_null: bool,
    bitmap: &mut SelectionBitmap,
) -> Result<()> {
    let array = batch.column(column);
    for i in bitmap.iterate_set() {
        let i = i as usize;
        let null = array.is_null(i);
        if null != is_null {
            bitmap.clear(i);
        }
    }
    Ok(())
}

/// ANDs `bitmap` with the validity bitmap of the column a (possibly
/// combinator) predicate refers to. A `None` column (a predicate with no
/// single referenced column, e.g. an `And`/`Or` over several columns)
/// leaves `bitmap` untouched — validity is already folded in by each
/// leaf's own evaluation.
pub fn and_with_validity(
    batch: &RecordBatch,
    column: Option<usize>,
    bitmap: &mut SelectionBitmap,
) -> Result<()> {
    let Some(column) = column else { return Ok(()) };
    let array = batch.column(column);
    if array.null_count() == 0 {
        return Ok(());
    }
    for i in bitmap.iterate_set() {
        if array.is_null(i as usize) {
            bitmap.clear(i as usize);
        }
    }
    Ok(())
}

/// Row-by-row scalar comparison, used for the SIMD tail and for types
/// with no lane kernel (decimal, dictionary-of-non-string).
pub fn eval_comparison_scalar(
    array: &ArrayRef,
    op: CompareOp,
    value: &ScalarConst,
    bitmap: &mut SelectionBitmap,
) -> Result<()> {
    eval_comparison_scalar_range(array, op, value, bitmap, 0, array.len())
}

/// Same as [`eval_comparison_scalar`] but restricted to `[start, end)`,
/// used by the SIMD kernels to scalar-process a non-lane-aligned tail.
pub fn eval_comparison_scalar_range(
    array: &ArrayRef,
    op: CompareOp,
    value: &ScalarConst,
    bitmap: &mut SelectionBitmap,
    start: usize,
    end: usize,
) -> Result<()> {
    for i in start..end {
        if !bitmap.get(i) {
            continue;
        }
        let Some(lhs) = array_value_as_scalar(array, i) else {
            bitmap.clear(i);
            continue;
        };
        let matches = match lhs.partial_compare(value) {
            Some(ord) => compare_matches(op, ord),
            None => false, // NaN, or an incomparable pair: never matches
        };
        if !matches {
            bitmap.clear(i);
        }
    }
    Ok(())
}

fn compare_matches(op: CompareOp, ord: std::cmp::Ordering) -> bool {
    use std::cmp::Ordering::*;
    match op {
        CompareOp::Eq => ord == Equal,
        CompareOp::Ne => ord != Equal,
        CompareOp::Lt => ord == Less,
        CompareOp::Le => ord != Greater,
        CompareOp::Gt => ord == Greater,
        CompareOp::Ge => ord != Less,
    }
}

pub(crate) fn unsupported(column_name: &str, predicate: &str) -> GlacierError {
    GlacierError::UnsupportedPredicate {
        column: column_name.to_string(),
        predicate: predicate.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::Int32Array;
    use arrow::datatypes::{Field, Schema};
    use std::sync::Arc;

    fn batch_of(values: Vec<Option<i32>>) -> RecordBatch {
        let array = Arc::new(Int32Array::from(values)) as ArrayRef;
        let schema = Arc::new(Schema::new(vec![Field::new("v", DataType::Int32, true)]));
        RecordBatch::try_new(schema, vec![array]).unwrap()
    }

    #[test]
    fn null_rows_never_match_a_comparison() {
        let batch = batch_of(vec![Some(1), None, Some(3)]);
        let mut bm = SelectionBitmap::new_set(3);
        eval_comparison_scalar(batch.column(0), CompareOp::Ge, &ScalarConst::Int64(0), &mut bm).unwrap();
        assert_eq!(bm.iterate_set(), vec![0, 2]);
    }

    #[test]
    fn is_null_selects_exactly_the_null_rows() {
        let batch = batch_of(vec![Some(1), None, Some(3)]);
        let mut bm = SelectionBitmap::new_set(3);
        eval_null_test(&batch, 0, true, &mut bm).unwrap();
        assert_eq!(bm.iterate_set(), vec![1]);
    }

    #[test]
    fn extreme_integer_values_compare_without_wrap() {
        let batch = batch_of(vec![Some(i32::MIN), Some(-1), Some(0), Some(1), Some(i32::MAX)]);
        let mut bm = SelectionBitmap::new_set(5);
        eval_comparison_scalar(
            batch.column(0),
            CompareOp::Gt,
            &ScalarConst::Int64(0),
            &mut bm,
        )
        .unwrap();
        assert_eq!(bm.iterate_set(), vec![3, 4]);
    }
}
