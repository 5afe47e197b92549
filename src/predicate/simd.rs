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

//! SIMD comparison kernels for numeric/date/timestamp columns.
//!
//! Behind the `simd` feature, lanes are loaded with `std::simd` (typically
//! 256-bit: 8 x i32 / 4 x i64 / 4 x f64), the constant is broadcast, and
//! the lane-width compare mask is merged into the packed bitmap block by
//! block. On stable (no `simd` feature), every call here degrades to the
//! scalar kernel in [`super::scalar`] — still correct, just not
//! hand-vectorized (LLVM auto-vectorizes the scalar loop reasonably well
//! for these access patterns regardless).
//!
//! Tail rows (`n mod lane_width != 0`) are always finished by the scalar
//! kernel, per spec §4.3 rule 3.

use arrow::array::ArrayRef;
use arrow::datatypes::DataType;

use super::scalar::{eval_comparison_scalar, eval_comparison_scalar_range};
use super::{CompareOp, ScalarConst};
use crate::bitmap::SelectionBitmap;
use crate::error::Result;

/// Types with a dedicated lane kernel or, failing that, a scalar
/// comparison that is still "the SIMD path" conceptually (i.e. not a
/// string/dictionary predicate, which has its own fast path).
pub fn is_simd_eligible(dt: &DataType) -> bool {
    use DataType::*;
    matches!(
        dt,
        Int8 | Int16
            | Int32
            | Int64
            | UInt8
            | UInt16
            | UInt32
            | UInt64
            | Float16
            | Float32
            | Float64
            | Boolean
            | Date32
            | Date64
            | Timestamp(_, _)
    )
}

pub fn eval_comparison_simd(
    array: &ArrayRef,
    op: CompareOp,
    value: &ScalarConst,
    bitmap: &mut SelectionBitmap,
) -> Result<()> {
    #[cfg(feature = "simd")]
    {
        if let DataType::Int32 = array.data_type() {
            return lanes::eval_i32x8(array, op, value, bitmap);
        }
        if let DataType::Int64 = array.data_type() {
            return lanes::eval_i64x4(array, op, value, bitmap);
        }
        if let DataType::Float64 = array.data_type() {
            return lanes::eval_f64x4(array, op, value, bitmap);
        }
    }
    eval_comparison_scalar(array, op, value, bitmap)
}

#[cfg(feature = "simd")]
mod lanes {
    use super::*;
    use arrow::array::{Array, Float64Array, Int32Array, Int64Array};
    use std::simd::{f64x4, i32x8, i64x4, Mask, Simd, SimdPartialEq, SimdPartialOrd};

    macro_rules! lane_kernel {
        ($name:ident, $arrow_ty:ty, $simd_ty:ty, $native:ty, $lanes:expr, $to_const:expr) => {
            pub fn $name(
                array: &ArrayRef,
                op: CompareOp,
                value: &ScalarConst,
                bitmap: &mut SelectionBitmap,
            ) -> Result<()> {
                let typed = match array.as_any().downcast_ref::<$arrow_ty>() {
                    Some(t) => t,
                    None => return eval_comparison_scalar(array, op, value, bitmap),
                };
                let Some(needle) = $to_const(value) else {
                    return eval_comparison_scalar(array, op, value, bitmap);
                };
                let values = typed.values();
                let n = values.len();
                let lane_aligned = n - (n % $lanes);
                let broadcast = <$simd_ty>::splat(needle);

                let mut i = 0;
                while i < lane_aligned {
                    let lane = <$simd_ty>::from_slice(&values[i..i + $lanes]);
                    let mask: Mask<_, $lanes> = match op {
                        CompareOp::Eq => lane.simd_eq(broadcast),
                        CompareOp::Ne => lane.simd_ne(broadcast),
                        CompareOp::Lt => lane.simd_lt(broadcast),
                        CompareOp::Le => lane.simd_le(broadcast),
                        CompareOp::Gt => lane.simd_gt(broadcast),
                        CompareOp::Ge => lane.simd_ge(broadcast),
                    };
                    let bits = mask.to_bitmask();
                    for lane_idx in 0..$lanes {
                        let row = i + lane_idx;
                        let is_null = typed.is_null(row);
                        let hit = (bits >> lane_idx) & 1 == 1;
                        if is_null || !hit {
                            bitmap.clear(row);
                        }
                    }
                    i += $lanes;
                }
                // scalar tail
                eval_comparison_scalar_range(array, op, value, bitmap, lane_aligned, n)
            }
        };
    }

    lane_kernel!(eval_i32x8, Int32Array, i32x8, i32, 8, |v: &ScalarConst| match v {
        ScalarConst::Int64(x) => i32::try_from(*x).ok(),
        _ => None,
    });
    lane_kernel!(eval_i64x4, Int64Array, i64x4, i64, 4, |v: &ScalarConst| match v {
        ScalarConst::Int64(x) => Some(*x),
        _ => None,
    });
    lane_kernel!(eval_f64x4, Float64Array, f64x4, f64, 4, |v: &ScalarConst| v.as_f64());
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::Int32Array;
    use rstest::rstest;
    use std::sync::Arc;

    // Boundary behavior from spec §8: SIMD kernels correct at
    // non-lane-aligned tails, sizes 1, 3, 7, 15, 17, lane-1, lane, lane+1.
    #[rstest]
    #[case(1)]
    #[case(3)]
    #[case(7)]
    #[case(8)]
    #[case(9)]
    #[case(15)]
    #[case(17)]
    #[case(31)]
    #[case(32)]
    #[case(33)]
    fn simd_path_matches_scalar_reference(#[case] n: usize) {
        let values: Vec<i32> = (0..n as i32).collect();
        let array = Arc::new(Int32Array::from(values)) as ArrayRef;

        let mut via_simd = SelectionBitmap::new_set(n);
        eval_comparison_simd(&array, CompareOp::Gt, &ScalarConst::Int64((n / 2) as i64), &mut via_simd).unwrap();

        let mut via_scalar = SelectionBitmap::new_set(n);
        eval_comparison_scalar(&array, CompareOp::Gt, &ScalarConst::Int64((n / 2) as i64), &mut via_scalar).unwrap();

        assert_eq!(via_simd, via_scalar, "mismatch at n={n}");
    }

    proptest::proptest! {
        #[test]
        fn simd_and_scalar_agree_on_random_input(
            values in proptest::collection::vec(proptest::option::of(-1000i32..1000), 0..200),
            threshold in -1000i32..1000,
        ) {
            let array = Arc::new(Int32Array::from(values)) as ArrayRef;
            let n = array.len();
            let mut via_simd = SelectionBitmap::new_set(n);
            eval_comparison_simd(&array, CompareOp::Ge, &ScalarConst::Int64(threshold as i64), &mut via_simd).unwrap();
            let mut via_scalar = SelectionBitmap::new_set(n);
            eval_comparison_scalar(&array, CompareOp::Ge, &ScalarConst::Int64(threshold as i64), &mut via_scalar).unwrap();
            prop_assert_eq!(via_simd, via_scalar);
        }
    }
}
