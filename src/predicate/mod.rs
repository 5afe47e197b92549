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

//! Typed column predicates and their evaluators.
//!
//! Each [`Predicate`] variant is evaluated by ANDing the rows it selects
//! into a caller-owned [`SelectionBitmap`], per spec §4.3's design rules:
//! zone-map skip first, then the dictionary fast path or a SIMD kernel,
//! with null handling folded in throughout.

pub mod scalar;
pub mod simd;
pub mod string_ops;

use std::cmp::Ordering;
use std::sync::Arc;

use arrow::record_batch::RecordBatch;
use arrow_schema::DataType;

use crate::bitmap::SelectionBitmap;
use crate::error::{GlacierError, Result};
use crate::stats::ColumnStatistics;
use crate::zonemap::ZoneMap;

/// A typed constant used on the right-hand side of a predicate. Distinct
/// from `arrow`'s `ScalarValue`-equivalent types so this crate can compare
/// bounds and predicate constants without re-touching arrays.
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarConst {
    Int64(i64),
    UInt64(u64),
    Float64(f64),
    Boolean(bool),
    Utf8(String),
    Null,
}

impl ScalarConst {
    /// Partial order respecting IEEE-754 semantics for floats: `NaN`
    /// compares unequal (and unordered) against everything, including
    /// itself, per spec §8's boundary behavior.
    pub fn partial_compare(&self, other: &ScalarConst) -> Option<Ordering> {
        use ScalarConst::*;
        match (self, other) {
            (Int64(a), Int64(b)) => a.partial_cmp(b),
            (UInt64(a), UInt64(b)) => a.partial_cmp(b),
            (Float64(a), Float64(b)) => a.partial_cmp(b),
            (Int64(a), Float64(b)) => (*a as f64).partial_cmp(b),
            (Float64(a), Int64(b)) => a.partial_cmp(&(*b as f64)),
            (Boolean(a), Boolean(b)) => a.partial_cmp(b),
            (Utf8(a), Utf8(b)) => a.partial_cmp(b),
            _ => None,
        }
    }

    /// Best-effort numeric distance used by selectivity heuristics; `None`
    /// for non-numeric types.
    pub fn numeric_span(&self, other: &ScalarConst) -> Option<f64> {
        let a = self.as_f64()?;
        let b = other.as_f64()?;
        Some(a - b)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ScalarConst::Int64(v) => Some(*v as f64),
            ScalarConst::UInt64(v) => Some(*v as f64),
            ScalarConst::Float64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ScalarConst::Utf8(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// A stable, total-order-free string key for use as a hash map key.
    /// `ScalarConst` can't derive `Hash`/`Eq` because of its float variant
    /// (`NaN != NaN`), so `Distinct` and `GroupBy` key off this instead;
    /// floats are keyed by bit pattern so every `NaN` payload is its own
    /// group, distinct from every other value including other `NaN`s.
    pub fn hash_key(&self) -> String {
        match self {
            ScalarConst::Int64(v) => format!("i:{v}"),
            ScalarConst::UInt64(v) => format!("u:{v}"),
            ScalarConst::Float64(v) => format!("f:{:016x}", v.to_bits()),
            ScalarConst::Boolean(v) => format!("b:{v}"),
            ScalarConst::Utf8(v) => format!("s:{v}"),
            ScalarConst::Null => "n".to_string(),
        }
    }
}

/// String-match case sensitivity for `StringEquality`/`StringOperation`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringMode {
    CaseSensitive,
    CaseInsensitive,
}

/// The `op` of a `StringOperation` predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringOp {
    StartsWith,
    EndsWith,
    Contains,
    Like,
}

/// The `op` of a `Comparison` predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompareOp {
    fn matches(self, ord: Ordering) -> bool {
        match self {
            CompareOp::Eq => ord == Ordering::Equal,
            CompareOp::Ne => ord != Ordering::Equal,
            CompareOp::Lt => ord == Ordering::Less,
            CompareOp::Le => ord != Ordering::Greater,
            CompareOp::Gt => ord == Ordering::Greater,
            CompareOp::Ge => ord != Ordering::Less,
        }
    }
}

/// A column predicate. Leaf variants reference exactly one column by
/// index (so the optimizer and executor never need to re-resolve names);
/// `And`/`Or`/`Not` combine children of arbitrary shape.
#[derive(Debug, Clone)]
pub enum Predicate {
    NullTest {
        column: usize,
        is_null: bool,
    },
    Comparison {
        column: usize,
        op: CompareOp,
        value: ScalarConst,
    },
    Between {
        column: usize,
        lo: ScalarConst,
        hi: ScalarConst,
        lo_inclusive: bool,
        hi_inclusive: bool,
    },
    StringEquality {
        column: usize,
        value: String,
        mode: StringMode,
    },
    StringOperation {
        column: usize,
        pattern: String,
        op: StringOp,
        mode: StringMode,
    },
    And(Vec<Arc<Predicate>>),
    Or(Vec<Arc<Predicate>>),
    Not(Arc<Predicate>),
}

impl Predicate {
    /// The single column this predicate leaf references, if any. `And`/
    /// `Or`/`Not` have no single referenced column (their children may
    /// reference different ones); used by the optimizer only for leaves.
    pub fn references_column_index(&self) -> Option<usize> {
        match self {
            Predicate::NullTest { column, .. }
            | Predicate::Comparison { column, .. }
            | Predicate::Between { column, .. }
            | Predicate::StringEquality { column, .. }
            | Predicate::StringOperation { column, .. } => Some(*column),
            Predicate::And(_) | Predicate::Or(_) | Predicate::Not(_) => None,
        }
    }

    /// Every column index touched anywhere in this predicate's subtree,
    /// used by projection pruning to un-prune a scan that a pushed-down
    /// filter still needs.
    pub fn referenced_columns(&self, out: &mut Vec<usize>) {
        match self {
            Predicate::NullTest { column, .. }
            | Predicate::Comparison { column, .. }
            | Predicate::Between { column, .. }
            | Predicate::StringEquality { column, .. }
            | Predicate::StringOperation { column, .. } => out.push(*column),
            Predicate::And(children) | Predicate::Or(children) => {
                for c in children {
                    c.referenced_columns(out);
                }
            }
            Predicate::Not(child) => child.referenced_columns(out),
        }
    }

    /// True when every chunk of the referenced column's zone map could be
    /// consulted to skip whole chunks (orderable comparisons/between).
    /// String predicates and `IsNull` are never zone-map-evaluable.
    pub fn is_zone_map_evaluable(&self) -> bool {
        matches!(
            self,
            Predicate::Comparison { .. } | Predicate::Between { .. }
        )
    }

    /// True when this predicate could use the dictionary fast path: a
    /// string predicate against a dictionary-encoded column. The
    /// executor confirms the column is actually dictionary-encoded at
    /// evaluation time; this is a static, type-only check.
    pub fn is_dictionary_fast_path_candidate(&self) -> bool {
        matches!(
            self,
            Predicate::StringEquality { .. } | Predicate::StringOperation { .. }
        )
    }

    /// True when every leaf in this predicate's subtree is a numeric/date/
    /// timestamp comparison with a dedicated SIMD lane kernel (see
    /// `predicate::simd::is_simd_eligible`). String predicates are never
    /// SIMD-eligible; they have their own scalar/dictionary fast path.
    /// Used by the physical planner's cost model (spec §4.5) to decide
    /// whether a `rows < 50,000` filter can take the `simd` strategy.
    pub fn is_simd_eligible(&self, schema: &arrow_schema::Schema) -> bool {
        match self {
            Predicate::Comparison { column, .. } | Predicate::Between { column, .. } => {
                simd::is_simd_eligible(schema.field(*column).data_type())
            }
            Predicate::NullTest { .. } => true,
            Predicate::StringEquality { .. } | Predicate::StringOperation { .. } => false,
            Predicate::And(children) | Predicate::Or(children) => {
                children.iter().all(|c| c.is_simd_eligible(schema))
            }
            Predicate::Not(child) => child.is_simd_eligible(schema),
        }
    }

    /// Estimated selectivity in `[0, 1]`, used by the optimizer to order
    /// `And` children ascending (most selective first) and by the
    /// physical planner's cost model.
    pub fn estimated_selectivity(&self, stats: &[ColumnStatistics]) -> f64 {
        match self {
            Predicate::NullTest { column, is_null } => {
                let s = &stats[*column];
                if s.total_count == 0 {
                    return 0.0;
                }
                let null_frac = s.null_count as f64 / s.total_count as f64;
                if *is_null {
                    null_frac
                } else {
                    1.0 - null_frac
                }
            }
            Predicate::Comparison { column, op, value } => {
                let s = &stats[*column];
                match op {
                    CompareOp::Eq => s.equality_selectivity(),
                    CompareOp::Ne => 1.0 - s.equality_selectivity(),
                    CompareOp::Lt | CompareOp::Le => s.range_selectivity(None, Some(value)),
                    CompareOp::Gt | CompareOp::Ge => s.range_selectivity(Some(value), None),
                }
            }
            Predicate::Between { column, lo, hi, .. } => {
                stats[*column].range_selectivity(Some(lo), Some(hi))
            }
            Predicate::StringEquality { column, .. } => stats[*column].equality_selectivity(),
            Predicate::StringOperation { column, .. } => stats[*column].string_op_selectivity(),
            Predicate::And(children) => children
                .iter()
                .map(|c| c.estimated_selectivity(stats))
                .product(),
            Predicate::Or(children) => {
                let none_match: f64 = children
                    .iter()
                    .map(|c| 1.0 - c.estimated_selectivity(stats))
                    .product();
                1.0 - none_match
            }
            Predicate::Not(child) => 1.0 - child.estimated_selectivity(stats),
        }
    }

    /// Evaluates this predicate against `batch`, ANDing the surviving rows
    /// into `bitmap`. `bitmap` must already reflect the range under
    /// consideration (e.g. all-set for a full scan, or already narrowed
    /// by a zone-map chunk skip upstream).
    pub fn evaluate(
        &self,
        batch: &RecordBatch,
        zone_maps: &[Option<ZoneMap>],
        bitmap: &mut SelectionBitmap,
    ) -> Result<()> {
        match self {
            Predicate::NullTest { column, is_null } => {
                scalar::eval_null_test(batch, *column, *is_null, bitmap)
            }
            Predicate::Comparison { column, op, value } => {
                if self.is_zone_map_evaluable() {
                    if let Some(Some(zm)) = zone_maps.get(*column) {
                        zm.clear_non_overlapping_chunks(bitmap, |chunk_min, chunk_max| {
                            comparison_can_match_range(*op, value, chunk_min, chunk_max)
                        });
                        if bitmap.is_all_clear() {
                            return Ok(());
                        }
                    }
                }
                eval_comparison(batch, *column, *op, value, bitmap)
            }
            Predicate::Between {
                column,
                lo,
                hi,
                lo_inclusive,
                hi_inclusive,
            } => {
                if let Some(Some(zm)) = zone_maps.get(*column) {
                    zm.clear_non_overlapping_chunks(bitmap, |chunk_min, chunk_max| {
                        between_can_match_range(lo, hi, chunk_min, chunk_max)
                    });
                    if bitmap.is_all_clear() {
                        return Ok(());
                    }
                }
                eval_between(batch, *column, lo, hi, *lo_inclusive, *hi_inclusive, bitmap)
            }
            Predicate::StringEquality { column, value, mode } => {
                string_ops::eval_string_equality(batch, *column, value, *mode, bitmap)
            }
            Predicate::StringOperation {
                column,
                pattern,
                op,
                mode,
            } => string_ops::eval_string_operation(batch, *column, pattern, *op, *mode, bitmap),
            Predicate::And(children) => {
                // Most-selective-first is the optimizer's job (predicate
                // reordering); here we just short-circuit once the
                // running bitmap becomes empty.
                for child in children {
                    child.evaluate(batch, zone_maps, bitmap)?;
                    if bitmap.is_all_clear() {
                        break;
                    }
                }
                Ok(())
            }
            Predicate::Or(children) => {
                let mut acc = SelectionBitmap::new_cleared(bitmap.len());
                for child in children {
                    // Each child evaluates against a full copy of the
                    // incoming selection, then ORs its result in.
                    let mut scratch = bitmap.clone();
                    child.evaluate(batch, zone_maps, &mut scratch)?;
                    acc.or(&scratch);
                    if acc.is_all_set() {
                        break;
                    }
                }
                bitmap.and(&acc);
                Ok(())
            }
            Predicate::Not(child) => {
                let mut scratch = SelectionBitmap::new_set(bitmap.len());
                child.evaluate(batch, zone_maps, &mut scratch)?;
                scratch.not();
                bitmap.and(&scratch);
                // Not ANDed with validity: a row whose underlying value is
                // null never satisfies either the predicate or its
                // negation, matching SQL three-valued-logic-free null
                // handling mandated by spec §4.3 rule 4.
                scalar::and_with_validity(batch, child.sole_column_index(), bitmap)?;
                Ok(())
            }
        }
    }

    fn sole_column_index(&self) -> Option<usize> {
        self.references_column_index()
    }
}

fn eval_comparison(
    batch: &RecordBatch,
    column: usize,
    op: CompareOp,
    value: &ScalarConst,
    bitmap: &mut SelectionBitmap,
) -> Result<()> {
    let array = batch.column(column);
    match array.data_type() {
        dt if simd::is_simd_eligible(dt) => simd::eval_comparison_simd(array, op, value, bitmap),
        DataType::Utf8 | DataType::LargeUtf8 => Err(GlacierError::UnsupportedPredicate {
            column: batch.schema().field(column).name().clone(),
            predicate: "Comparison on string column (use StringEquality)".to_string(),
        }),
        _ => scalar::eval_comparison_scalar(array, op, value, bitmap),
    }
}

fn eval_between(
    batch: &RecordBatch,
    column: usize,
    lo: &ScalarConst,
    hi: &ScalarConst,
    lo_inclusive: bool,
    hi_inclusive: bool,
    bitmap: &mut SelectionBitmap,
) -> Result<()> {
    let lo_op = if lo_inclusive { CompareOp::Ge } else { CompareOp::Gt };
    let hi_op = if hi_inclusive { CompareOp::Le } else { CompareOp::Lt };
    eval_comparison(batch, column, lo_op, lo, bitmap)?;
    if bitmap.is_all_clear() {
        return Ok(());
    }
    eval_comparison(batch, column, hi_op, hi, bitmap)
}

fn comparison_can_match_range(
    op: CompareOp,
    value: &ScalarConst,
    chunk_min: &ScalarConst,
    chunk_max: &ScalarConst,
) -> bool {
    match op {
        CompareOp::Eq => {
            matches!(value.partial_compare(chunk_min), Some(Ordering::Greater | Ordering::Equal))
                && matches!(value.partial_compare(chunk_max), Some(Ordering::Less | Ordering::Equal))
        }
        CompareOp::Ne => true, // equality-complement rarely prunable from min/max alone
        CompareOp::Lt => matches!(chunk_min.partial_compare(value), Some(Ordering::Less)),
        CompareOp::Le => matches!(chunk_min.partial_compare(value), Some(Ordering::Less | Ordering::Equal)),
        CompareOp::Gt => matches!(chunk_max.partial_compare(value), Some(Ordering::Greater)),
        CompareOp::Ge => matches!(chunk_max.partial_compare(value), Some(Ordering::Greater | Ordering::Equal)),
    }
}

fn between_can_match_range(
    lo: &ScalarConst,
    hi: &ScalarConst,
    chunk_min: &ScalarConst,
    chunk_max: &ScalarConst,
) -> bool {
    let lo_ok = matches!(lo.partial_compare(chunk_max), Some(Ordering::Less | Ordering::Equal));
    let hi_ok = matches!(hi.partial_compare(chunk_min), Some(Ordering::Greater | Ordering::Equal));
    lo_ok && hi_ok
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_stats(total: usize, distinct: usize) -> ColumnStatistics {
        ColumnStatistics {
            name: "c".into(),
            value_type: DataType::Int32,
            total_count: total,
            null_count: 0,
            distinct_count: distinct,
            distinct_count_is_estimate: false,
            min_max: None,
        }
    }

    #[test]
    fn and_selectivity_is_product_of_children() {
        let stats = vec![make_stats(100, 10), make_stats(100, 4)];
        let p = Predicate::And(vec![
            Arc::new(Predicate::Comparison {
                column: 0,
                op: CompareOp::Eq,
                value: ScalarConst::Int64(1),
            }),
            Arc::new(Predicate::Comparison {
                column: 1,
                op: CompareOp::Eq,
                value: ScalarConst::Int64(1),
            }),
        ]);
        let sel = p.estimated_selectivity(&stats);
        assert!((sel - (0.1 * 0.25)).abs() < 1e-9);
    }

    #[test]
    fn not_selectivity_complements_child() {
        let stats = vec![make_stats(100, 2)];
        let p = Predicate::Not(Arc::new(Predicate::Comparison {
            column: 0,
            op: CompareOp::Eq,
            value: ScalarConst::Int64(1),
        }));
        assert!((p.estimated_selectivity(&stats) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn nan_is_unordered_against_everything_including_itself() {
        let nan = ScalarConst::Float64(f64::NAN);
        assert_eq!(nan.partial_compare(&nan), None);
        assert_eq!(nan.partial_compare(&ScalarConst::Float64(1.0)), None);
    }

    #[test]
    fn only_comparison_and_between_are_zone_map_evaluable() {
        assert!(Predicate::Comparison {
            column: 0,
            op: CompareOp::Eq,
            value: ScalarConst::Int64(1)
        }
        .is_zone_map_evaluable());
        assert!(!Predicate::StringEquality {
            column: 0,
            value: "x".into(),
            mode: StringMode::CaseSensitive
        }
        .is_zone_map_evaluable());
    }
}
