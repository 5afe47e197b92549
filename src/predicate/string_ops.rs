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

//! String predicate evaluation: the dictionary fast path (spec §4.3 rule
//! 2) and the scalar per-row fallback (rule 6) for plain `Utf8` columns.

use arrow::array::{Array, ArrayRef, DictionaryArray, LargeStringArray, StringArray};
use arrow::datatypes::{DataType, UInt16Type, UInt32Type, UInt8Type};
use arrow::record_batch::RecordBatch;

use super::{StringMode, StringOp};
use crate::bitmap::SelectionBitmap;
use crate::error::Result;

fn fold(s: &str, mode: StringMode) -> std::borrow::Cow<'_, str> {
    match mode {
        StringMode::CaseSensitive => std::borrow::Cow::Borrowed(s),
        // A precomputed-fold-table in production is just `str::to_lowercase`
        // backed by Unicode's case-folding tables; we call directly into
        // that table rather than hand-rolling one.
        StringMode::CaseInsensitive => std::borrow::Cow::Owned(s.to_lowercase()),
    }
}

fn string_matches(value: &str, pattern: &str, op: StringOp, mode: StringMode) -> bool {
    let value = fold(value, mode);
    let pattern = fold(pattern, mode);
    match op {
        StringOp::StartsWith => value.starts_with(pattern.as_ref()),
        StringOp::EndsWith => value.ends_with(pattern.as_ref()),
        StringOp::Contains => value.contains(pattern.as_ref()),
        StringOp::Like => like_matches(&value, &pattern),
    }
}

/// SQL-style `LIKE`: `%` matches any run of characters, `_` matches
/// exactly one. No escape character support (out of scope for this
/// engine's predicate language).
fn like_matches(value: &str, pattern: &str) -> bool {
    let value: Vec<char> = value.chars().collect();
    let pattern: Vec<char> = pattern.chars().collect();
    like_rec(&value, &pattern)
}

fn like_rec(value: &[char], pattern: &[char]) -> bool {
    match pattern.first() {
        None => value.is_empty(),
        Some('%') => {
            like_rec(value, &pattern[1..])
                || (!value.is_empty() && like_rec(&value[1..], pattern))
        }
        Some('_') => !value.is_empty() && like_rec(&value[1..], &pattern[1..]),
        Some(c) => value.first() == Some(c) && like_rec(&value[1..], &pattern[1..]),
    }
}

enum EitherString<'a> {
    Utf8(&'a StringArray),
    LargeUtf8(&'a LargeStringArray),
}

impl EitherString<'_> {
    fn value(&self, i: usize) -> &str {
        match self {
            EitherString::Utf8(a) => a.value(i),
            EitherString::LargeUtf8(a) => a.value(i),
        }
    }
    fn is_null(&self, i: usize) -> bool {
        match self {
            EitherString::Utf8(a) => a.is_null(i),
            EitherString::LargeUtf8(a) => a.is_null(i),
        }
    }
    fn len(&self) -> usize {
        match self {
            EitherString::Utf8(a) => a.len(),
            EitherString::LargeUtf8(a) => a.len(),
        }
    }
}

fn as_either(array: &dyn Array) -> Option<EitherString<'_>> {
    if let Some(a) = array.as_any().downcast_ref::<StringArray>() {
        return Some(EitherString::Utf8(a));
    }
    if let Some(a) = array.as_any().downcast_ref::<LargeStringArray>() {
        return Some(EitherString::LargeUtf8(a));
    }
    None
}

/// Runs `test` over each distinct dictionary value once, producing a
/// per-key-index mask, then streams the (much cheaper) integer index
/// column to decide each row — O(d) string comparisons plus O(n) integer
/// lookups instead of O(n) string comparisons.
fn eval_dictionary_fast_path(
    array: &ArrayRef,
    bitmap: &mut SelectionBitmap,
    test: impl Fn(&str) -> bool,
) -> Result<bool> {
    macro_rules! try_key {
        ($key_ty:ty) => {
            if let Some(dict) = array.as_any().downcast_ref::<DictionaryArray<$key_ty>>() {
                let values = dict.values();
                let values = as_either(values.as_ref()).expect("dictionary value column must be string");
                let mask: Vec<bool> = (0..values.len())
                    .map(|i| !values.is_null(i) && test(values.value(i)))
                    .collect();
                let keys = dict.keys();
                for i in bitmap.iterate_set() {
                    let i = i as usize;
                    if keys.is_null(i) {
                        bitmap.clear(i);
                        continue;
                    }
                    let key = keys.value(i) as usize;
                    let hit = mask.get(key).copied().unwrap_or(false);
                    if !hit {
                        bitmap.clear(i);
                    }
                }
                return Ok(true);
            }
        };
    }
    try_key!(UInt8Type);
    try_key!(UInt16Type);
    try_key!(UInt32Type);
    Ok(false)
}

pub fn eval_string_equality(
    batch: &RecordBatch,
    column: usize,
    value: &str,
    mode: StringMode,
    bitmap: &mut SelectionBitmap,
) -> Result<()> {
    eval_string_operation_impl(batch, column, value, StringOp::StartsWith, mode, bitmap, true)
}

pub fn eval_string_operation(
    batch: &RecordBatch,
    column: usize,
    pattern: &str,
    op: StringOp,
    mode: StringMode,
    bitmap: &mut SelectionBitmap,
) -> Result<()> {
    eval_string_operation_impl(batch, column, pattern, op, mode, bitmap, false)
}

fn eval_string_operation_impl(
    batch: &RecordBatch,
    column: usize,
    pattern: &str,
    op: StringOp,
    mode: StringMode,
    bitmap: &mut SelectionBitmap,
    exact_equality: bool,
) -> Result<()> {
    let array = batch.column(column);
    if matches!(array.data_type(), DataType::Dictionary(_, _)) {
        let pattern = pattern.to_string();
        let handled = eval_dictionary_fast_path(array, bitmap, move |v| {
            if exact_equality {
                fold(v, mode) == fold(&pattern, mode)
            } else {
                string_matches(v, &pattern, op, mode)
            }
        })?;
        if handled {
            return Ok(());
        }
    }

    let values = as_either(array.as_ref()).ok_or_else(|| {
        super::scalar::unsupported(
            batch.schema().field(column).name(),
            "string predicate on non-string column",
        )
    })?;
    for i in bitmap.iterate_set() {
        let i = i as usize;
        if values.is_null(i) {
            bitmap.clear(i);
            continue;
        }
        let hit = if exact_equality {
            fold(values.value(i), mode) == fold(pattern, mode)
        } else {
            string_matches(values.value(i), pattern, op, mode)
        };
        if !hit {
            bitmap.clear(i);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::UInt8Array;
    use arrow::datatypes::{Field, Schema};
    use std::sync::Arc;

    #[test]
    fn like_supports_percent_and_underscore() {
        assert!(like_matches("hello", "h_llo"));
        assert!(like_matches("hello world", "hello%"));
        assert!(like_matches("hello world", "%world"));
        assert!(!like_matches("hello", "h_l"));
    }

    fn dict_batch(values: Vec<&str>, keys: Vec<u8>) -> RecordBatch {
        let value_array = Arc::new(StringArray::from(values)) as ArrayRef;
        let key_array = UInt8Array::from(keys);
        let dict = DictionaryArray::<UInt8Type>::try_new(key_array, value_array).unwrap();
        let field = Field::new(
            "cat",
            DataType::Dictionary(Box::new(DataType::UInt8), Box::new(DataType::Utf8)),
            true,
        );
        let schema = Arc::new(Schema::new(vec![field]));
        RecordBatch::try_new(schema, vec![Arc::new(dict)]).unwrap()
    }

    #[test]
    fn dictionary_fast_path_matches_scalar_equality() {
        let batch = dict_batch(vec!["A", "B", "C"], vec![0, 1, 2, 1, 0]);
        let mut bm = SelectionBitmap::new_set(5);
        eval_string_equality(&batch, 0, "B", StringMode::CaseSensitive, &mut bm).unwrap();
        assert_eq!(bm.iterate_set(), vec![1, 3]);
    }

    #[test]
    fn plain_utf8_column_string_operation() {
        let array = Arc::new(StringArray::from(vec![Some("abc"), Some("xyz"), None])) as ArrayRef;
        let schema = Arc::new(Schema::new(vec![Field::new("s", DataType::Utf8, true)]));
        let batch = RecordBatch::try_new(schema, vec![array]).unwrap();
        let mut bm = SelectionBitmap::new_set(3);
        eval_string_operation(&batch, 0, "a", StringOp::StartsWith, StringMode::CaseSensitive, &mut bm).unwrap();
        assert_eq!(bm.iterate_set(), vec![0]);
    }
}
