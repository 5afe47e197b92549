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

//! The error type threaded through every fallible operation in this crate.

use std::fmt;

/// Result alias used throughout the crate.
pub type Result<T, E = GlacierError> = std::result::Result<T, E>;

/// A single error type for the whole engine. Every kind carries enough
/// context (column, predicate, row range) to be useful at the API boundary
/// without a stack trace.
#[derive(Debug)]
pub enum GlacierError {
    /// Ingest or materialization saw a field whose type is outside the
    /// enumerated set of supported column types.
    UnsupportedType { field: String, type_name: String },
    /// Ingest rows disagreed on field presence/nullability, or an IPC
    /// stream's schema did not match the declared record shape.
    SchemaMismatch { detail: String },
    /// A predicate's constant type does not match the column's declared
    /// type.
    TypeMismatch { column: String, detail: String },
    /// The expression translator saw a construct it cannot map to a
    /// logical plan node.
    UnsupportedExpression { detail: String },
    /// The executor saw a predicate kind / column-type combination with
    /// no kernel.
    UnsupportedPredicate { column: String, predicate: String },
    /// A caller-supplied limit/offset was out of range.
    IndexOutOfRange { index: usize, len: usize },
    /// The query was cancelled, either explicitly or via a deadline.
    Cancelled,
    /// An aggregate over zero rows with no identity element (avg/min/max/first).
    NoElements { op: String },
    /// An invariant was violated; treat as a bug in this crate.
    Internal(String),
    /// Propagated from the `arrow` crate.
    Arrow(arrow::error::ArrowError),
}

impl fmt::Display for GlacierError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GlacierError::UnsupportedType { field, type_name } => write!(
                f,
                "unsupported type: field `{field}` has type `{type_name}`, which is outside the set of supported column types"
            ),
            GlacierError::SchemaMismatch { detail } => {
                write!(f, "schema mismatch: {detail}")
            }
            GlacierError::TypeMismatch { column, detail } => {
                write!(f, "type mismatch on column `{column}`: {detail}")
            }
            GlacierError::UnsupportedExpression { detail } => {
                write!(f, "unsupported expression: {detail}")
            }
            GlacierError::UnsupportedPredicate { column, predicate } => write!(
                f,
                "no kernel for predicate `{predicate}` against column `{column}`"
            ),
            GlacierError::IndexOutOfRange { index, len } => {
                write!(f, "index {index} out of range for length {len}")
            }
            GlacierError::Cancelled => write!(f, "query cancelled"),
            GlacierError::NoElements { op } => {
                write!(f, "`{op}` has no elements to aggregate")
            }
            GlacierError::Internal(detail) => write!(f, "internal error: {detail}"),
            GlacierError::Arrow(e) => write!(f, "arrow error: {e}"),
        }
    }
}

impl std::error::Error for GlacierError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GlacierError::Arrow(e) => Some(e),
            _ => None,
        }
    }
}

impl From<arrow::error::ArrowError> for GlacierError {
    fn from(e: arrow::error::ArrowError) -> Self {
        GlacierError::Arrow(e)
    }
}
