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

//! Lowers an [`ExprNode`] tree into a [`Predicate`] against a concrete
//! schema (spec §4.9). Column references are resolved by name here, once,
//! so every downstream consumer works with column indices.
//!
//! An expression this crate has no kernel for becomes
//! `GlacierError::UnsupportedExpression`; when `EngineConfig::fallback_allowed`
//! is set, callers are expected to catch that and fall back to evaluating
//! the original host-language lambda row-by-row instead of treating it as
//! a hard failure (spec §4.9's "fallback" redesign note). This module
//! itself only reports the error -- the fallback decision belongs to the
//! caller wiring `ExprNode` translation into a query.
use std::sync::Arc;

use arrow_schema::Schema;

use super::{ExprNode, StringMethod};
use crate::error::{GlacierError, Result};
use crate::predicate::{CompareOp, Predicate, ScalarConst, StringMode, StringOp};
use crate::schema;

/// Translates `expr` into a `Predicate` evaluable against `schema`.
pub fn to_predicate(expr: &ExprNode, schema: &Schema) -> Result<Arc<Predicate>> {
    match expr {
        ExprNode::And(children) => {
            let children = children.iter().map(|c| to_predicate(c, schema)).collect::<Result<Vec<_>>>()?;
            Ok(Arc::new(Predicate::And(children)))
        }
        ExprNode::Or(children) => {
            let children = children.iter().map(|c| to_predicate(c, schema)).collect::<Result<Vec<_>>>()?;
            Ok(Arc::new(Predicate::Or(children)))
        }
        ExprNode::Not(inner) => Ok(Arc::new(Predicate::Not(to_predicate(inner, schema)?))),
        ExprNode::IsNull(inner) => {
            let column = column_of(inner, schema)?;
            Ok(Arc::new(Predicate::NullTest { column, is_null: true }))
        }
        ExprNode::IsNotNull(inner) => {
            let column = column_of(inner, schema)?;
            Ok(Arc::new(Predicate::NullTest { column, is_null: false }))
        }
        ExprNode::Compare { op, left, right } => compare_to_predicate(*op, left, right, schema),
        ExprNode::StringCall { receiver, method, arg, case_insensitive } => {
            let column = column_of(receiver, schema)?;
            let mode = if *case_insensitive { StringMode::CaseInsensitive } else { StringMode::CaseSensitive };
            Ok(Arc::new(match method {
                StringMethod::Equals => Predicate::StringEquality { column, value: arg.clone(), mode },
                StringMethod::StartsWith => {
                    Predicate::StringOperation { column, pattern: arg.clone(), op: StringOp::StartsWith, mode }
                }
                StringMethod::EndsWith => {
                    Predicate::StringOperation { column, pattern: arg.clone(), op: StringOp::EndsWith, mode }
                }
                StringMethod::Contains => {
                    Predicate::StringOperation { column, pattern: arg.clone(), op: StringOp::Contains, mode }
                }
                StringMethod::Like => Predicate::StringOperation { column, pattern: arg.clone(), op: StringOp::Like, mode },
            }))
        }
        ExprNode::Column(_) | ExprNode::Literal(_) => Err(GlacierError::UnsupportedExpression {
            detail: "a bare column reference or literal is not a predicate".to_string(),
        }),
    }
}

fn compare_to_predicate(op: CompareOp, left: &ExprNode, right: &ExprNode, schema: &Schema) -> Result<Arc<Predicate>> {
    let (column, value, op) = match (left, right) {
        (ExprNode::Column(name), ExprNode::Literal(value)) => {
            (schema::field_index(schema, name)?, value.clone(), op)
        }
        (ExprNode::Literal(value), ExprNode::Column(name)) => {
            (schema::field_index(schema, name)?, value.clone(), flip(op))
        }
        _ => {
            return Err(GlacierError::UnsupportedExpression {
                detail: "comparisons must be between exactly one column and one literal".to_string(),
            })
        }
    };

    let is_string_column = schema::is_string(schema.field(column).data_type());
    if is_string_column {
        return match (op, &value) {
            (CompareOp::Eq, ScalarConst::Utf8(s)) => Ok(Arc::new(Predicate::StringEquality {
                column,
                value: s.clone(),
                mode: StringMode::CaseSensitive,
            })),
            (CompareOp::Ne, ScalarConst::Utf8(s)) => Ok(Arc::new(Predicate::Not(Arc::new(Predicate::StringEquality {
                column,
                value: s.clone(),
                mode: StringMode::CaseSensitive,
            })))),
            _ => Err(GlacierError::UnsupportedExpression {
                detail: format!("ordering comparisons are not supported against string column index {column}"),
            }),
        };
    }

    Ok(Arc::new(Predicate::Comparison { column, op, value }))
}

fn flip(op: CompareOp) -> CompareOp {
    match op {
        CompareOp::Eq => CompareOp::Eq,
        CompareOp::Ne => CompareOp::Ne,
        CompareOp::Lt => CompareOp::Gt,
        CompareOp::Le => CompareOp::Ge,
        CompareOp::Gt => CompareOp::Lt,
        CompareOp::Ge => CompareOp::Le,
    }
}

fn column_of(expr: &ExprNode, schema: &Schema) -> Result<usize> {
    match expr {
        ExprNode::Column(name) => schema::field_index(schema, name),
        _ => Err(GlacierError::UnsupportedExpression {
            detail: "expected a column reference".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow_schema::{DataType, Field};

    fn schema() -> Schema {
        Schema::new(vec![
            Field::new("age", DataType::Int32, false),
            Field::new("name", DataType::Utf8, true),
        ])
    }

    #[test]
    fn column_compare_literal_lowers_to_a_comparison_predicate() {
        let expr = ExprNode::column("age").gt(ExprNode::literal(ScalarConst::Int64(21)));
        let predicate = to_predicate(&expr, &schema()).unwrap();
        match predicate.as_ref() {
            Predicate::Comparison { column, op, value } => {
                assert_eq!(*column, 0);
                assert_eq!(*op, CompareOp::Gt);
                assert_eq!(*value, ScalarConst::Int64(21));
            }
            other => panic!("unexpected predicate: {other:?}"),
        }
    }

    #[test]
    fn literal_first_comparison_flips_the_operator() {
        let expr = ExprNode::literal(ScalarConst::Int64(21)).lt(ExprNode::column("age"));
        let predicate = to_predicate(&expr, &schema()).unwrap();
        match predicate.as_ref() {
            Predicate::Comparison { op, .. } => assert_eq!(*op, CompareOp::Gt),
            other => panic!("unexpected predicate: {other:?}"),
        }
    }

    #[test]
    fn string_equality_compare_lowers_to_string_equality_predicate() {
        let expr = ExprNode::column("name").eq(ExprNode::literal(ScalarConst::Utf8("Ada".to_string())));
        let predicate = to_predicate(&expr, &schema()).unwrap();
        assert!(matches!(predicate.as_ref(), Predicate::StringEquality { .. }));
    }

    #[test]
    fn ordering_compare_on_a_string_column_is_unsupported() {
        let expr = ExprNode::column("name").gt(ExprNode::literal(ScalarConst::Utf8("Ada".to_string())));
        assert!(to_predicate(&expr, &schema()).is_err());
    }

    #[test]
    fn string_contains_lowers_to_string_operation_predicate() {
        let expr = ExprNode::column("name").contains("da");
        let predicate = to_predicate(&expr, &schema()).unwrap();
        match predicate.as_ref() {
            Predicate::StringOperation { op, .. } => assert_eq!(*op, StringOp::Contains),
            other => panic!("unexpected predicate: {other:?}"),
        }
    }

    #[test]
    fn compare_between_two_columns_is_unsupported() {
        let expr = ExprNode::Compare {
            op: CompareOp::Eq,
            left: Box::new(ExprNode::column("age")),
            right: Box::new(ExprNode::column("name")),
        };
        assert!(to_predicate(&expr, &schema()).is_err());
    }
}
