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

//! A host-neutral expression tree (spec §4.9): the shape a caller-built
//! predicate arrives in from any embedding language, before
//! [`translate::to_predicate`] lowers it to a [`crate::predicate::Predicate`].
//! Column references are by field name, resolved against a schema at
//! translation time rather than at construction time, so the same tree
//! can be built without a schema in hand.

pub mod translate;

use crate::predicate::{CompareOp, ScalarConst};

/// The `op` of a [`ExprNode::StringCall`] — `equals`/`starts_with`/
/// `ends_with`/`contains`/`like`, matching spec §4.9's enumerated
/// string-method set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringMethod {
    Equals,
    StartsWith,
    EndsWith,
    Contains,
    Like,
}

/// A node in a caller-built expression tree: member access, constant,
/// binary op, or call, per spec §4.9. Lambdas are represented implicitly
/// -- a tree rooted here *is* the lambda body, with the row parameter
/// implicit in every `Column` reference.
#[derive(Debug, Clone)]
pub enum ExprNode {
    /// A member access on the row parameter: the field's name in the
    /// collection's schema.
    Column(String),
    Literal(ScalarConst),
    Compare {
        op: CompareOp,
        left: Box<ExprNode>,
        right: Box<ExprNode>,
    },
    And(Vec<ExprNode>),
    Or(Vec<ExprNode>),
    Not(Box<ExprNode>),
    IsNull(Box<ExprNode>),
    IsNotNull(Box<ExprNode>),
    /// A string-method call: `receiver.method(arg)`, optionally
    /// case-insensitive (spec §4.9's `equals`/`starts_with`/`ends_with`/
    /// `contains`/`like`).
    StringCall {
        receiver: Box<ExprNode>,
        method: StringMethod,
        arg: String,
        case_insensitive: bool,
    },
}

impl ExprNode {
    pub fn column(name: impl Into<String>) -> Self {
        ExprNode::Column(name.into())
    }

    pub fn literal(value: ScalarConst) -> Self {
        ExprNode::Literal(value)
    }

    pub fn eq(self, other: ExprNode) -> Self {
        ExprNode::Compare { op: CompareOp::Eq, left: Box::new(self), right: Box::new(other) }
    }

    pub fn gt(self, other: ExprNode) -> Self {
        ExprNode::Compare { op: CompareOp::Gt, left: Box::new(self), right: Box::new(other) }
    }

    pub fn lt(self, other: ExprNode) -> Self {
        ExprNode::Compare { op: CompareOp::Lt, left: Box::new(self), right: Box::new(other) }
    }

    pub fn and(self, other: ExprNode) -> Self {
        match self {
            ExprNode::And(mut children) => {
                children.push(other);
                ExprNode::And(children)
            }
            first => ExprNode::And(vec![first, other]),
        }
    }

    pub fn or(self, other: ExprNode) -> Self {
        match self {
            ExprNode::Or(mut children) => {
                children.push(other);
                ExprNode::Or(children)
            }
            first => ExprNode::Or(vec![first, other]),
        }
    }

    pub fn not(self) -> Self {
        ExprNode::Not(Box::new(self))
    }

    pub fn is_null(self) -> Self {
        ExprNode::IsNull(Box::new(self))
    }

    pub fn is_not_null(self) -> Self {
        ExprNode::IsNotNull(Box::new(self))
    }

    pub fn starts_with(self, prefix: impl Into<String>) -> Self {
        ExprNode::StringCall {
            receiver: Box::new(self),
            method: StringMethod::StartsWith,
            arg: prefix.into(),
            case_insensitive: false,
        }
    }

    pub fn contains(self, needle: impl Into<String>) -> Self {
        ExprNode::StringCall {
            receiver: Box::new(self),
            method: StringMethod::Contains,
            arg: needle.into(),
            case_insensitive: false,
        }
    }
}
