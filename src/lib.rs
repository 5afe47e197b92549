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

//! `glacier` is an in-process, read-only columnar query engine over
//! frozen Apache Arrow record batches.
//!
//! A caller ingests a finite sequence of records of some type `T` once,
//! via [`Frozen::freeze`] and a [`RowCodec<T>`](ingest::RowCodec), and gets
//! back an immutable [`Frozen<T>`] that can be queried repeatedly and
//! concurrently through [`Frozen::query`]. Queries are built with
//! [`Queryable<T>`]'s fluent combinators (`where_`, `select`, `order_by`,
//! `group_by`, `distinct`, `limit`, `offset`) and executed by one of
//! [`Queryable<T>`]'s terminators (`count`, `sum`, `to_list`, `to_batch`,
//! `explain`, ...).
//!
//! ```text
//! let frozen = Frozen::freeze(records.into_iter(), &codec, &EngineConfig::default())?;
//! let adults: Vec<Person> = frozen
//!     .query()
//!     .where_(vec![age_predicate])
//!     .order_by(vec![sort_key])
//!     .to_list()?;
//! ```
//!
//! Every layer below that surface is public so advanced callers can drop
//! down a level (build a `LogicalPlan` by hand, inspect a `QueryResult`'s
//! selection bitmap, swap in their own `RowCodec`), but the `Frozen`/
//! `Queryable` pair is the crate's intended entry point.

pub mod bitmap;
pub mod config;
pub mod error;
pub mod execution;
pub mod expr;
pub mod frozen;
pub mod ingest;
pub mod logical_plan;
pub mod optimizer;
pub mod physical_plan;
pub mod plan_cache;
pub mod predicate;
pub mod query_result;
pub mod render;
pub mod schema;
pub mod stats;
pub mod zonemap;

pub use config::EngineConfig;
pub use error::{GlacierError, Result};
pub use expr::{translate, ExprNode, StringMethod};
pub use frozen::{Frozen, LazyQueryRows, PlanDescription, Queryable};
pub use ingest::{CellValue, IngestOutput, RowBuilders, RowCodec};
pub use logical_plan::LogicalPlan;
pub use physical_plan::PhysicalPlan;
pub use predicate::{CompareOp, Predicate, ScalarConst, StringMode, StringOp};
pub use query_result::QueryResult;
