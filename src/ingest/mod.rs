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

//! Turns a finite sequence of records of a known shape into
//! `(RecordBatch, ColumnStatistics[], ZoneMap?[])` (spec §4.1).
//!
//! The record-shape code generator is out of scope for this crate (spec
//! §1); what it must produce is the [`RowCodec`] interface below. Ingest
//! is generic over `RowCodec<T>` and never itself knows about a
//! particular `T`'s field layout.

pub mod builder;
pub mod sketch;

use arrow::record_batch::RecordBatch;
use arrow_schema::SchemaRef;

use crate::config::EngineConfig;
use crate::error::Result;
use crate::stats::ColumnStatistics;
use crate::zonemap::ZoneMap;

/// A generated (or hand-written) row codec for one record type `T`. Ingest
/// calls `write` once per record; rendering calls `read` once per selected
/// row. Per spec §9's "explicit row codecs" redesign note, this replaces
/// the teacher-language's annotation-driven code generator with a plain
/// trait this crate is generic over.
pub trait RowCodec<T>: Send + Sync {
    fn read(&self, batch: &RecordBatch, row: usize) -> Result<T>;
    fn write(&self, builders: &mut dyn RowBuilders, item: &T) -> Result<()>;
    fn schema(&self) -> SchemaRef;
}

/// One column's value as a generated `RowCodec::write` impl hands it to
/// ingest: declared-type narrowing (e.g. `Int(v)` into an `Int32` column)
/// happens inside the column builder, not here.
#[derive(Debug, Clone)]
pub enum CellValue {
    Int(i64),
    UInt(u64),
    Float(f64),
    Boolean(bool),
    Utf8(String),
    Null,
}

/// The column-builder capability a [`RowCodec::write`] implementation is
/// given. Concrete columns (one per schema field) are owned by
/// [`builder::ColumnBuilders`]; this trait is the narrow seam a generated
/// codec writes through without needing to know how a column is stored.
pub trait RowBuilders {
    fn append(&mut self, column: usize, value: CellValue) -> Result<()>;
}

/// Everything ingest produces for one frozen collection.
pub struct IngestOutput {
    pub batch: RecordBatch,
    pub statistics: Vec<ColumnStatistics>,
    pub zone_maps: Vec<Option<ZoneMap>>,
}

/// Ingests `records` through `codec`, producing a single `RecordBatch` plus
/// per-column statistics and zone maps. The input is exhausted exactly
/// once; row order is preserved.
pub fn ingest<T>(
    records: impl Iterator<Item = T>,
    codec: &dyn RowCodec<T>,
    config: &EngineConfig,
) -> Result<IngestOutput> {
    builder::ingest_rows(records, codec, config)
}

/// Wraps an already-built `RecordBatch` (e.g. read back via IPC) without
/// going through a `RowCodec`, computing statistics and zone maps directly
/// from the columns (spec §6's `freeze_raw`).
pub fn ingest_raw(batch: RecordBatch, config: &EngineConfig) -> Result<IngestOutput> {
    builder::stats_and_zone_maps_from_batch(batch, config)
}
