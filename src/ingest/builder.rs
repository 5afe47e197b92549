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

//! The per-column builder that drives ingest: appends typed values from a
//! [`RowCodec::write`] call, tracks running min/max and a distinct-value
//! sample for statistics, and (for string columns) decides dictionary
//! encoding once every row has been seen.
//!
//! Builder support is narrower than the full enumerated type set in
//! `schema::check_supported_type`: int{8,16,32,64}, uint{8,16,32,64},
//! f{32,64}, bool and utf8/large-utf8, matching every type this crate's
//! end-to-end scenarios exercise. A `RecordBatch` containing the wider set
//! (decimal, date, timestamp, binary, dictionary) read from elsewhere is
//! still fully supported via [`super::ingest_raw`], which computes
//! statistics straight from the array rather than from a streamed builder
//! (documented as a deliberate scope-narrowing in DESIGN.md).

use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::Arc;

use arrow::array::{
    Array, ArrayBuilder, ArrayRef, BooleanBuilder, Float32Builder, Float64Builder, Int8Builder,
    Int16Builder, Int32Builder, Int64Builder, LargeStringBuilder, StringBuilder,
    StringDictionaryBuilder, UInt8Builder, UInt16Builder, UInt32Builder, UInt64Builder,
};
use arrow::datatypes::{UInt8Type, UInt16Type, UInt32Type};
use arrow::record_batch::RecordBatch;
use arrow_schema::{DataType, Schema, SchemaRef};

use super::sketch::HyperLogLiteSketch;
use super::{CellValue, IngestOutput, RowBuilders, RowCodec};
use crate::config::EngineConfig;
use crate::error::{GlacierError, Result};
use crate::predicate::ScalarConst;
use crate::predicate::scalar::array_value_as_scalar;
use crate::schema::{self, smallest_dictionary_key_type};
use crate::stats::{ColumnStatistics, MinMax};
use crate::zonemap::{ChunkSummary, ZoneMap};

/// The streaming distinct-value sample cap (spec §4.1): exact counting via
/// a hash set up to this many observed values, a [`HyperLogLiteSketch`]
/// estimate beyond it.
const DISTINCT_SAMPLE_CAP: usize = 1 << 20;

struct DistinctTracker {
    exact: HashSet<String>,
    sketch: HyperLogLiteSketch,
    observed: usize,
}

impl DistinctTracker {
    fn new() -> Self {
        Self { exact: HashSet::new(), sketch: HyperLogLiteSketch::new(), observed: 0 }
    }

    fn observe(&mut self, key: &str) {
        self.sketch.insert(&key);
        if self.observed < DISTINCT_SAMPLE_CAP {
            self.exact.insert(key.to_string());
        }
        self.observed += 1;
    }

    fn distinct_count(&self) -> (usize, bool) {
        if self.observed < DISTINCT_SAMPLE_CAP {
            (self.exact.len(), false)
        } else {
            (self.sketch.estimate() as usize, true)
        }
    }
}

enum TypedBuilder {
    Int8(Int8Builder),
    Int16(Int16Builder),
    Int32(Int32Builder),
    Int64(Int64Builder),
    UInt8(UInt8Builder),
    UInt16(UInt16Builder),
    UInt32(UInt32Builder),
    UInt64(UInt64Builder),
    Float32(Float32Builder),
    Float64(Float64Builder),
    Boolean(BooleanBuilder),
    Utf8(StringBuilder),
    LargeUtf8(LargeStringBuilder),
}

impl TypedBuilder {
    fn for_type(field_name: &str, ty: &DataType) -> Result<Self> {
        Ok(match ty {
            DataType::Int8 => TypedBuilder::Int8(Int8Builder::new()),
            DataType::Int16 => TypedBuilder::Int16(Int16Builder::new()),
            DataType::Int32 => TypedBuilder::Int32(Int32Builder::new()),
            DataType::Int64 => TypedBuilder::Int64(Int64Builder::new()),
            DataType::UInt8 => TypedBuilder::UInt8(UInt8Builder::new()),
            DataType::UInt16 => TypedBuilder::UInt16(UInt16Builder::new()),
            DataType::UInt32 => TypedBuilder::UInt32(UInt32Builder::new()),
            DataType::UInt64 => TypedBuilder::UInt64(UInt64Builder::new()),
            DataType::Float32 => TypedBuilder::Float32(Float32Builder::new()),
            DataType::Float64 => TypedBuilder::Float64(Float64Builder::new()),
            DataType::Boolean => TypedBuilder::Boolean(BooleanBuilder::new()),
            DataType::Utf8 => TypedBuilder::Utf8(StringBuilder::new()),
            DataType::LargeUtf8 => TypedBuilder::LargeUtf8(LargeStringBuilder::new()),
            other => {
                return Err(GlacierError::UnsupportedType {
                    field: field_name.to_string(),
                    type_name: format!("{other:?} (builder support is narrower than predicate support)"),
                });
            }
        })
    }

    fn append_null(&mut self) {
        match self {
            TypedBuilder::Int8(b) => b.append_null(),
            TypedBuilder::Int16(b) => b.append_null(),
            TypedBuilder::Int32(b) => b.append_null(),
            TypedBuilder::Int64(b) => b.append_null(),
            TypedBuilder::UInt8(b) => b.append_null(),
            TypedBuilder::UInt16(b) => b.append_null(),
            TypedBuilder::UInt32(b) => b.append_null(),
            TypedBuilder::UInt64(b) => b.append_null(),
            TypedBuilder::Float32(b) => b.append_null(),
            TypedBuilder::Float64(b) => b.append_null(),
            TypedBuilder::Boolean(b) => b.append_null(),
            TypedBuilder::Utf8(b) => b.append_null(),
            TypedBuilder::LargeUtf8(b) => b.append_null(),
        }
    }

    /// Appends `value`, narrowing it to the builder's concrete type.
    /// Returns the row's value as a [`ScalarConst`] for statistics, if any.
    fn append(&mut self, field_name: &str, value: CellValue) -> Result<Option<ScalarConst>> {
        if let CellValue::Null = value {
            self.append_null();
            return Ok(None);
        }
        Ok(match (self, value) {
            (TypedBuilder::Int8(b), CellValue::Int(v)) => {
                b.append_value(v as i8);
                Some(ScalarConst::Int64(v))
            }
            (TypedBuilder::Int16(b), CellValue::Int(v)) => {
                b.append_value(v as i16);
                Some(ScalarConst::Int64(v))
            }
            (TypedBuilder::Int32(b), CellValue::Int(v)) => {
                b.append_value(v as i32);
                Some(ScalarConst::Int64(v))
            }
            (TypedBuilder::Int64(b), CellValue::Int(v)) => {
                b.append_value(v);
                Some(ScalarConst::Int64(v))
            }
            (TypedBuilder::UInt8(b), CellValue::UInt(v)) => {
                b.append_value(v as u8);
                Some(ScalarConst::UInt64(v))
            }
            (TypedBuilder::UInt16(b), CellValue::UInt(v)) => {
                b.append_value(v as u16);
                Some(ScalarConst::UInt64(v))
            }
            (TypedBuilder::UInt32(b), CellValue::UInt(v)) => {
                b.append_value(v as u32);
                Some(ScalarConst::UInt64(v))
            }
            (TypedBuilder::UInt64(b), CellValue::UInt(v)) => {
                b.append_value(v);
                Some(ScalarConst::UInt64(v))
            }
            (TypedBuilder::Float32(b), CellValue::Float(v)) => {
                b.append_value(v as f32);
                Some(ScalarConst::Float64(v))
            }
            (TypedBuilder::Float64(b), CellValue::Float(v)) => {
                b.append_value(v);
                Some(ScalarConst::Float64(v))
            }
            (TypedBuilder::Boolean(b), CellValue::Boolean(v)) => {
                b.append_value(v);
                Some(ScalarConst::Boolean(v))
            }
            (TypedBuilder::Utf8(b), CellValue::Utf8(v)) => {
                b.append_value(&v);
                Some(ScalarConst::Utf8(v))
            }
            (TypedBuilder::LargeUtf8(b), CellValue::Utf8(v)) => {
                b.append_value(&v);
                Some(ScalarConst::Utf8(v))
            }
            (_, v) => {
                return Err(GlacierError::TypeMismatch {
                    column: field_name.to_string(),
                    detail: format!("cannot append {v:?} to this column's declared type"),
                })
            }
        })
    }

    fn finish(self) -> ArrayRef {
        match self {
            TypedBuilder::Int8(mut b) => Arc::new(b.finish()),
            TypedBuilder::Int16(mut b) => Arc::new(b.finish()),
            TypedBuilder::Int32(mut b) => Arc::new(b.finish()),
            TypedBuilder::Int64(mut b) => Arc::new(b.finish()),
            TypedBuilder::UInt8(mut b) => Arc::new(b.finish()),
            TypedBuilder::UInt16(mut b) => Arc::new(b.finish()),
            TypedBuilder::UInt32(mut b) => Arc::new(b.finish()),
            TypedBuilder::UInt64(mut b) => Arc::new(b.finish()),
            TypedBuilder::Float32(mut b) => Arc::new(b.finish()),
            TypedBuilder::Float64(mut b) => Arc::new(b.finish()),
            TypedBuilder::Boolean(mut b) => Arc::new(b.finish()),
            TypedBuilder::Utf8(mut b) => Arc::new(b.finish()),
            TypedBuilder::LargeUtf8(mut b) => Arc::new(b.finish()),
        }
    }
}

struct ColumnAccumulator {
    name: String,
    declared_type: DataType,
    builder: TypedBuilder,
    total_count: usize,
    null_count: usize,
    distinct: DistinctTracker,
    min_max: Option<(ScalarConst, ScalarConst)>,
    orderable: bool,
    zone_mappable: bool,
    zone_map_chunk_size: usize,
    chunk_acc: Option<(ScalarConst, ScalarConst)>,
    chunks: Vec<Option<ChunkSummary>>,
}

impl ColumnAccumulator {
    fn new(name: &str, ty: &DataType, chunk_size: usize) -> Result<Self> {
        Ok(Self {
            name: name.to_string(),
            declared_type: ty.clone(),
            builder: TypedBuilder::for_type(name, ty)?,
            total_count: 0,
            null_count: 0,
            distinct: DistinctTracker::new(),
            min_max: None,
            orderable: schema::is_orderable(ty),
            zone_mappable: schema::is_zone_mappable(ty),
            zone_map_chunk_size: chunk_size,
            chunk_acc: None,
            chunks: Vec::new(),
        })
    }

    fn observe(&mut self, value: CellValue) -> Result<()> {
        let scalar = self.builder.append(&self.name, value)?;
        self.total_count += 1;
        match &scalar {
            None => {
                self.null_count += 1;
                self.distinct.observe("n");
                self.advance_chunk(None);
            }
            Some(v) => {
                self.distinct.observe(&v.hash_key());
                if self.orderable {
                    self.min_max = Some(match self.min_max.take() {
                        None => (v.clone(), v.clone()),
                        Some((min, max)) => (pick(v, &min, Ordering::Less), pick(v, &max, Ordering::Greater)),
                    });
                }
                self.advance_chunk(Some(v.clone()));
            }
        }
        Ok(())
    }

    fn advance_chunk(&mut self, value: Option<ScalarConst>) {
        if !self.zone_mappable {
            return;
        }
        if let Some(v) = value {
            self.chunk_acc = Some(match self.chunk_acc.take() {
                None => (v.clone(), v.clone()),
                Some((min, max)) => (pick(&v, &min, Ordering::Less), pick(&v, &max, Ordering::Greater)),
            });
        }
        if self.total_count % self.zone_map_chunk_size == 0 {
            self.chunks.push(self.chunk_acc.take().map(|(min, max)| ChunkSummary { min, max }));
        }
    }

    /// Finalizes the column: flushes any partial trailing chunk, builds
    /// the array (dictionary-encoding a string column whose distinct
    /// fraction warrants it), and returns `(array, statistics, zone_map)`.
    fn finish(mut self, dictionary_threshold: f64) -> (ArrayRef, ColumnStatistics, Option<ZoneMap>) {
        if self.zone_mappable && self.total_count % self.zone_map_chunk_size != 0 {
            self.chunks.push(self.chunk_acc.take().map(|(min, max)| ChunkSummary { min, max }));
        }
        let (distinct_count, is_estimate) = self.distinct.distinct_count();
        let is_string = schema::is_string(&self.declared_type);
        let zone_map = if self.zone_mappable && self.total_count >= 2 * self.zone_map_chunk_size {
            Some(ZoneMap { chunk_size: self.zone_map_chunk_size, chunks: self.chunks, total_rows: self.total_count })
        } else {
            None
        };

        let array = if is_string && should_dictionary_encode(distinct_count, self.total_count, dictionary_threshold) {
            dictionary_encode(self.builder, distinct_count)
        } else {
            self.builder.finish()
        };

        let value_type = array.data_type().clone();
        let stats = ColumnStatistics {
            name: self.name,
            value_type,
            total_count: self.total_count,
            null_count: self.null_count,
            distinct_count,
            distinct_count_is_estimate: is_estimate,
            min_max: self.min_max.map(|(min, max)| MinMax { min, max }),
        };
        (array, stats, zone_map)
    }
}

fn pick(candidate: &ScalarConst, current: &ScalarConst, when: Ordering) -> ScalarConst {
    if candidate.partial_compare(current) == Some(when) {
        candidate.clone()
    } else {
        current.clone()
    }
}

/// Dictionary-encoding decision per spec §3: a string column whose
/// `distinct_count / total_count <= threshold` is stored dictionary-encoded.
fn should_dictionary_encode(distinct_count: usize, total_count: usize, threshold: f64) -> bool {
    total_count > 0 && (distinct_count as f64 / total_count as f64) <= threshold
}

fn dictionary_encode(builder: TypedBuilder, distinct_count: usize) -> ArrayRef {
    let plain: ArrayRef = builder.finish();
    let strings = plain
        .as_any()
        .downcast_ref::<arrow::array::StringArray>()
        .expect("dictionary encoding only applies to Utf8 columns");

    match smallest_dictionary_key_type(distinct_count) {
        DataType::UInt8 => {
            let mut b = StringDictionaryBuilder::<UInt8Type>::new();
            append_dictionary_values(&mut b, strings);
            Arc::new(b.finish())
        }
        DataType::UInt16 => {
            let mut b = StringDictionaryBuilder::<UInt16Type>::new();
            append_dictionary_values(&mut b, strings);
            Arc::new(b.finish())
        }
        _ => {
            let mut b = StringDictionaryBuilder::<UInt32Type>::new();
            append_dictionary_values(&mut b, strings);
            Arc::new(b.finish())
        }
    }
}

fn append_dictionary_values<K: arrow::array::types::ArrowDictionaryKeyType>(
    builder: &mut StringDictionaryBuilder<K>,
    strings: &arrow::array::StringArray,
) {
    for i in 0..strings.len() {
        if strings.is_null(i) {
            builder.append_null();
        } else {
            builder
                .append(strings.value(i))
                .expect("dictionary key space sized by smallest_dictionary_key_type");
        }
    }
}

/// The [`RowBuilders`] implementation ingest hands to `RowCodec::write`:
/// one [`ColumnAccumulator`] per schema field, indexed by column position.
pub struct ColumnBuilders {
    columns: Vec<ColumnAccumulator>,
}

impl RowBuilders for ColumnBuilders {
    fn append(&mut self, column: usize, value: CellValue) -> Result<()> {
        self.columns[column].observe(value)
    }
}

pub fn ingest_rows<T>(
    records: impl Iterator<Item = T>,
    codec: &dyn RowCodec<T>,
    config: &EngineConfig,
) -> Result<IngestOutput> {
    let schema = codec.schema();
    let mut columns = Vec::with_capacity(schema.fields().len());
    for field in schema.fields() {
        schema::check_supported_type(field.name(), field.data_type())?;
        columns.push(ColumnAccumulator::new(field.name(), field.data_type(), config.zone_map_chunk_size)?);
    }
    let mut builders = ColumnBuilders { columns };

    for item in records {
        codec.write(&mut builders, &item)?;
    }

    let row_counts: Vec<usize> = builders.columns.iter().map(|c| c.total_count).collect();
    if let Some(first) = row_counts.first() {
        if row_counts.iter().any(|&n| n != *first) {
            return Err(GlacierError::SchemaMismatch {
                detail: "not every column received the same number of rows during ingest".to_string(),
            });
        }
    }

    let mut arrays = Vec::with_capacity(builders.columns.len());
    let mut statistics = Vec::with_capacity(builders.columns.len());
    let mut zone_maps = Vec::with_capacity(builders.columns.len());
    for column in builders.columns {
        let (array, stats, zone_map) = column.finish(config.dictionary_threshold);
        arrays.push(array);
        statistics.push(stats);
        zone_maps.push(zone_map);
    }

    let fields: Vec<_> = schema
        .fields()
        .iter()
        .zip(&arrays)
        .map(|(f, a)| arrow_schema::Field::new(f.name(), a.data_type().clone(), f.is_nullable()))
        .collect();
    let batch_schema: SchemaRef = Arc::new(Schema::new(fields));
    let batch = RecordBatch::try_new(batch_schema, arrays)?;

    log::debug!(
        "ingested {} rows across {} columns",
        batch.num_rows(),
        batch.num_columns()
    );

    Ok(IngestOutput { batch, statistics, zone_maps })
}

/// Computes statistics and zone maps for a `RecordBatch` that already
/// exists (e.g. read back via IPC), without going through a `RowCodec` or
/// re-encoding any column -- spec §6's `freeze_raw`.
pub fn stats_and_zone_maps_from_batch(batch: RecordBatch, config: &EngineConfig) -> Result<IngestOutput> {
    let schema = batch.schema();
    let mut statistics = Vec::with_capacity(batch.num_columns());
    let mut zone_maps = Vec::with_capacity(batch.num_columns());

    for (idx, field) in schema.fields().iter().enumerate() {
        schema::check_supported_type(field.name(), field.data_type())?;
        let array = batch.column(idx);
        let total_count = array.len();
        let null_count = array.null_count();
        let mut distinct = DistinctTracker::new();
        let mut min_max: Option<(ScalarConst, ScalarConst)> = None;
        let orderable = schema::is_orderable(field.data_type());
        let zone_mappable = schema::is_zone_mappable(field.data_type());
        let mut chunks = Vec::new();
        let mut chunk_acc: Option<(ScalarConst, ScalarConst)> = None;
        let chunk_size = config.zone_map_chunk_size;

        for i in 0..total_count {
            match array_value_as_scalar(array, i) {
                None => distinct.observe("n"),
                Some(v) => {
                    distinct.observe(&v.hash_key());
                    if orderable {
                        min_max = Some(match min_max.take() {
                            None => (v.clone(), v.clone()),
                            Some((min, max)) => (pick(&v, &min, Ordering::Less), pick(&v, &max, Ordering::Greater)),
                        });
                    }
                    if zone_mappable {
                        chunk_acc = Some(match chunk_acc.take() {
                            None => (v.clone(), v.clone()),
                            Some((min, max)) => (pick(&v, &min, Ordering::Less), pick(&v, &max, Ordering::Greater)),
                        });
                    }
                }
            }
            if zone_mappable && (i + 1) % chunk_size == 0 {
                chunks.push(chunk_acc.take().map(|(min, max)| ChunkSummary { min, max }));
            }
        }
        if zone_mappable && total_count % chunk_size != 0 {
            chunks.push(chunk_acc.take().map(|(min, max)| ChunkSummary { min, max }));
        }

        let (distinct_count, is_estimate) = distinct.distinct_count();
        zone_maps.push(if zone_mappable && total_count >= 2 * chunk_size {
            Some(ZoneMap { chunk_size, chunks, total_rows: total_count })
        } else {
            None
        });
        statistics.push(ColumnStatistics {
            name: field.name().clone(),
            value_type: field.data_type().clone(),
            total_count,
            null_count,
            distinct_count,
            distinct_count_is_estimate: is_estimate,
            min_max: min_max.map(|(min, max)| MinMax { min, max }),
        });
    }

    Ok(IngestOutput { batch, statistics, zone_maps })
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow_schema::Field;

    struct Row {
        id: i32,
        cat: Option<String>,
    }

    struct RowCodecImpl {
        schema: SchemaRef,
    }

    impl RowCodec<Row> for RowCodecImpl {
        fn read(&self, batch: &RecordBatch, row: usize) -> Result<Row> {
            let id = batch
                .column(0)
                .as_any()
                .downcast_ref::<arrow::array::Int32Array>()
                .unwrap()
                .value(row);
            Ok(Row { id, cat: None })
        }

        fn write(&self, builders: &mut dyn RowBuilders, item: &Row) -> Result<()> {
            builders.append(0, CellValue::Int(item.id as i64))?;
            match &item.cat {
                Some(s) => builders.append(1, CellValue::Utf8(s.clone()))?,
                None => builders.append(1, CellValue::Null)?,
            }
            Ok(())
        }

        fn schema(&self) -> SchemaRef {
            self.schema.clone()
        }
    }

    fn codec() -> RowCodecImpl {
        RowCodecImpl {
            schema: Arc::new(Schema::new(vec![
                Field::new("id", DataType::Int32, false),
                Field::new("cat", DataType::Utf8, true),
            ])),
        }
    }

    #[test]
    fn ingest_builds_a_batch_with_matching_row_count() {
        let rows = vec![
            Row { id: 1, cat: Some("A".to_string()) },
            Row { id: 2, cat: None },
            Row { id: 3, cat: Some("B".to_string()) },
        ];
        let config = EngineConfig::default();
        let out = ingest_rows(rows.into_iter(), &codec(), &config).unwrap();
        assert_eq!(out.batch.num_rows(), 3);
        assert_eq!(out.statistics[0].total_count, 3);
        assert_eq!(out.statistics[1].null_count, 1);
    }

    #[test]
    fn low_cardinality_string_column_gets_dictionary_encoded() {
        let rows: Vec<Row> = (0..1000)
            .map(|i| Row { id: i, cat: Some(format!("cat_{}", i % 5)) })
            .collect();
        let config = EngineConfig::default();
        let out = ingest_rows(rows.into_iter(), &codec(), &config).unwrap();
        assert!(matches!(out.batch.schema().field(1).data_type(), DataType::Dictionary(_, _)));
        assert_eq!(out.statistics[1].distinct_count, 5);
    }

    #[test]
    fn high_cardinality_string_column_stays_plain() {
        let rows: Vec<Row> = (0..1000).map(|i| Row { id: i, cat: Some(format!("unique_{i}")) }).collect();
        let config = EngineConfig::default();
        let out = ingest_rows(rows.into_iter(), &codec(), &config).unwrap();
        assert_eq!(out.batch.schema().field(1).data_type(), &DataType::Utf8);
    }

    #[test]
    fn zone_map_is_built_only_once_row_count_warrants_it() {
        let mut config = EngineConfig::default();
        config.zone_map_chunk_size = 10;
        let rows: Vec<Row> = (0..5).map(|i| Row { id: i, cat: None }).collect();
        let out = ingest_rows(rows.into_iter(), &codec(), &config).unwrap();
        assert!(out.zone_maps[0].is_none());

        let rows: Vec<Row> = (0..25).map(|i| Row { id: i, cat: None }).collect();
        let out = ingest_rows(rows.into_iter(), &codec(), &config).unwrap();
        assert!(out.zone_maps[0].is_some());
        assert_eq!(out.zone_maps[0].as_ref().unwrap().chunk_count(), 3);
    }

    #[test]
    fn mismatched_row_counts_across_columns_is_a_schema_mismatch() {
        struct BadCodec {
            schema: SchemaRef,
        }
        impl RowCodec<i32> for BadCodec {
            fn read(&self, _batch: &RecordBatch, _row: usize) -> Result<i32> {
                Ok(0)
            }
            fn write(&self, builders: &mut dyn RowBuilders, item: &i32) -> Result<()> {
                builders.append(0, CellValue::Int(*item as i64))?;
                if *item % 2 == 0 {
                    builders.append(1, CellValue::Null)?;
                }
                Ok(())
            }
            fn schema(&self) -> SchemaRef {
                self.schema.clone()
            }
        }
        let codec = BadCodec {
            schema: Arc::new(Schema::new(vec![
                Field::new("a", DataType::Int32, false),
                Field::new("b", DataType::Utf8, true),
            ])),
        };
        let config = EngineConfig::default();
        let err = ingest_rows(vec![0, 1, 2].into_iter(), &codec, &config).unwrap_err();
        assert!(matches!(err, GlacierError::SchemaMismatch { .. }));
    }
}
