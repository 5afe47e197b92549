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

//! Thin helpers over `arrow_schema::{DataType, Schema}`, the enumerated
//! type set this engine supports, and the checks that classify a column
//! as orderable / zone-mappable / dictionary-eligible.

use arrow_schema::{DataType, Schema, SchemaRef};

use crate::error::{GlacierError, Result};

/// Returns `Ok(())` iff `ty` is one of the types enumerated in spec §3.
/// Ingest and the expression translator call this before committing to a
/// column's representation.
pub fn check_supported_type(field_name: &str, ty: &DataType) -> Result<()> {
    use DataType::*;
    let supported = matches!(
        ty,
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
            | Decimal128(_, _)
            | Utf8
            | LargeUtf8
            | Binary
            | LargeBinary
            | Date32
            | Date64
            | Timestamp(_, _)
            | Dictionary(_, _)
    );
    if supported {
        Ok(())
    } else {
        Err(GlacierError::UnsupportedType {
            field: field_name.to_string(),
            type_name: format!("{ty:?}"),
        })
    }
}

/// True for types with a total order, which is the precondition for both
/// zone maps and `Comparison`/`Between` predicates beyond equality.
pub fn is_orderable(ty: &DataType) -> bool {
    use DataType::*;
    matches!(
        ty,
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
            | Decimal128(_, _)
            | Date32
            | Date64
            | Timestamp(_, _)
    )
}

/// True for the numeric/date/timestamp family eligible for a zone map,
/// per spec §3 (`ZoneMap`). Booleans and strings are orderable-adjacent
/// but are not zone-mapped.
pub fn is_zone_mappable(ty: &DataType) -> bool {
    use DataType::*;
    matches!(
        ty,
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
            | Date32
            | Date64
            | Timestamp(_, _)
    )
}

pub fn is_string(ty: &DataType) -> bool {
    matches!(ty, DataType::Utf8 | DataType::LargeUtf8)
        || matches!(ty, DataType::Dictionary(_, value) if matches!(value.as_ref(), DataType::Utf8 | DataType::LargeUtf8))
}

/// Looks up a field's position by name, the mapping the expression
/// translator uses for member-access-to-column-reference lowering.
pub fn field_index(schema: &Schema, name: &str) -> Result<usize> {
    schema
        .fields()
        .iter()
        .position(|f| f.name() == name)
        .ok_or_else(|| GlacierError::SchemaMismatch {
            detail: format!("no column named `{name}` in schema"),
        })
}

/// Builds the smallest-width dictionary key type that can address
/// `distinct_count` distinct values, per spec §3's dictionary-encoding
/// invariant.
pub fn smallest_dictionary_key_type(distinct_count: usize) -> DataType {
    if distinct_count <= u8::MAX as usize {
        DataType::UInt8
    } else if distinct_count <= u16::MAX as usize {
        DataType::UInt16
    } else {
        DataType::UInt32
    }
}

pub type SharedSchema = SchemaRef;

#[cfg(test)]
mod tests {
    use super::*;
    use arrow_schema::TimeUnit;

    #[test]
    fn rejects_unsupported_types() {
        let err = check_supported_type("x", &DataType::Null).unwrap_err();
        assert!(matches!(err, GlacierError::UnsupportedType { .. }));
    }

    #[test]
    fn accepts_enumerated_types() {
        check_supported_type("a", &DataType::Int32).unwrap();
        check_supported_type("b", &DataType::Utf8).unwrap();
        check_supported_type(
            "c",
            &DataType::Timestamp(TimeUnit::Microsecond, None),
        )
        .unwrap();
        check_supported_type(
            "d",
            &DataType::Dictionary(Box::new(DataType::UInt16), Box::new(DataType::Utf8)),
        )
        .unwrap();
    }

    #[test]
    fn dictionary_key_width_grows_with_cardinality() {
        assert_eq!(smallest_dictionary_key_type(10), DataType::UInt8);
        assert_eq!(smallest_dictionary_key_type(1000), DataType::UInt16);
        assert_eq!(smallest_dictionary_key_type(100_000), DataType::UInt32);
    }
}
