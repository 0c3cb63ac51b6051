// Copyright 2025 Roster Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Column decoder for the Parquet dataset
//!
//! Reads the embedded schema and walks record batches in file order,
//! producing dense per-column value arrays aligned by row index. Column
//! element types without a native mapping degrade to their textual
//! rendering instead of failing the decode.

use arrow::array::{
    Array, ArrayRef, BooleanArray, Date32Array, Date64Array, Decimal128Array, Float32Array,
    Float64Array, Int32Array, Int64Array, LargeStringArray, StringArray,
    TimestampMicrosecondArray, TimestampMillisecondArray, TimestampNanosecondArray,
    TimestampSecondArray,
};
use arrow::datatypes::{DataType, TimeUnit};
use arrow::util::display::array_value_to_string;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;
use tracing::debug;

use crate::error::{Result, RosterError};

const MILLIS_PER_DAY: i64 = 86_400_000;

/// A single decoded value. Timestamps are normalized to Unix milliseconds.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Null,
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Timestamp(i64),
}

/// Dense per-column values for one record batch, with case-insensitive
/// column lookup built once at decode time.
#[derive(Debug)]
pub struct ColumnBatch {
    pub num_rows: usize,
    columns: Vec<Vec<RawValue>>,
    index: HashMap<String, usize>,
}

impl ColumnBatch {
    /// Build a batch from named columns. Columns must share one length.
    pub fn new(named: Vec<(String, Vec<RawValue>)>) -> Self {
        let num_rows = named.first().map(|(_, col)| col.len()).unwrap_or(0);
        let index = named
            .iter()
            .enumerate()
            .map(|(i, (name, _))| (name.to_lowercase(), i))
            .collect();
        let columns = named.into_iter().map(|(_, col)| col).collect();
        Self {
            num_rows,
            columns,
            index,
        }
    }

    pub fn column(&self, name: &str) -> Option<&[RawValue]> {
        self.index
            .get(&name.to_lowercase())
            .map(|&i| self.columns[i].as_slice())
    }
}

/// The decoded dataset: schema description plus column batches in file order.
#[derive(Debug)]
pub struct DecodedTable {
    /// (field name, declared element type) pairs in schema order
    pub fields: Vec<(String, String)>,
    pub batches: Vec<ColumnBatch>,
    pub num_rows: usize,
}

impl DecodedTable {
    /// Case-insensitive check whether the schema declares a field.
    pub fn has_field(&self, name: &str) -> bool {
        self.fields
            .iter()
            .any(|(n, _)| n.eq_ignore_ascii_case(name))
    }
}

/// Read the Parquet file at `path` into a [`DecodedTable`].
///
/// The file is opened, fully read, and closed within this call.
pub fn read_dataset(path: &Path) -> Result<DecodedTable> {
    let file = File::open(path)
        .map_err(|e| RosterError::SourceNotFound(format!("{}: {}", path.display(), e)))?;

    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .map_err(|e| RosterError::UnsupportedEncoding(format!("invalid parquet file: {}", e)))?;

    let schema = builder.schema().clone();
    let fields: Vec<(String, String)> = schema
        .fields()
        .iter()
        .map(|f| (f.name().clone(), f.data_type().to_string()))
        .collect();

    let index: HashMap<String, usize> = schema
        .fields()
        .iter()
        .enumerate()
        .map(|(i, f)| (f.name().to_lowercase(), i))
        .collect();

    let reader = builder
        .build()
        .map_err(|e| RosterError::UnsupportedEncoding(format!("parquet read failed: {}", e)))?;

    let mut batches = Vec::new();
    let mut num_rows = 0;

    for batch in reader {
        let batch = batch
            .map_err(|e| RosterError::UnsupportedEncoding(format!("batch decode failed: {}", e)))?;

        let mut columns = Vec::with_capacity(batch.num_columns());
        for col in batch.columns() {
            columns.push(decode_column(col)?);
        }

        num_rows += batch.num_rows();
        batches.push(ColumnBatch {
            num_rows: batch.num_rows(),
            columns,
            index: index.clone(),
        });
    }

    debug!(
        "Decoded {} rows in {} batches from {}",
        num_rows,
        batches.len(),
        path.display()
    );

    Ok(DecodedTable {
        fields,
        batches,
        num_rows,
    })
}

fn downcast<T: Array + 'static>(col: &ArrayRef) -> Result<&T> {
    col.as_any()
        .downcast_ref::<T>()
        .ok_or_else(|| RosterError::UnsupportedEncoding("column array type mismatch".to_string()))
}

fn decode_column(col: &ArrayRef) -> Result<Vec<RawValue>> {
    let len = col.len();
    let mut values = Vec::with_capacity(len);

    macro_rules! fill {
        ($arr:expr, $make:expr) => {{
            let arr = $arr;
            for i in 0..len {
                if arr.is_null(i) {
                    values.push(RawValue::Null);
                } else {
                    values.push($make(arr.value(i)));
                }
            }
        }};
    }

    match col.data_type() {
        DataType::Utf8 => fill!(downcast::<StringArray>(col)?, |v: &str| RawValue::Text(
            v.to_string()
        )),
        DataType::LargeUtf8 => fill!(downcast::<LargeStringArray>(col)?, |v: &str| {
            RawValue::Text(v.to_string())
        }),
        DataType::Boolean => fill!(downcast::<BooleanArray>(col)?, RawValue::Bool),
        DataType::Int32 => fill!(downcast::<Int32Array>(col)?, |v: i32| RawValue::Int(
            v as i64
        )),
        DataType::Int64 => fill!(downcast::<Int64Array>(col)?, RawValue::Int),
        DataType::Float32 => fill!(downcast::<Float32Array>(col)?, |v: f32| RawValue::Float(
            v as f64
        )),
        DataType::Float64 => fill!(downcast::<Float64Array>(col)?, RawValue::Float),
        DataType::Decimal128(_, scale) => {
            let divisor = 10f64.powi(*scale as i32);
            fill!(downcast::<Decimal128Array>(col)?, |v: i128| {
                RawValue::Float(v as f64 / divisor)
            })
        }
        DataType::Timestamp(TimeUnit::Second, _) => {
            fill!(downcast::<TimestampSecondArray>(col)?, |v: i64| {
                RawValue::Timestamp(v * 1000)
            })
        }
        DataType::Timestamp(TimeUnit::Millisecond, _) => fill!(
            downcast::<TimestampMillisecondArray>(col)?,
            RawValue::Timestamp
        ),
        DataType::Timestamp(TimeUnit::Microsecond, _) => {
            fill!(downcast::<TimestampMicrosecondArray>(col)?, |v: i64| {
                RawValue::Timestamp(v / 1000)
            })
        }
        DataType::Timestamp(TimeUnit::Nanosecond, _) => {
            fill!(downcast::<TimestampNanosecondArray>(col)?, |v: i64| {
                RawValue::Timestamp(v / 1_000_000)
            })
        }
        DataType::Date32 => fill!(downcast::<Date32Array>(col)?, |v: i32| {
            RawValue::Timestamp(v as i64 * MILLIS_PER_DAY)
        }),
        DataType::Date64 => fill!(downcast::<Date64Array>(col)?, RawValue::Timestamp),
        // No native mapping: fall back to the textual rendering
        _ => {
            for i in 0..len {
                if col.is_null(i) {
                    values.push(RawValue::Null);
                } else {
                    let text = array_value_to_string(col, i).map_err(|e| {
                        RosterError::UnsupportedEncoding(format!(
                            "cannot render {} value: {}",
                            col.data_type(),
                            e
                        ))
                    })?;
                    values.push(RawValue::Text(text));
                }
            }
        }
    }

    Ok(values)
}

#[cfg(test)]
#[path = "decode_test.rs"]
mod decode_test;
