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

//! Row materialization
//!
//! Assembles flat [`UserRecord`]s from decoded column batches. Every field
//! is total: nulls, absent columns, and unparsable dates degrade to
//! documented defaults instead of aborting the row. The one exception is
//! a malformed non-null salary, which fails the whole materialization --
//! bad numeric data is a data-integrity problem worth surfacing.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::data::decode::{DecodedTable, RawValue};
use crate::error::{Result, RosterError};

/// Default for missing or unparsable date fields. Deliberately not "now":
/// results must be reproducible across cache generations.
pub const MIN_TIMESTAMP: DateTime<Utc> = DateTime::<Utc>::MIN_UTC;

/// One decoded user entry. All ten fields are always populated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub gender: String,
    pub country: String,
    pub title: String,
    pub comments: String,
    pub registration_date: DateTime<Utc>,
    pub birth_date: DateTime<Utc>,
    pub salary: f64,
}

/// Materialize the full row set from a decoded table, in stored order.
///
/// Pure function of the decoded column arrays.
pub fn materialize(table: &DecodedTable) -> Result<Vec<UserRecord>> {
    let mut rows = Vec::with_capacity(table.num_rows);

    for batch in &table.batches {
        for i in 0..batch.num_rows {
            let raw = |name: &str| batch.column(name).and_then(|col| col.get(i));

            rows.push(UserRecord {
                first_name: as_text(raw("firstName")),
                last_name: as_text(raw("lastName")),
                email: as_text(raw("email")),
                gender: as_text(raw("gender")),
                country: as_text(raw("country")),
                title: as_text(raw("title")),
                comments: as_text(raw("comments")),
                registration_date: as_datetime(raw("registrationDate")),
                birth_date: as_datetime(raw("birthDate")),
                salary: as_salary(raw("salary"))?,
            });
        }
    }

    Ok(rows)
}

fn as_text(raw: Option<&RawValue>) -> String {
    match raw {
        None | Some(RawValue::Null) => String::new(),
        Some(RawValue::Text(s)) => s.clone(),
        Some(RawValue::Int(v)) => v.to_string(),
        Some(RawValue::Float(v)) => v.to_string(),
        Some(RawValue::Bool(v)) => v.to_string(),
        Some(RawValue::Timestamp(ms)) => DateTime::from_timestamp_millis(*ms)
            .map(|dt| dt.to_rfc3339())
            .unwrap_or_default(),
    }
}

fn as_datetime(raw: Option<&RawValue>) -> DateTime<Utc> {
    match raw {
        Some(RawValue::Timestamp(ms)) | Some(RawValue::Int(ms)) => {
            DateTime::from_timestamp_millis(*ms).unwrap_or(MIN_TIMESTAMP)
        }
        Some(RawValue::Text(s)) => parse_date(s).unwrap_or(MIN_TIMESTAMP),
        _ => MIN_TIMESTAMP,
    }
}

/// Parse a textual date, trying general formats first and the
/// month/day/4-digit-year fallback last (e.g. "4/7/1983").
pub fn parse_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }

    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(dt.and_utc());
        }
    }

    for fmt in ["%Y-%m-%d", "%m/%d/%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(value, fmt) {
            return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
        }
    }

    None
}

fn as_salary(raw: Option<&RawValue>) -> Result<f64> {
    match raw {
        None | Some(RawValue::Null) => Ok(0.0),
        Some(RawValue::Float(v)) => Ok(*v),
        Some(RawValue::Int(v)) => Ok(*v as f64),
        Some(RawValue::Text(s)) => s.trim().parse::<f64>().map_err(|_| {
            RosterError::Materialization(format!("salary value '{}' is not numeric", s))
        }),
        Some(other) => Err(RosterError::Materialization(format!(
            "salary value {:?} is not numeric",
            other
        ))),
    }
}

#[cfg(test)]
#[path = "record_test.rs"]
mod record_test;
