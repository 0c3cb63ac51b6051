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

//! In-memory filtering and pagination over the materialized row set.
//!
//! Filtering is a logical AND of every present criterion; absent criteria
//! impose no constraint. Filtered order equals row-set order (no re-sort),
//! and a page past the end yields an empty page with unchanged totals.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::data::record::UserRecord;

/// The optional filter criteria attached to one query.
#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub comments: Option<String>,
    pub title: Option<String>,
    pub gender: Option<String>,
    pub country: Option<String>,
    pub registration_date_from: Option<DateTime<Utc>>,
    pub registration_date_to: Option<DateTime<Utc>>,
    pub birth_date_from: Option<DateTime<Utc>>,
    pub birth_date_to: Option<DateTime<Utc>>,
    pub min_salary: Option<f64>,
    pub max_salary: Option<f64>,
}

/// Paginated query response, shaped for direct JSON serialization.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub total_count: usize,
    pub total_pages: usize,
    pub current_page: usize,
    pub page_size: usize,
}

/// Case-insensitive substring check.
fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn text_contains(value: &str, criterion: &Option<String>) -> bool {
    criterion.as_deref().map_or(true, |c| contains_ci(value, c))
}

fn text_equals(value: &str, criterion: &Option<String>) -> bool {
    criterion
        .as_deref()
        .map_or(true, |c| value.to_lowercase() == c.to_lowercase())
}

fn in_range<T: PartialOrd + Copy>(value: T, from: Option<T>, to: Option<T>) -> bool {
    from.map_or(true, |f| value >= f) && to.map_or(true, |t| value <= t)
}

/// Whether a record satisfies every present criterion.
pub fn matches(record: &UserRecord, filter: &UserFilter) -> bool {
    text_contains(&record.first_name, &filter.first_name)
        && text_contains(&record.last_name, &filter.last_name)
        && text_contains(&record.email, &filter.email)
        && text_contains(&record.comments, &filter.comments)
        && text_contains(&record.title, &filter.title)
        && text_equals(&record.gender, &filter.gender)
        && text_equals(&record.country, &filter.country)
        && in_range(
            record.registration_date,
            filter.registration_date_from,
            filter.registration_date_to,
        )
        && in_range(
            record.birth_date,
            filter.birth_date_from,
            filter.birth_date_to,
        )
        && in_range(record.salary, filter.min_salary, filter.max_salary)
}

/// Filter the row set and slice out one page.
///
/// Assumes `page >= 1` and `page_size >= 1`; the HTTP boundary validates
/// requests before they reach this point.
pub fn run_query(
    rows: &[UserRecord],
    filter: &UserFilter,
    page: usize,
    page_size: usize,
) -> PaginatedResponse<UserRecord> {
    let filtered: Vec<&UserRecord> = rows.iter().filter(|r| matches(r, filter)).collect();

    let total_count = filtered.len();
    let total_pages = total_count.div_ceil(page_size);
    // Saturate: a page far beyond the end must yield an empty page, not
    // an overflow
    let skip = (page - 1).saturating_mul(page_size);

    let data: Vec<UserRecord> = filtered
        .into_iter()
        .skip(skip)
        .take(page_size)
        .cloned()
        .collect();

    PaginatedResponse {
        data,
        total_count,
        total_pages,
        current_page: page,
        page_size,
    }
}

#[cfg(test)]
#[path = "query_test.rs"]
mod query_test;
