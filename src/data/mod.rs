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

//! Data engine: decode, materialize, cache, and query the user dataset.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

pub mod cache;
pub mod decode;
pub mod query;
pub mod record;

use crate::config::Config;
use crate::error::{Result, RosterError};
use cache::RowCache;
use query::{PaginatedResponse, UserFilter};
use record::UserRecord;

pub struct DataEngine {
    dataset_path: PathBuf,
    cache: RowCache,
}

impl DataEngine {
    /// Create the engine, verifying the dataset resolves to a readable
    /// file so a misconfigured path fails at startup rather than on the
    /// first request.
    pub fn new(config: &Config) -> Result<Self> {
        let dataset_path = PathBuf::from(&config.dataset.path);
        if !dataset_path.is_file() {
            return Err(RosterError::SourceNotFound(
                dataset_path.display().to_string(),
            ));
        }

        Ok(Self {
            dataset_path,
            cache: RowCache::new(
                Duration::from_secs(config.cache.absolute_ttl_secs),
                Duration::from_secs(config.cache.sliding_ttl_secs),
            ),
        })
    }

    /// Evaluate one filtered, paginated query against the cached row set.
    pub async fn query_users(
        &self,
        filter: &UserFilter,
        page: usize,
        page_size: usize,
    ) -> Result<PaginatedResponse<UserRecord>> {
        let rows = self.rows().await?;
        Ok(query::run_query(&rows, filter, page, page_size))
    }

    async fn rows(&self) -> Result<Arc<Vec<UserRecord>>> {
        let path = self.dataset_path.clone();

        self.cache
            .get_or_build(|| async move {
                let started = Instant::now();

                // Decode is bounded, local CPU/disk work; keep it off the
                // async worker threads.
                let (table, rows) = tokio::task::spawn_blocking(move || {
                    let table = decode::read_dataset(&path)?;
                    let rows = record::materialize(&table)?;
                    Ok::<_, RosterError>((table, rows))
                })
                .await
                .map_err(|e| RosterError::Internal(e.to_string()))??;

                if !table.has_field("registrationDate") {
                    warn!("Dataset has no registrationDate column, defaulting all rows");
                }

                info!(
                    "Materialized {} rows from {} columns in {}ms",
                    rows.len(),
                    table.fields.len(),
                    started.elapsed().as_millis()
                );

                Ok(rows)
            })
            .await
    }
}
