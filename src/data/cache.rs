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

//! Single-slot row-set cache with sliding and absolute expiration.
//!
//! The service manages exactly one dataset, so there is one slot rather
//! than a keyed store; this is an intentional simplification. Concurrent
//! misses may both run the builder (last write wins) -- the decode is
//! idempotent and side-effect-free, so no single-flight is needed.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;

use crate::data::record::UserRecord;
use crate::error::Result;

struct CacheEntry {
    rows: Arc<Vec<UserRecord>>,
    built_at: Instant,
    last_accessed: Instant,
}

impl CacheEntry {
    fn is_fresh(&self, now: Instant, absolute_ttl: Duration, sliding_ttl: Duration) -> bool {
        now.duration_since(self.built_at) < absolute_ttl
            && now.duration_since(self.last_accessed) < sliding_ttl
    }
}

pub struct RowCache {
    slot: RwLock<Option<CacheEntry>>,
    absolute_ttl: Duration,
    sliding_ttl: Duration,
}

impl RowCache {
    pub fn new(absolute_ttl: Duration, sliding_ttl: Duration) -> Self {
        Self {
            slot: RwLock::new(None),
            absolute_ttl,
            sliding_ttl,
        }
    }

    /// Return the cached row set, building it with `build` on a miss.
    ///
    /// A hit resets the sliding window. The builder runs outside the lock,
    /// so two simultaneous misses may both decode; the later result
    /// replaces the earlier one in the slot.
    pub async fn get_or_build<F, Fut>(&self, build: F) -> Result<Arc<Vec<UserRecord>>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<UserRecord>>>,
    {
        let now = Instant::now();

        {
            let mut slot = self.slot.write().await;
            if let Some(entry) = slot.as_mut() {
                if entry.is_fresh(now, self.absolute_ttl, self.sliding_ttl) {
                    entry.last_accessed = now;
                    return Ok(Arc::clone(&entry.rows));
                }
                debug!("Cache entry expired, rebuilding row set");
                *slot = None;
            }
        }

        let rows = Arc::new(build().await?);

        let built_at = Instant::now();
        let mut slot = self.slot.write().await;
        *slot = Some(CacheEntry {
            rows: Arc::clone(&rows),
            built_at,
            last_accessed: built_at,
        });

        Ok(rows)
    }
}

#[cfg(test)]
#[path = "cache_test.rs"]
mod cache_test;
