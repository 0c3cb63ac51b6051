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

//! Roster - read-only query API over a Parquet user dataset
//!
//! Decodes a columnar user-data file into an in-memory row set, caches it
//! with sliding and absolute expiration, and serves filtered, paginated
//! views over a REST interface.

pub mod config;
pub mod data;
pub mod error;
pub mod server;

pub use config::Config;
pub use data::DataEngine;
pub use error::{Result, RosterError};
pub use server::{create_app, start};
