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

use thiserror::Error;

pub type Result<T> = std::result::Result<T, RosterError>;

#[derive(Error, Debug)]
pub enum RosterError {
    #[error("Configuration error: {0}")]
    Config(String),

    /// The dataset file is missing or unreadable.
    #[error("Dataset not found: {0}")]
    SourceNotFound(String),

    /// A column value type that cannot be decoded under any fallback.
    #[error("Unsupported column encoding: {0}")]
    UnsupportedEncoding(String),

    /// A non-null value in a strictly-typed field could not be coerced.
    #[error("Materialization error: {0}")]
    Materialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for RosterError {
    fn from(err: serde_json::Error) -> Self {
        RosterError::Serialization(err.to_string())
    }
}
