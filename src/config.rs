use crate::error::{Result, RosterError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub dataset: DatasetConfig,
    pub cache: CacheConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// Path to the Parquet file holding the user records
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Absolute lifetime of a decoded row set, in seconds
    pub absolute_ttl_secs: u64,
    /// Sliding window reset on each access, in seconds
    pub sliding_ttl_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
            },
            dataset: DatasetConfig {
                path: "./userdata.parquet".to_string(),
            },
            cache: CacheConfig {
                absolute_ttl_secs: 30 * 60,
                sliding_ttl_secs: 10 * 60,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
            },
        }
    }
}

impl Config {
    pub fn from_file(path: PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| {
            RosterError::Config(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| RosterError::Config(format!("Failed to parse config file: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(RosterError::Config("Server port cannot be 0".to_string()));
        }

        if self.dataset.path.trim().is_empty() {
            return Err(RosterError::Config(
                "Dataset path cannot be empty".to_string(),
            ));
        }

        if self.cache.absolute_ttl_secs == 0 || self.cache.sliding_ttl_secs == 0 {
            return Err(RosterError::Config(
                "Cache TTLs must be greater than 0".to_string(),
            ));
        }

        if self.cache.sliding_ttl_secs > self.cache.absolute_ttl_secs {
            return Err(RosterError::Config(
                "Sliding TTL cannot exceed absolute TTL".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;
