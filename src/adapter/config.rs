//! Adapter configuration.
//!
//! Connection URL plus pool tuning knobs, deserializable from whatever
//! configuration source the embedding application uses.

use crate::adapter::Dialect;
use crate::error::{OrmError, OrmResult};
use serde::{Deserialize, Serialize};

pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;
pub const DEFAULT_MIN_CONNECTIONS: u32 = 1;
pub const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 600;
pub const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 30;

/// Connection settings for one database adapter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdapterConfig {
    /// Connection URL (`mysql://...` or `postgres://...`).
    pub url: String,
    /// Maximum connections in the pool (default: 10).
    pub max_connections: Option<u32>,
    /// Minimum connections kept open (default: 1).
    pub min_connections: Option<u32>,
    /// Idle timeout in seconds (default: 600).
    pub idle_timeout_secs: Option<u64>,
    /// Connection acquire timeout in seconds (default: 30).
    pub acquire_timeout_secs: Option<u64>,
    /// Whether to test connections before use (default: true).
    pub test_before_acquire: Option<bool>,
}

impl AdapterConfig {
    /// Build a config with default pool settings for `url`.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: None,
            min_connections: None,
            idle_timeout_secs: None,
            acquire_timeout_secs: None,
            test_before_acquire: None,
        }
    }

    /// Infer the dialect from the URL scheme.
    pub fn dialect(&self) -> OrmResult<Dialect> {
        let scheme = self.url.split("://").next().unwrap_or_default();
        match scheme {
            "mysql" => Ok(Dialect::MySql),
            "postgres" | "postgresql" => Ok(Dialect::Postgres),
            other => Err(OrmError::connection(format!(
                "unsupported database URL scheme '{}'",
                other
            ))),
        }
    }

    pub fn max_connections_or_default(&self) -> u32 {
        self.max_connections.unwrap_or(DEFAULT_MAX_CONNECTIONS)
    }

    pub fn min_connections_or_default(&self) -> u32 {
        self.min_connections.unwrap_or(DEFAULT_MIN_CONNECTIONS)
    }

    pub fn idle_timeout_or_default(&self) -> u64 {
        self.idle_timeout_secs.unwrap_or(DEFAULT_IDLE_TIMEOUT_SECS)
    }

    pub fn acquire_timeout_or_default(&self) -> u64 {
        self.acquire_timeout_secs
            .unwrap_or(DEFAULT_ACQUIRE_TIMEOUT_SECS)
    }

    pub fn test_before_acquire_or_default(&self) -> bool {
        self.test_before_acquire.unwrap_or(true)
    }

    /// Validate pool settings before opening a pool.
    pub fn validate(&self) -> OrmResult<()> {
        if let Some(max) = self.max_connections {
            if max == 0 {
                return Err(OrmError::connection("max_connections must be greater than 0"));
            }
        }
        if let Some(min) = self.min_connections {
            if min == 0 {
                return Err(OrmError::connection("min_connections must be greater than 0"));
            }
            if let Some(max) = self.max_connections {
                if min > max {
                    return Err(OrmError::connection(format!(
                        "min_connections ({}) cannot exceed max_connections ({})",
                        min, max
                    )));
                }
            }
        }
        Ok(())
    }
}
