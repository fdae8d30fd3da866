//! Storefront configuration module.
//!
//! Configuration is loaded from environment variables with fallback to defaults.
//!
//! | Variable                        | Default                  |
//! |---------------------------------|--------------------------|
//! | `STOREFRONT_DATABASE_PATH`      | `storefront.db`          |
//! | `STOREFRONT_DB_MAX_CONNECTIONS` | `5`                      |
//! | `STOREFRONT_LOG`                | `info,storefront_db=debug` |

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

use crate::pool::DbConfig;

const DEFAULT_DATABASE_PATH: &str = "storefront.db";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_LOG_FILTER: &str = "info,storefront_db=debug";

/// Storefront configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorefrontConfig {
    /// SQLite database file
    pub database_path: PathBuf,

    /// Pool size upper bound
    pub max_connections: u32,

    /// `tracing_subscriber::EnvFilter` directive string
    pub log_filter: String,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_path = lookup("STOREFRONT_DATABASE_PATH")
            .unwrap_or_else(|| DEFAULT_DATABASE_PATH.to_string());

        if database_path.trim().is_empty() {
            return Err(ConfigError::MissingRequired("STOREFRONT_DATABASE_PATH".to_string()));
        }

        let max_connections = match lookup("STOREFRONT_DB_MAX_CONNECTIONS") {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| ConfigError::InvalidValue("STOREFRONT_DB_MAX_CONNECTIONS".to_string()))?,
            None => DEFAULT_MAX_CONNECTIONS,
        };

        let log_filter = lookup("STOREFRONT_LOG").unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

        Ok(StorefrontConfig {
            database_path: PathBuf::from(database_path),
            max_connections,
            log_filter,
        })
    }

    /// Pool settings derived from this configuration.
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(self.database_path.clone()).max_connections(self.max_connections)
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<StorefrontConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        StorefrontConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.database_path, PathBuf::from("storefront.db"));
        assert_eq!(config.max_connections, 5);
        assert_eq!(config.log_filter, "info,storefront_db=debug");
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("STOREFRONT_DATABASE_PATH", "/var/lib/storefront/offers.db"),
            ("STOREFRONT_DB_MAX_CONNECTIONS", "12"),
            ("STOREFRONT_LOG", "warn"),
        ])
        .unwrap();

        assert_eq!(config.database_path, PathBuf::from("/var/lib/storefront/offers.db"));
        assert_eq!(config.max_connections, 12);
        assert_eq!(config.log_filter, "warn");

        let db = config.db_config();
        assert_eq!(db.max_connections, 12);
        assert_eq!(db.database_path, config.database_path);
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            load(&[("STOREFRONT_DB_MAX_CONNECTIONS", "many")]),
            Err(ConfigError::InvalidValue(_))
        ));
        assert!(matches!(
            load(&[("STOREFRONT_DB_MAX_CONNECTIONS", "0")]),
            Err(ConfigError::InvalidValue(_))
        ));
        assert!(matches!(
            load(&[("STOREFRONT_DATABASE_PATH", "  ")]),
            Err(ConfigError::MissingRequired(_))
        ));
    }
}
