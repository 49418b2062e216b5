//! Configuration management for the cart.
//!
//! Loads configuration from environment variables with sensible defaults.

use crate::snapshot::SNAPSHOT_KEY;
use go_marketplace_runtime::StoreConfig;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Cart configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct CartConfig {
    /// Directory used by file-backed storage
    pub storage_dir: PathBuf,
    /// Key the snapshot is stored under
    pub storage_key: String,
    /// How long a mutation waits for storage to acknowledge its snapshot
    pub save_timeout: Duration,
    /// How long shutdown waits for in-flight writes
    pub shutdown_timeout: Duration,
    /// Log filter used when `RUST_LOG` is not set
    pub log_level: String,
}

impl CartConfig {
    /// Load configuration from environment variables
    ///
    /// Missing or unparsable values fall back to the defaults.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            storage_dir: env::var("CART_STORAGE_DIR")
                .map_or(defaults.storage_dir, PathBuf::from),
            storage_key: env::var("CART_STORAGE_KEY").unwrap_or(defaults.storage_key),
            save_timeout: env::var("CART_SAVE_TIMEOUT_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map_or(defaults.save_timeout, Duration::from_millis),
            shutdown_timeout: env::var("CART_SHUTDOWN_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map_or(defaults.shutdown_timeout, Duration::from_secs),
            log_level: env::var("RUST_LOG").unwrap_or(defaults.log_level),
        }
    }

    /// Use a different storage key
    #[must_use]
    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    /// Use a different save timeout
    #[must_use]
    pub const fn with_save_timeout(mut self, timeout: Duration) -> Self {
        self.save_timeout = timeout;
        self
    }

    /// Runtime configuration for the store backing the cart
    #[must_use]
    pub const fn store_config(&self) -> StoreConfig {
        StoreConfig::new(16, self.shutdown_timeout)
    }
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            storage_dir: PathBuf::from(".go-marketplace"),
            storage_key: SNAPSHOT_KEY.to_string(),
            save_timeout: Duration::from_millis(5000),
            shutdown_timeout: Duration::from_secs(5),
            log_level: "info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CartConfig::default();

        assert_eq!(config.storage_key, "@GoMarketplace:products");
        assert_eq!(config.save_timeout, Duration::from_secs(5));
        assert_eq!(config.store_config().default_shutdown_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_builders() {
        let config = CartConfig::default()
            .with_storage_key("@Test:cart")
            .with_save_timeout(Duration::from_millis(50));

        assert_eq!(config.storage_key, "@Test:cart");
        assert_eq!(config.save_timeout, Duration::from_millis(50));
    }
}
