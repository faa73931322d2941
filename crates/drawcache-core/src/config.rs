//! Sync tunables and storage selection.
//!
//! All values deserialize with defaults so a partial config file works.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Contests fetched on the first sync of an empty cache.
pub const DEFAULT_WINDOW_SIZE: u32 = 1000;

/// Contests requested concurrently per batch.
pub const DEFAULT_BATCH_SIZE: usize = 5;

/// Pause between batch starts. Keeps the feed's abuse limits happy.
pub const DEFAULT_BATCH_DELAY_MS: u64 = 1000;

/// Snapshots kept per game.
pub const DEFAULT_BACKUP_RETENTION: usize = 7;

/// Attempts per request, including the first.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// First backoff delay; doubles on each retry.
pub const DEFAULT_BASE_DELAY_MS: u64 = 1000;

/// HTTP request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Error, Debug, Clone, PartialEq)]
#[error("invalid sync configuration: {0}")]
pub struct ConfigError(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay_ms: DEFAULT_BASE_DELAY_MS,
        }
    }
}

impl RetryPolicy {
    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }

    /// Delay before retry number `retry` (1-based).
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = 1u64 << retry.saturating_sub(1).min(16);
        Duration::from_millis(self.base_delay_ms.saturating_mul(factor))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub window_size: u32,
    pub batch_size: usize,
    pub batch_delay_ms: u64,
    pub backup_retention: usize,
    pub request_timeout_secs: u64,
    pub retry: RetryPolicy,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
            batch_size: DEFAULT_BATCH_SIZE,
            batch_delay_ms: DEFAULT_BATCH_DELAY_MS,
            backup_retention: DEFAULT_BACKUP_RETENTION,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            retry: RetryPolicy::default(),
        }
    }
}

impl SyncConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window_size == 0 {
            return Err(ConfigError("window_size must be at least 1".into()));
        }
        if self.batch_size == 0 {
            return Err(ConfigError("batch_size must be at least 1".into()));
        }
        if self.retry.max_attempts == 0 {
            return Err(ConfigError("retry.max_attempts must be at least 1".into()));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError("request_timeout_secs must be at least 1".into()));
        }
        Ok(())
    }

    pub fn batch_delay(&self) -> Duration {
        Duration::from_millis(self.batch_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Where collections are read from and written to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum StorageBackend {
    /// One JSON file per game in the data directory.
    #[default]
    Filesystem,
    /// Read-only: `{url}/{id}.json` served over HTTP.
    RemoteDocument { url: String },
}
