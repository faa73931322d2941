//! Local cache of lottery draw results.
//!
//! Keeps one JSON collection per game and brings it up to date against the
//! public results feed by fetching only the contests it is missing.

pub mod api;
pub mod cache;
pub mod config;
pub mod models;
pub mod sync;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use api::{DrawClient, DrawSource, FetchError};
pub use cache::{BackupManager, CacheStore, FileStore, RemoteDocumentStore};
pub use config::{RetryPolicy, StorageBackend, SyncConfig};
pub use models::{DrawRecord, LotteryCollection, LotteryVariant, ValidationError};
pub use sync::{SyncError, SyncOrchestrator, SyncReport, SyncResult, SyncState};
