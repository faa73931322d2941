//! Local storage for draw collections.
//!
//! `CacheStore` has two interchangeable implementations chosen by
//! configuration: `FileStore` (read/write JSON files) and
//! `RemoteDocumentStore` (read-only, fetches a published JSON document).
//! `BackupManager` keeps timestamped snapshots of the file store.

pub mod backup;
pub mod store;

use std::path::{Path, PathBuf};

pub use backup::{BackupError, BackupManager};
pub use store::{CacheStore, FileStore, RemoteDocumentStore, StoreError};

/// Path of a game's live collection file inside a data directory.
pub fn collection_file(data_dir: &Path, lottery_id: &str) -> PathBuf {
    data_dir.join(format!("{}.json", lottery_id))
}
