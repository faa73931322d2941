use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;
use thiserror::Error;
use tracing::{debug, info};

use crate::models::LotteryCollection;

use super::collection_file;

/// Snapshot directory name inside the data directory.
const BACKUP_DIR: &str = "backups";

#[derive(Error, Debug)]
pub enum BackupError {
    #[error("Backup I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No snapshot available for {0}")]
    NoSnapshot(String),

    #[error("Snapshot {} is unreadable: {source}", .path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> BackupError + '_ {
    move |source| BackupError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Timestamped copies of each stored collection, taken before it is overwritten.
///
/// Snapshots live at `{data_dir}/backups/{id}/{id}_{timestamp}_{seq}.json`.
/// The fixed-width UTC timestamp makes file-name order equal to age order.
#[derive(Debug, Clone)]
pub struct BackupManager {
    data_dir: PathBuf,
    retention: usize,
}

impl BackupManager {
    pub fn new(data_dir: PathBuf, retention: usize) -> Self {
        Self { data_dir, retention }
    }

    pub fn retention(&self) -> usize {
        self.retention
    }

    fn snapshot_dir(&self, lottery_id: &str) -> PathBuf {
        self.data_dir.join(BACKUP_DIR).join(lottery_id)
    }

    /// Copy the live collection aside and prune old copies.
    ///
    /// Returns `None` when there is nothing stored yet.
    pub fn snapshot(&self, lottery_id: &str) -> Result<Option<PathBuf>, BackupError> {
        let taken = self.copy_live(lottery_id)?;
        if taken.is_some() {
            self.prune(lottery_id)?;
        }
        Ok(taken)
    }

    fn copy_live(&self, lottery_id: &str) -> Result<Option<PathBuf>, BackupError> {
        let live = collection_file(&self.data_dir, lottery_id);
        if !live.exists() {
            debug!(lottery = lottery_id, "Nothing to snapshot");
            return Ok(None);
        }

        let dir = self.snapshot_dir(lottery_id);
        std::fs::create_dir_all(&dir).map_err(io_err(&dir))?;

        let stamp = Utc::now().format("%Y%m%dT%H%M%S%.3fZ");
        let mut seq = 0u32;
        let dest = loop {
            let candidate = dir.join(format!("{}_{}_{:03}.json", lottery_id, stamp, seq));
            if !candidate.exists() {
                break candidate;
            }
            seq += 1;
        };

        std::fs::copy(&live, &dest).map_err(io_err(&dest))?;
        debug!(lottery = lottery_id, path = %dest.display(), "Snapshot taken");
        Ok(Some(dest))
    }

    /// Snapshots for a game, newest first.
    pub fn list(&self, lottery_id: &str) -> Result<Vec<PathBuf>, BackupError> {
        let dir = self.snapshot_dir(lottery_id);
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let prefix = format!("{}_", lottery_id);
        let mut snapshots: Vec<PathBuf> = std::fs::read_dir(&dir)
            .map_err(io_err(&dir))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.extension().is_some_and(|ext| ext == "json")
                    && path
                        .file_name()
                        .and_then(|n| n.to_str())
                        .is_some_and(|n| n.starts_with(&prefix))
            })
            .collect();

        snapshots.sort_by(|a, b| b.file_name().cmp(&a.file_name()));
        Ok(snapshots)
    }

    /// Delete all but the newest `retention` snapshots. Returns how many were removed.
    pub fn prune(&self, lottery_id: &str) -> Result<usize, BackupError> {
        let stale: Vec<PathBuf> = self.list(lottery_id)?.into_iter().skip(self.retention).collect();
        for path in &stale {
            std::fs::remove_file(path).map_err(io_err(path))?;
        }
        if !stale.is_empty() {
            debug!(lottery = lottery_id, removed = stale.len(), "Pruned old snapshots");
        }
        Ok(stale.len())
    }

    /// Put the newest snapshot back in place of the live collection.
    ///
    /// The live collection is snapshotted first, so restoring again swaps back.
    pub fn restore_latest(&self, lottery_id: &str) -> Result<PathBuf, BackupError> {
        let newest = self
            .list(lottery_id)?
            .into_iter()
            .next()
            .ok_or_else(|| BackupError::NoSnapshot(lottery_id.to_string()))?;

        let contents = std::fs::read(&newest).map_err(io_err(&newest))?;
        serde_json::from_slice::<LotteryCollection>(&contents).map_err(|source| BackupError::Corrupt {
            path: newest.clone(),
            source,
        })?;

        if let Some(replaced) = self.copy_live(lottery_id)? {
            debug!(lottery = lottery_id, path = %replaced.display(), "Live collection set aside");
        }

        let live = collection_file(&self.data_dir, lottery_id);
        write_synced(&live, &contents)?;
        self.prune(lottery_id)?;

        info!(lottery = lottery_id, from = %newest.display(), "Collection restored from snapshot");
        Ok(newest)
    }
}

/// Write to a sibling temp file, fsync, then rename over `path`.
fn write_synced(path: &Path, contents: &[u8]) -> Result<(), BackupError> {
    let tmp = path.with_extension("json.tmp");

    let result = (|| -> std::io::Result<()> {
        let mut file = std::fs::File::create(&tmp)?;
        file.write_all(contents)?;
        file.sync_all()?;
        drop(file);
        std::fs::rename(&tmp, path)
    })();

    if let Err(e) = result {
        let _ = std::fs::remove_file(&tmp);
        return Err(io_err(path)(e));
    }
    Ok(())
}
