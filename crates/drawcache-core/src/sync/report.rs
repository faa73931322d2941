use std::path::PathBuf;

use serde::Serialize;

use crate::models::LotteryCollection;

use super::batch::ContestFailure;

/// Where a variant's sync cycle currently is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SyncState {
    Idle,
    LoadingLocal,
    ResolvingRemoteLatest,
    AnalyzingGaps,
    UpToDate,
    Fetching { contests: usize },
    Merging,
    BackingUp,
    Persisting,
    Done,
    Failed(String),
}

impl SyncState {
    /// A cycle is in flight.
    pub fn is_active(&self) -> bool {
        !matches!(self, SyncState::Idle | SyncState::Done | SyncState::Failed(_))
    }
}

impl std::fmt::Display for SyncState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncState::Idle => write!(f, "idle"),
            SyncState::LoadingLocal => write!(f, "loading local collection"),
            SyncState::ResolvingRemoteLatest => write!(f, "resolving latest contest"),
            SyncState::AnalyzingGaps => write!(f, "analyzing gaps"),
            SyncState::UpToDate => write!(f, "up to date"),
            SyncState::Fetching { contests } => write!(f, "fetching {} contests", contests),
            SyncState::Merging => write!(f, "merging"),
            SyncState::BackingUp => write!(f, "backing up"),
            SyncState::Persisting => write!(f, "persisting"),
            SyncState::Done => write!(f, "done"),
            SyncState::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}

/// Summary of one sync cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyncReport {
    pub lottery_id: String,
    pub success: bool,
    pub up_to_date: bool,
    pub total_draws: usize,
    pub new_draws: usize,
    pub latest_contest: Option<u32>,
    pub remote_latest: Option<u32>,
    pub failures: Vec<ContestFailure>,
    /// Contests whose refetched payload differed from the stored record (stored kept).
    pub conflicts: Vec<u32>,
    pub backup: Option<PathBuf>,
    pub error: Option<String>,
}

impl SyncReport {
    fn base(collection: &LotteryCollection) -> Self {
        Self {
            lottery_id: collection.metadata.lottery_type.clone(),
            success: true,
            up_to_date: false,
            total_draws: collection.len(),
            new_draws: 0,
            latest_contest: collection.latest_contest(),
            remote_latest: None,
            failures: Vec::new(),
            conflicts: Vec::new(),
            backup: None,
            error: None,
        }
    }

    pub fn up_to_date(collection: &LotteryCollection, remote_latest: u32) -> Self {
        Self {
            up_to_date: true,
            remote_latest: Some(remote_latest),
            ..Self::base(collection)
        }
    }

    /// The cycle was abandoned; `kept` is the collection still in effect.
    pub fn failed(kept: &LotteryCollection, error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            ..Self::base(kept)
        }
    }

    pub fn updated(collection: &LotteryCollection, new_draws: usize, remote_latest: u32) -> Self {
        Self {
            new_draws,
            remote_latest: Some(remote_latest),
            ..Self::base(collection)
        }
    }
}

impl std::fmt::Display for SyncReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let latest = self
            .latest_contest
            .map(|c| c.to_string())
            .unwrap_or_else(|| "-".to_string());

        if !self.success {
            return write!(
                f,
                "{}: FAILED - {} ({} draws kept, latest {})",
                self.lottery_id,
                self.error.as_deref().unwrap_or("unknown error"),
                self.total_draws,
                latest
            );
        }

        if self.up_to_date && self.new_draws == 0 {
            write!(f, "{}: up to date ({} draws, latest {})", self.lottery_id, self.total_draws, latest)?;
        } else {
            write!(
                f,
                "{}: +{} draws ({} total, latest {})",
                self.lottery_id, self.new_draws, self.total_draws, latest
            )?;
        }
        if !self.failures.is_empty() {
            let contests: Vec<String> = self.failures.iter().map(|f| f.contest.to_string()).collect();
            write!(f, ", {} unavailable: {}", self.failures.len(), contests.join(", "))?;
        }
        Ok(())
    }
}

/// A finished cycle: its report and the collection now in effect.
#[derive(Debug, Clone)]
pub struct SyncResult {
    pub report: SyncReport,
    pub collection: LotteryCollection,
}
