//! Incremental synchronization of local draw collections.
//!
//! `GapAnalyzer` decides which contests to request, `BatchFetcher` requests
//! them in paced batches, `merge` folds the results into the held draws, and
//! `SyncOrchestrator` drives the whole cycle and reports on it.

pub mod batch;
pub mod gaps;
pub mod merge;
pub mod orchestrator;
pub mod report;

use thiserror::Error;

use crate::cache::StoreError;

pub use batch::{BatchFetcher, BatchOutcome, ContestFailure, FailureKind};
pub use gaps::GapAnalyzer;
pub use merge::{merge, MergeOutcome};
pub use orchestrator::SyncOrchestrator;
pub use report::{SyncReport, SyncResult, SyncState};

/// Reasons a sync cycle could not run at all.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Unknown lottery: {0}")]
    UnknownVariant(String),

    #[error("A sync for {0} is already running")]
    AlreadyRunning(String),

    #[error("Failed to load local collection for {lottery}")]
    Load {
        lottery: String,
        #[source]
        source: StoreError,
    },
}
