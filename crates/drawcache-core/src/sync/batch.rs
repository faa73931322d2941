use std::time::Duration;

use futures::future::join_all;
use serde::Serialize;
use tracing::{debug, warn};

use crate::api::{DrawSource, FetchError};
use crate::config::{SyncConfig, DEFAULT_BATCH_DELAY_MS, DEFAULT_BATCH_SIZE};
use crate::models::{DrawRecord, LotteryVariant};

/// Why a contest could not be fetched this cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Network, timeout, 429 or 5xx after all retries.
    Transient,
    /// The feed answered, but the payload was unusable.
    Validation,
    /// The feed does not know the contest.
    NotFound,
}

impl From<&FetchError> for FailureKind {
    fn from(err: &FetchError) -> Self {
        match err {
            FetchError::NotFound(_) => FailureKind::NotFound,
            FetchError::Validation(_) | FetchError::InvalidResponse(_) => FailureKind::Validation,
            FetchError::RateLimited | FetchError::ServerError(_) | FetchError::NetworkError(_) => {
                FailureKind::Transient
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContestFailure {
    pub contest: u32,
    pub kind: FailureKind,
    pub message: String,
}

#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    pub records: Vec<DrawRecord>,
    pub failures: Vec<ContestFailure>,
    pub batches: usize,
}

/// Fetches contests in fixed-size concurrent batches with a pause between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchFetcher {
    batch_size: usize,
    delay: Duration,
}

impl Default for BatchFetcher {
    fn default() -> Self {
        Self::new(DEFAULT_BATCH_SIZE, Duration::from_millis(DEFAULT_BATCH_DELAY_MS))
    }
}

impl BatchFetcher {
    pub fn new(batch_size: usize, delay: Duration) -> Self {
        Self {
            batch_size: batch_size.max(1),
            delay,
        }
    }

    pub fn from_config(config: &SyncConfig) -> Self {
        Self::new(config.batch_size, config.batch_delay())
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Fetch every contest in `contests`.
    ///
    /// A batch's requests all run at once and are awaited together before the
    /// delay and the next batch. Failed contests are reported, never fatal.
    pub async fn fetch(
        &self,
        source: &dyn DrawSource,
        variant: &LotteryVariant,
        contests: &[u32],
    ) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();
        let total = contests.len().div_ceil(self.batch_size);

        for (index, chunk) in contests.chunks(self.batch_size).enumerate() {
            if index > 0 && !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            debug!(
                lottery = %variant.id,
                batch = index + 1,
                of = total,
                first = chunk[0],
                size = chunk.len(),
                "Fetching batch"
            );

            let futures: Vec<_> = chunk
                .iter()
                .map(|&contest| async move { (contest, source.fetch_contest(variant, contest).await) })
                .collect();

            for (contest, result) in join_all(futures).await {
                match result {
                    Ok(record) => outcome.records.push(record),
                    Err(e) => {
                        warn!(lottery = %variant.id, contest = contest, error = %e, "Contest unavailable");
                        outcome.failures.push(ContestFailure {
                            contest,
                            kind: FailureKind::from(&e),
                            message: e.to_string(),
                        });
                    }
                }
            }
            outcome.batches += 1;
        }

        outcome
    }
}
