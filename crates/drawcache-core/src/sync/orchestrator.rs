//! One synchronization cycle per lottery game.
//!
//! load local → resolve remote latest → find gaps → fetch in batches → merge
//! → snapshot → save. Nothing is written until the fetch and merge are
//! complete, so an interrupted cycle leaves the store as it was.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use tracing::{debug, error, info, warn};

use crate::api::DrawSource;
use crate::cache::{BackupManager, CacheStore};
use crate::config::SyncConfig;
use crate::models::{LotteryCollection, LotteryVariant};

use super::batch::BatchFetcher;
use super::gaps::GapAnalyzer;
use super::merge::merge;
use super::report::{SyncReport, SyncResult, SyncState};
use super::SyncError;

type StateMap = Mutex<HashMap<String, SyncState>>;

fn lock_states(states: &StateMap) -> MutexGuard<'_, HashMap<String, SyncState>> {
    states.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Marks a variant busy for the lifetime of one cycle.
struct CycleGuard<'a> {
    states: &'a StateMap,
    lottery_id: String,
}

impl CycleGuard<'_> {
    fn set(&self, state: SyncState) {
        debug!(lottery = %self.lottery_id, state = %state, "Sync state");
        lock_states(self.states).insert(self.lottery_id.clone(), state);
    }
}

impl Drop for CycleGuard<'_> {
    fn drop(&mut self) {
        let mut states = lock_states(self.states);
        if let Some(state) = states.get_mut(&self.lottery_id) {
            if state.is_active() {
                warn!(lottery = %self.lottery_id, state = %state, "Sync cycle dropped mid-flight");
                *state = SyncState::Failed("interrupted".to_string());
            }
        }
    }
}

/// Runs sync cycles for a fixed set of games.
///
/// Holds no global state: build one from the configured variants and pass it
/// to whatever schedules syncs. At most one cycle per game runs at a time.
pub struct SyncOrchestrator {
    variants: Vec<LotteryVariant>,
    source: Arc<dyn DrawSource>,
    store: Arc<dyn CacheStore>,
    backups: Option<BackupManager>,
    gaps: GapAnalyzer,
    fetcher: BatchFetcher,
    states: StateMap,
}

impl SyncOrchestrator {
    pub fn new(
        variants: Vec<LotteryVariant>,
        source: Arc<dyn DrawSource>,
        store: Arc<dyn CacheStore>,
        config: &SyncConfig,
    ) -> Self {
        Self {
            variants,
            source,
            store,
            backups: None,
            gaps: GapAnalyzer::new(config.window_size),
            fetcher: BatchFetcher::from_config(config),
            states: Mutex::new(HashMap::new()),
        }
    }

    /// Snapshot the stored collection before every overwrite.
    pub fn with_backups(mut self, backups: BackupManager) -> Self {
        self.backups = Some(backups);
        self
    }

    pub fn variants(&self) -> &[LotteryVariant] {
        &self.variants
    }

    pub fn variant(&self, lottery_id: &str) -> Option<&LotteryVariant> {
        self.variants.iter().find(|v| v.id == lottery_id)
    }

    pub fn state(&self, lottery_id: &str) -> SyncState {
        lock_states(&self.states)
            .get(lottery_id)
            .cloned()
            .unwrap_or(SyncState::Idle)
    }

    /// Current stored collection, without syncing.
    pub async fn load(&self, lottery_id: &str) -> Result<LotteryCollection, SyncError> {
        let variant = self
            .variant(lottery_id)
            .ok_or_else(|| SyncError::UnknownVariant(lottery_id.to_string()))?;
        self.store
            .load(variant)
            .await
            .map(|c| normalize(variant, c))
            .map_err(|source| SyncError::Load {
                lottery: variant.id.clone(),
                source,
            })
    }

    /// Sync every configured game, one after another.
    pub async fn sync_all(&self) -> Vec<Result<SyncResult, SyncError>> {
        let mut results = Vec::with_capacity(self.variants.len());
        for variant in &self.variants {
            results.push(self.sync(&variant.id).await);
        }
        results
    }

    fn begin(&self, lottery_id: &str) -> Result<CycleGuard<'_>, SyncError> {
        let mut states = lock_states(&self.states);
        if states.get(lottery_id).is_some_and(SyncState::is_active) {
            return Err(SyncError::AlreadyRunning(lottery_id.to_string()));
        }
        states.insert(lottery_id.to_string(), SyncState::LoadingLocal);
        Ok(CycleGuard {
            states: &self.states,
            lottery_id: lottery_id.to_string(),
        })
    }

    /// Run one cycle for `lottery_id`.
    ///
    /// `Err` only for an unknown game, a cycle already in flight, or an
    /// unreadable local store. A failed latest-draw lookup or a failed save
    /// returns `Ok` with a failed report and the prior collection untouched.
    pub async fn sync(&self, lottery_id: &str) -> Result<SyncResult, SyncError> {
        let variant = self
            .variant(lottery_id)
            .ok_or_else(|| SyncError::UnknownVariant(lottery_id.to_string()))?;
        let cycle = self.begin(&variant.id)?;
        info!(lottery = %variant.id, "Sync started");

        let prior = match self.store.load(variant).await {
            Ok(collection) => normalize(variant, collection),
            Err(e) => {
                error!(lottery = %variant.id, location = %self.store.location(variant), error = %e, "Failed to load local collection");
                cycle.set(SyncState::Failed(e.to_string()));
                return Err(SyncError::Load {
                    lottery: variant.id.clone(),
                    source: e,
                });
            }
        };

        cycle.set(SyncState::ResolvingRemoteLatest);
        let latest = match self.source.fetch_latest(variant).await {
            Ok(record) => record,
            Err(e) => {
                let reason = format!("latest draw lookup failed: {}", e);
                error!(lottery = %variant.id, error = %e, "Cannot determine remote frontier, keeping local collection");
                cycle.set(SyncState::Failed(reason.clone()));
                return Ok(SyncResult {
                    report: SyncReport::failed(&prior, reason),
                    collection: prior,
                });
            }
        };
        let remote_latest = latest.contest();

        cycle.set(SyncState::AnalyzingGaps);
        let missing = self.gaps.missing(&prior.contest_numbers(), remote_latest);
        if missing.is_empty() {
            cycle.set(SyncState::UpToDate);
            cycle.set(SyncState::Done);
            info!(lottery = %variant.id, draws = prior.len(), latest = remote_latest, "Already up to date");
            return Ok(SyncResult {
                report: SyncReport::up_to_date(&prior, remote_latest),
                collection: prior,
            });
        }

        let window = self.gaps.window_size();
        if prior.latest_contest().is_some_and(|held| remote_latest > held.saturating_add(window)) {
            warn!(
                lottery = %variant.id,
                remote_latest = remote_latest,
                window = window,
                "Feed is far ahead of the local collection, catching up one window at a time"
            );
        }

        // The latest draw is already in hand
        let to_fetch: Vec<u32> = missing.iter().copied().filter(|&c| c != remote_latest).collect();
        info!(
            lottery = %variant.id,
            missing = missing.len(),
            first = missing[0],
            last = missing[missing.len() - 1],
            "Fetching missing contests"
        );

        cycle.set(SyncState::Fetching { contests: missing.len() });
        let mut fetched = self.fetcher.fetch(self.source.as_ref(), variant, &to_fetch).await;
        if to_fetch.len() < missing.len() {
            fetched.records.push(latest);
        }

        cycle.set(SyncState::Merging);
        let merged = merge(prior.draws(), &fetched.records);
        if !merged.conflicts.is_empty() {
            warn!(lottery = %variant.id, contests = ?merged.conflicts, "Feed returned different data for stored contests, keeping stored");
        }

        if merged.added == 0 {
            cycle.set(SyncState::Done);
            warn!(lottery = %variant.id, failed = fetched.failures.len(), "No new draws retrieved, nothing written");
            let mut report = SyncReport::updated(&prior, 0, remote_latest);
            report.failures = fetched.failures;
            report.conflicts = merged.conflicts;
            return Ok(SyncResult {
                report,
                collection: prior,
            });
        }

        let updated = LotteryCollection::from_merged(&variant.id, merged.draws, Utc::now());

        cycle.set(SyncState::BackingUp);
        let backup = self.snapshot(variant).await;

        cycle.set(SyncState::Persisting);
        if let Err(e) = self.store.save(variant, &updated).await {
            let reason = format!("failed to persist collection: {}", e);
            error!(lottery = %variant.id, location = %self.store.location(variant), error = %e, "Persist failed, keeping previous collection");
            cycle.set(SyncState::Failed(reason.clone()));
            let mut report = SyncReport::failed(&prior, reason);
            report.remote_latest = Some(remote_latest);
            report.failures = fetched.failures;
            return Ok(SyncResult {
                report,
                collection: prior,
            });
        }

        cycle.set(SyncState::Done);
        let mut report = SyncReport::updated(&updated, merged.added, remote_latest);
        report.up_to_date = fetched.failures.is_empty() && updated.latest_contest() >= Some(remote_latest);
        report.failures = fetched.failures;
        report.conflicts = merged.conflicts;
        report.backup = backup;
        info!(
            lottery = %variant.id,
            added = report.new_draws,
            total = report.total_draws,
            failed = report.failures.len(),
            "Sync complete"
        );

        Ok(SyncResult {
            report,
            collection: updated,
        })
    }

    /// Take a snapshot if backups are enabled. Failures are logged, never fatal.
    async fn snapshot(&self, variant: &LotteryVariant) -> Option<PathBuf> {
        let backups = self.backups.clone()?;
        let lottery_id = variant.id.clone();

        match tokio::task::spawn_blocking(move || backups.snapshot(&lottery_id)).await {
            Ok(Ok(path)) => path,
            Ok(Err(e)) => {
                warn!(lottery = %variant.id, error = %e, "Snapshot failed, continuing without backup");
                None
            }
            Err(e) => {
                warn!(lottery = %variant.id, error = %e, "Snapshot task failed, continuing without backup");
                None
            }
        }
    }
}

/// Sort and de-duplicate a loaded collection that breaks the ordering rules.
fn normalize(variant: &LotteryVariant, collection: LotteryCollection) -> LotteryCollection {
    if collection.is_well_formed() {
        return collection;
    }

    warn!(
        lottery = %variant.id,
        draws = collection.len(),
        recorded = collection.metadata.total_draws,
        "Stored collection out of order or duplicated, normalizing"
    );
    let last_update = collection.metadata.last_update;
    let merged = merge(collection.draws(), &[]);
    let mut fixed = LotteryCollection::from_merged(&variant.id, merged.draws, Utc::now());
    fixed.metadata.last_update = last_update;
    fixed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::FetchError;
    use crate::cache::{FileStore, StoreError};
    use crate::models::{DrawRecord, ValidationError};
    use crate::sync::batch::FailureKind;
    use crate::test_support::{lotofacil, sample_draw, FakeDrawSource};
    use std::collections::HashSet;
    use tempfile::TempDir;
    use tokio::sync::Notify;

    fn fast_config() -> SyncConfig {
        SyncConfig {
            batch_delay_ms: 0,
            ..Default::default()
        }
    }

    fn orchestrator(source: Arc<FakeDrawSource>, store: Arc<dyn CacheStore>) -> SyncOrchestrator {
        SyncOrchestrator::new(vec![lotofacil()], source, store, &fast_config())
    }

    async fn seeded_store(tmp: &TempDir, contests: impl Iterator<Item = u32>) -> Arc<FileStore> {
        let variant = lotofacil();
        let store = Arc::new(FileStore::new(tmp.path().to_path_buf()).unwrap());
        let draws = contests.map(|c| sample_draw(&variant, c)).collect();
        let collection = LotteryCollection::from_merged("lotofacil", draws, Utc::now());
        store.save(&variant, &collection).await.unwrap();
        store
    }

    fn contests(collection: &LotteryCollection) -> Vec<u32> {
        collection.draws().iter().map(DrawRecord::contest).collect()
    }

    /// Store whose saves always fail.
    struct BrokenSaveStore(FileStore);

    #[async_trait::async_trait]
    impl CacheStore for BrokenSaveStore {
        fn location(&self, variant: &LotteryVariant) -> String {
            self.0.location(variant)
        }

        async fn load(&self, variant: &LotteryVariant) -> Result<LotteryCollection, StoreError> {
            self.0.load(variant).await
        }

        async fn save(&self, variant: &LotteryVariant, _collection: &LotteryCollection) -> Result<(), StoreError> {
            Err(StoreError::ReadOnly(self.0.location(variant)))
        }
    }

    #[tokio::test]
    async fn test_lotofacil_scenario_fills_hole_and_tail() {
        let tmp = TempDir::new().unwrap();
        let store = seeded_store(&tmp, (1..=3558).filter(|&c| c != 3200)).await;
        let source = Arc::new(FakeDrawSource::new(lotofacil(), 3560));
        let orch = orchestrator(source.clone(), store.clone());

        let result = orch.sync("lotofacil").await.unwrap();

        assert!(result.report.success);
        assert!(result.report.up_to_date);
        assert_eq!(result.report.new_draws, 3);
        assert_eq!(result.collection.len(), 3560);
        assert_eq!(contests(&result.collection), (1..=3560).collect::<Vec<_>>());

        // 3560 came with the latest lookup
        assert_eq!(source.requested(), HashSet::from([3200, 3559]));

        let stored = store.load(&lotofacil()).await.unwrap();
        assert_eq!(stored, result.collection);
        assert_eq!(orch.state("lotofacil"), SyncState::Done);
    }

    #[tokio::test]
    async fn test_empty_cache_backfills_window() {
        let tmp = TempDir::new().unwrap();
        let store = Arc::new(FileStore::new(tmp.path().to_path_buf()).unwrap());
        let source = Arc::new(FakeDrawSource::new(lotofacil(), 2500));
        let config = SyncConfig {
            window_size: 20,
            batch_delay_ms: 0,
            ..Default::default()
        };
        let orch = SyncOrchestrator::new(vec![lotofacil()], source, store, &config);

        let result = orch.sync("lotofacil").await.unwrap();
        assert_eq!(contests(&result.collection), (2481..=2500).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_second_run_is_noop_and_byte_identical() {
        let tmp = TempDir::new().unwrap();
        let store = seeded_store(&tmp, 1..=10).await;
        let source = Arc::new(FakeDrawSource::new(lotofacil(), 12));
        let orch = orchestrator(source, store.clone());

        orch.sync("lotofacil").await.unwrap();
        let first = std::fs::read(store.collection_path("lotofacil")).unwrap();

        let again = orch.sync("lotofacil").await.unwrap();
        let second = std::fs::read(store.collection_path("lotofacil")).unwrap();

        assert!(again.report.up_to_date);
        assert_eq!(again.report.new_draws, 0);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_latest_lookup_failure_keeps_prior() {
        let tmp = TempDir::new().unwrap();
        let store = seeded_store(&tmp, 1..=5).await;
        let before = std::fs::read(store.collection_path("lotofacil")).unwrap();
        let source = Arc::new(
            FakeDrawSource::new(lotofacil(), 9).latest_failing(|| FetchError::ServerError("503".into())),
        );
        let orch = orchestrator(source.clone(), store.clone());

        let result = orch.sync("lotofacil").await.unwrap();

        assert!(!result.report.success);
        assert!(result.report.error.as_deref().unwrap().contains("latest draw lookup failed"));
        assert_eq!(contests(&result.collection), vec![1, 2, 3, 4, 5]);
        assert!(source.calls().is_empty());
        assert_eq!(source.latest_calls(), 1);
        assert_eq!(std::fs::read(store.collection_path("lotofacil")).unwrap(), before);
        assert!(matches!(orch.state("lotofacil"), SyncState::Failed(_)));
    }

    #[tokio::test]
    async fn test_partial_failures_are_reported_and_retried_next_cycle() {
        let tmp = TempDir::new().unwrap();
        let store = seeded_store(&tmp, 1..=5).await;
        let flaky = Arc::new(
            FakeDrawSource::new(lotofacil(), 9)
                .failing(7, || FetchError::ServerError("502".into()))
                .failing(8, || ValidationError::WrongCount { expected: 15, actual: 14 }.into()),
        );
        let orch = orchestrator(flaky, store.clone());

        let result = orch.sync("lotofacil").await.unwrap();
        assert!(result.report.success);
        assert!(!result.report.up_to_date);
        assert_eq!(contests(&result.collection), vec![1, 2, 3, 4, 5, 6, 9]);
        let failed: Vec<(u32, FailureKind)> = result.report.failures.iter().map(|f| (f.contest, f.kind)).collect();
        assert_eq!(failed, vec![(7, FailureKind::Transient), (8, FailureKind::Validation)]);

        // Next cycle sees 7 and 8 as holes
        let healthy = Arc::new(FakeDrawSource::new(lotofacil(), 9));
        let orch = orchestrator(healthy.clone(), store);
        let result = orch.sync("lotofacil").await.unwrap();
        assert_eq!(healthy.requested(), HashSet::from([7, 8]));
        assert_eq!(contests(&result.collection), (1..=9).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_persist_failure_returns_prior() {
        let tmp = TempDir::new().unwrap();
        let seeded = seeded_store(&tmp, 1..=3).await;
        let store: Arc<dyn CacheStore> = Arc::new(BrokenSaveStore((*seeded).clone()));
        let source = Arc::new(FakeDrawSource::new(lotofacil(), 6));
        let orch = orchestrator(source, store);

        let result = orch.sync("lotofacil").await.unwrap();
        assert!(!result.report.success);
        assert_eq!(contests(&result.collection), vec![1, 2, 3]);
        assert_eq!(seeded.load(&lotofacil()).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_all_fetches_failing_writes_nothing() {
        let tmp = TempDir::new().unwrap();
        let store = seeded_store(&tmp, [1, 2, 3, 5].into_iter()).await;
        let before = std::fs::read(store.collection_path("lotofacil")).unwrap();
        let source = Arc::new(FakeDrawSource::new(lotofacil(), 5).failing(4, || FetchError::RateLimited));
        let orch = orchestrator(source, store.clone())
            .with_backups(BackupManager::new(tmp.path().to_path_buf(), 7));

        let result = orch.sync("lotofacil").await.unwrap();
        assert!(result.report.success);
        assert_eq!(result.report.new_draws, 0);
        assert_eq!(result.report.failures.len(), 1);
        assert!(result.report.backup.is_none());
        assert_eq!(std::fs::read(store.collection_path("lotofacil")).unwrap(), before);
        assert!(!tmp.path().join("backups").exists());
    }

    #[tokio::test]
    async fn test_snapshot_taken_before_overwrite() {
        let tmp = TempDir::new().unwrap();
        let store = seeded_store(&tmp, 1..=3).await;
        let before = std::fs::read(store.collection_path("lotofacil")).unwrap();
        let source = Arc::new(FakeDrawSource::new(lotofacil(), 4));
        let orch = orchestrator(source, store).with_backups(BackupManager::new(tmp.path().to_path_buf(), 7));

        let result = orch.sync("lotofacil").await.unwrap();
        let backup = result.report.backup.expect("snapshot path");
        assert_eq!(std::fs::read(backup).unwrap(), before);
    }

    #[tokio::test]
    async fn test_held_latest_is_not_refetched() {
        let tmp = TempDir::new().unwrap();
        let store = seeded_store(&tmp, 1..=3).await;
        let variant = lotofacil();
        let corrected = DrawRecord::new(&variant, 3, "corrected", (1..=15).collect()).unwrap();
        let source = Arc::new(FakeDrawSource::new(variant.clone(), 3).with_draw(corrected));
        let orch = orchestrator(source.clone(), store);

        let result = orch.sync("lotofacil").await.unwrap();
        assert!(result.report.up_to_date);
        assert!(result.report.conflicts.is_empty());
        assert!(source.calls().is_empty());
        assert_eq!(result.collection.get(3), Some(&sample_draw(&variant, 3)));
    }

    #[tokio::test]
    async fn test_large_jump_catches_up_one_window_per_cycle() {
        let tmp = TempDir::new().unwrap();
        let store = seeded_store(&tmp, 1..=3).await;
        let source = Arc::new(FakeDrawSource::new(lotofacil(), 25));
        let config = SyncConfig {
            window_size: 10,
            batch_delay_ms: 0,
            ..Default::default()
        };
        let orch = SyncOrchestrator::new(vec![lotofacil()], source.clone(), store, &config);

        let first = orch.sync("lotofacil").await.unwrap();
        assert!(first.report.success);
        assert!(!first.report.up_to_date);
        assert_eq!(first.report.remote_latest, Some(25));
        assert_eq!(contests(&first.collection), (1..=13).collect::<Vec<_>>());
        assert_eq!(source.requested(), (4..=13).collect::<HashSet<u32>>());

        orch.sync("lotofacil").await.unwrap();
        let third = orch.sync("lotofacil").await.unwrap();
        assert!(third.report.up_to_date);
        assert_eq!(contests(&third.collection), (1..=25).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_snapshot_failure_does_not_block_persist() {
        let tmp = TempDir::new().unwrap();
        let store = seeded_store(&tmp, 1..=3).await;
        // A plain file where the snapshot directory should go
        std::fs::write(tmp.path().join("backups"), b"not a directory").unwrap();
        let source = Arc::new(FakeDrawSource::new(lotofacil(), 5));
        let orch = orchestrator(source, store.clone()).with_backups(BackupManager::new(tmp.path().to_path_buf(), 7));

        let result = orch.sync("lotofacil").await.unwrap();

        assert!(result.report.success);
        assert!(result.report.backup.is_none());
        assert_eq!(result.report.new_draws, 2);
        assert_eq!(store.load(&lotofacil()).await.unwrap().len(), 5);
        assert_eq!(orch.state("lotofacil"), SyncState::Done);
    }

    #[tokio::test]
    async fn test_concurrent_cycle_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let store = seeded_store(&tmp, 1..=3).await;
        let gate = Arc::new(Notify::new());
        let source = Arc::new(FakeDrawSource::new(lotofacil(), 4).gated(gate.clone()));
        let orch = orchestrator(source, store);

        let first = orch.sync("lotofacil");
        let second = async {
            // Let the first cycle reach the gated latest lookup
            while orch.state("lotofacil") != SyncState::ResolvingRemoteLatest {
                tokio::task::yield_now().await;
            }
            let result = orch.sync("lotofacil").await;
            gate.notify_one();
            result
        };
        let (first, second) = tokio::join!(first, second);

        assert!(matches!(second, Err(SyncError::AlreadyRunning(_))));
        assert!(first.unwrap().report.success);
        assert_eq!(orch.state("lotofacil"), SyncState::Done);
    }

    #[tokio::test]
    async fn test_dropped_cycle_releases_variant() {
        let tmp = TempDir::new().unwrap();
        let store = seeded_store(&tmp, 1..=3).await;
        let gate = Arc::new(Notify::new());
        let source = Arc::new(FakeDrawSource::new(lotofacil(), 4).gated(gate));
        let orch = orchestrator(source, store);

        let timed_out = tokio::time::timeout(std::time::Duration::from_millis(50), orch.sync("lotofacil")).await;
        assert!(timed_out.is_err());
        assert_eq!(orch.state("lotofacil"), SyncState::Failed("interrupted".into()));
    }

    #[tokio::test]
    async fn test_sync_all_runs_each_variant() {
        let tmp = TempDir::new().unwrap();
        let store = Arc::new(FileStore::new(tmp.path().to_path_buf()).unwrap());
        let mirror = LotteryVariant::new("lotofacil-mirror", "Lotofácil mirror", 15, 1, 25, "http://mirror");
        let source = Arc::new(FakeDrawSource::new(lotofacil(), 4));
        let orch = SyncOrchestrator::new(vec![lotofacil(), mirror], source, store.clone(), &fast_config());

        let results = orch.sync_all().await;

        assert_eq!(results.len(), 2);
        for result in results {
            let result = result.unwrap();
            assert!(result.report.success);
            assert_eq!(result.collection.len(), 4);
        }
        assert!(store.collection_path("lotofacil").exists());
        assert!(store.collection_path("lotofacil-mirror").exists());
        assert_eq!(orch.state("lotofacil-mirror"), SyncState::Done);
    }

    #[tokio::test]
    async fn test_unknown_variant() {
        let tmp = TempDir::new().unwrap();
        let store = Arc::new(FileStore::new(tmp.path().to_path_buf()).unwrap());
        let orch = orchestrator(Arc::new(FakeDrawSource::new(lotofacil(), 1)), store);
        assert!(matches!(orch.sync("keno").await, Err(SyncError::UnknownVariant(_))));
    }

    #[tokio::test]
    async fn test_unordered_store_is_normalized_on_load() {
        let tmp = TempDir::new().unwrap();
        let variant = lotofacil();
        let store = FileStore::new(tmp.path().to_path_buf()).unwrap();
        let draws = vec![sample_draw(&variant, 3), sample_draw(&variant, 1), sample_draw(&variant, 3)];
        let messy = LotteryCollection::from_merged("lotofacil", draws, Utc::now());
        store.save(&variant, &messy).await.unwrap();

        let orch = orchestrator(Arc::new(FakeDrawSource::new(variant, 3)), Arc::new(store));
        let loaded = orch.load("lotofacil").await.unwrap();
        assert_eq!(contests(&loaded), vec![1, 3]);
        assert!(loaded.is_well_formed());
    }
}
