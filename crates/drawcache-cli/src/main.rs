//! drawcache - keeps a local copy of lottery draw history up to date.
//!
//! Usage:
//!   drawcache sync [ids..]    sync the given games (default: all enabled)
//!   drawcache status          show what is cached locally
//!   drawcache restore <id>    roll a game back to its newest backup
//!   drawcache variants        list the enabled games

mod config;

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use drawcache_core::{
    BackupManager, CacheStore, DrawClient, FileStore, RemoteDocumentStore, StorageBackend, SyncOrchestrator,
};
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use config::Config;

/// Log file prefix inside `<data_dir>/logs`
const LOG_FILE_PREFIX: &str = "drawcache.log";

const USAGE: &str = "usage: drawcache <sync [ids..] | status | restore <id> | variants>";

/// Initialize the tracing subscriber: stderr plus a daily log file.
///
/// The returned guard flushes the file writer on drop and must outlive `main`'s work.
fn init_tracing(data_dir: &Path) -> WorkerGuard {
    // RUST_LOG overrides, e.g. RUST_LOG=drawcache_core=debug
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,drawcache=info,drawcache_core=info"));

    let file_appender = tracing_appender::rolling::daily(data_dir.join("logs"), LOG_FILE_PREFIX);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(fmt::layer().with_writer(file_writer).with_ansi(false))
        .with(filter)
        .init();

    guard
}

struct App {
    config: Config,
    store: Arc<dyn CacheStore>,
    backups: Option<BackupManager>,
    orchestrator: SyncOrchestrator,
}

impl App {
    fn new(config: Config) -> Result<Self> {
        let data_dir = config.data_dir()?;
        let variants = config.enabled_variants()?;

        let (store, backups): (Arc<dyn CacheStore>, Option<BackupManager>) = match &config.storage {
            StorageBackend::Filesystem => {
                let store = FileStore::new(data_dir.clone()).context("Failed to open data directory")?;
                let backups = (config.sync.backup_retention > 0)
                    .then(|| BackupManager::new(data_dir.clone(), config.sync.backup_retention));
                (Arc::new(store), backups)
            }
            StorageBackend::RemoteDocument { url } => {
                let store = RemoteDocumentStore::new(url.as_str(), config.sync.request_timeout())
                    .context("Failed to build remote store client")?;
                (Arc::new(store), None)
            }
        };

        let client = DrawClient::from_config(&config.sync).context("Failed to build HTTP client")?;
        let mut orchestrator = SyncOrchestrator::new(variants, Arc::new(client), store.clone(), &config.sync);
        if let Some(ref backups) = backups {
            orchestrator = orchestrator.with_backups(backups.clone());
        }

        Ok(Self {
            config,
            store,
            backups,
            orchestrator,
        })
    }

    async fn sync(&self, ids: &[String]) -> Result<()> {
        let results = if ids.is_empty() {
            self.orchestrator.sync_all().await
        } else {
            let mut results = Vec::with_capacity(ids.len());
            for id in ids {
                results.push(self.orchestrator.sync(id).await);
            }
            results
        };

        let mut failed = 0;
        for result in results {
            match result {
                Ok(result) => {
                    if !result.report.success {
                        failed += 1;
                    }
                    println!("{}", result.report);
                }
                Err(e) => {
                    failed += 1;
                    error!(error = %e, "Sync did not run");
                    println!("{}", e);
                }
            }
        }

        if failed > 0 {
            bail!("{} of the requested syncs failed", failed);
        }
        Ok(())
    }

    async fn status(&self) -> Result<()> {
        for variant in self.orchestrator.variants() {
            let collection = self
                .store
                .load(variant)
                .await
                .with_context(|| format!("Failed to read {}", self.store.location(variant)))?;
            let latest = collection
                .latest_contest()
                .map(|c| c.to_string())
                .unwrap_or_else(|| "-".to_string());
            let snapshots = match &self.backups {
                Some(backups) => backups.list(&variant.id)?.len(),
                None => 0,
            };
            println!(
                "{:<12} {:>6} draws  latest {:>6}  updated {:<10} backups {}",
                variant.id,
                collection.len(),
                latest,
                collection.age_display(),
                snapshots
            );
        }
        Ok(())
    }

    fn restore(&self, id: &str) -> Result<()> {
        if self.orchestrator.variant(id).is_none() {
            bail!("Unknown lottery: {}", id);
        }
        let Some(backups) = &self.backups else {
            bail!("Backups are disabled for this storage configuration");
        };
        let restored = backups.restore_latest(id)?;
        info!(lottery = id, snapshot = %restored.display(), "Restored from backup");
        println!("{}: restored from {}", id, restored.display());
        Ok(())
    }

    fn variants(&self) {
        println!("feed: {}", self.config.base_url());
        for variant in self.orchestrator.variants() {
            println!("{:<12} {}", variant.id, variant);
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let config = Config::load()?;
    let data_dir = config.data_dir()?;
    let _guard = init_tracing(&data_dir);

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = args.first() else {
        eprintln!("{}", USAGE);
        std::process::exit(2);
    };

    let app = App::new(config)?;
    info!(command = %command, data_dir = %data_dir.display(), "drawcache starting");

    match command.as_str() {
        "sync" => app.sync(&args[1..]).await,
        "status" => app.status().await,
        "restore" => match args.get(1) {
            Some(id) => app.restore(id),
            None => bail!("{}", USAGE),
        },
        "variants" => {
            app.variants();
            Ok(())
        }
        other => bail!("Unknown command '{}'\n{}", other, USAGE),
    }
}
