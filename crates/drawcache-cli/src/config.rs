//! Application configuration management.
//!
//! Configuration is stored at `~/.config/drawcache/config.json`. Every field
//! is optional; `DRAWCACHE_DATA_DIR` and `DRAWCACHE_BASE_URL` override the
//! file after `.env` has been loaded.

use std::path::PathBuf;

use anyhow::{Context, Result};
use drawcache_core::models::DEFAULT_BASE_URL;
use drawcache_core::{LotteryVariant, StorageBackend, SyncConfig};
use serde::{Deserialize, Serialize};

/// Application name used for config/cache directory paths
const APP_NAME: &str = "drawcache";

/// Config file name
const CONFIG_FILE: &str = "config.json";

const DATA_DIR_ENV: &str = "DRAWCACHE_DATA_DIR";
const BASE_URL_ENV: &str = "DRAWCACHE_BASE_URL";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub data_dir: Option<PathBuf>,
    pub base_url: Option<String>,
    pub storage: StorageBackend,
    /// Enabled game ids; empty means every built-in game.
    pub variants: Vec<String>,
    pub sync: SyncConfig,
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        let mut config: Config = if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            serde_json::from_str(&contents).with_context(|| format!("Invalid config in {}", path.display()))?
        } else {
            Self::default()
        };

        config.apply_env(|key| std::env::var(key).ok());
        config.sync.validate()?;
        Ok(config)
    }

    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(dir) = var(DATA_DIR_ENV).filter(|v| !v.is_empty()) {
            self.data_dir = Some(PathBuf::from(dir));
        }
        if let Some(url) = var(BASE_URL_ENV).filter(|v| !v.is_empty()) {
            self.base_url = Some(url);
        }
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn data_dir(&self) -> Result<PathBuf> {
        if let Some(ref dir) = self.data_dir {
            return Ok(dir.clone());
        }
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    /// Games to sync, in configuration order.
    pub fn enabled_variants(&self) -> Result<Vec<LotteryVariant>> {
        if self.variants.is_empty() {
            return Ok(LotteryVariant::builtin(self.base_url()));
        }
        self.variants
            .iter()
            .map(|id| {
                LotteryVariant::find_builtin(id, self.base_url())
                    .ok_or_else(|| anyhow::anyhow!("Unknown lottery in config: {}", id))
            })
            .collect()
    }
}
