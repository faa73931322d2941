use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::models::{LotteryCollection, LotteryVariant};

use super::collection_file;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {location}: {source}")]
    Parse {
        location: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize collection: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("Remote store error: {0}")]
    Remote(String),

    #[error("Store at {0} is read-only")]
    ReadOnly(String),
}

impl StoreError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Durable home for per-game collections.
///
/// A game that was never saved loads as an empty collection, not an error.
#[async_trait::async_trait]
pub trait CacheStore: Send + Sync {
    /// Human-readable location of a game's collection, for logs.
    fn location(&self, variant: &LotteryVariant) -> String;

    async fn load(&self, variant: &LotteryVariant) -> Result<LotteryCollection, StoreError>;

    /// Replace the stored collection. The previous copy survives an interrupted write.
    async fn save(&self, variant: &LotteryVariant, collection: &LotteryCollection) -> Result<(), StoreError>;
}

/// One pretty-printed JSON document per game in a data directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    data_dir: PathBuf,
}

impl FileStore {
    pub fn new(data_dir: PathBuf) -> Result<Self, StoreError> {
        std::fs::create_dir_all(&data_dir).map_err(|e| StoreError::io(&data_dir, e))?;
        Ok(Self { data_dir })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn collection_path(&self, lottery_id: &str) -> PathBuf {
        collection_file(&self.data_dir, lottery_id)
    }
}

#[async_trait::async_trait]
impl CacheStore for FileStore {
    fn location(&self, variant: &LotteryVariant) -> String {
        self.collection_path(&variant.id).display().to_string()
    }

    async fn load(&self, variant: &LotteryVariant) -> Result<LotteryCollection, StoreError> {
        let path = self.collection_path(&variant.id);
        let contents = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(lottery = %variant.id, "No stored collection yet");
                return Ok(LotteryCollection::empty(&variant.id));
            }
            Err(e) => return Err(StoreError::io(&path, e)),
        };

        serde_json::from_str(&contents).map_err(|source| StoreError::Parse {
            location: path.display().to_string(),
            source,
        })
    }

    async fn save(&self, variant: &LotteryVariant, collection: &LotteryCollection) -> Result<(), StoreError> {
        let path = self.collection_path(&variant.id);
        let contents = serde_json::to_vec_pretty(collection).map_err(StoreError::Serialize)?;
        write_atomic(&path, &contents).await?;
        debug!(lottery = %variant.id, draws = collection.len(), path = %path.display(), "Collection saved");
        Ok(())
    }
}

/// Write to a sibling temp file, fsync, then rename over `path`.
async fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), StoreError> {
    let tmp = path.with_extension("json.tmp");

    let result: std::io::Result<()> = async {
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(contents).await?;
        file.sync_all().await?;
        drop(file);
        tokio::fs::rename(&tmp, path).await
    }
    .await;

    if let Err(e) = result {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(StoreError::io(path, e));
    }
    Ok(())
}

/// Read-only store serving `{base_url}/{id}.json`, e.g. a published static copy.
#[derive(Clone)]
pub struct RemoteDocumentStore {
    client: reqwest::Client,
    base_url: String,
}

impl RemoteDocumentStore {
    pub fn new(base_url: impl Into<String>, timeout: std::time::Duration) -> Result<Self, StoreError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StoreError::Remote(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn document_url(&self, lottery_id: &str) -> String {
        format!("{}/{}.json", self.base_url, lottery_id)
    }
}

#[async_trait::async_trait]
impl CacheStore for RemoteDocumentStore {
    fn location(&self, variant: &LotteryVariant) -> String {
        self.document_url(&variant.id)
    }

    async fn load(&self, variant: &LotteryVariant) -> Result<LotteryCollection, StoreError> {
        let url = self.document_url(&variant.id);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| StoreError::Remote(e.to_string()))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            debug!(lottery = %variant.id, url = %url, "No published collection yet");
            return Ok(LotteryCollection::empty(&variant.id));
        }
        if !response.status().is_success() {
            return Err(StoreError::Remote(format!("{} returned {}", url, response.status())));
        }

        let body = response
            .text()
            .await
            .map_err(|e| StoreError::Remote(e.to_string()))?;
        serde_json::from_str(&body).map_err(|source| StoreError::Parse { location: url, source })
    }

    async fn save(&self, variant: &LotteryVariant, _collection: &LotteryCollection) -> Result<(), StoreError> {
        Err(StoreError::ReadOnly(self.document_url(&variant.id)))
    }
}
