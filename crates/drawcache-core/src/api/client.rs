//! HTTP client for the draw results feed.
//!
//! `GET {endpoint}` returns the latest draw, `GET {endpoint}/{contest}` a
//! specific one. Transient failures are retried with exponential backoff;
//! anything else is returned immediately.

use std::time::Duration;

use reqwest::{header, Client};
use tracing::{debug, warn};

use crate::config::{RetryPolicy, SyncConfig};
use crate::models::{DrawRecord, LotteryVariant, ValidationError};

use super::payload::DrawPayload;
use super::{DrawSource, FetchError};

/// Feed client. Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct DrawClient {
    client: Client,
    retry: RetryPolicy,
}

impl DrawClient {
    pub fn new(timeout: Duration, retry: RetryPolicy) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("drawcache/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client, retry })
    }

    pub fn from_config(config: &SyncConfig) -> Result<Self, FetchError> {
        Self::new(config.request_timeout(), config.retry)
    }

    async fn get_once(&self, url: &str) -> Result<DrawPayload, FetchError> {
        let response = self
            .client
            .get(url)
            .header(header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(FetchError::from_status(status, &body));
        }

        serde_json::from_str(&body).map_err(|e| FetchError::InvalidResponse(e.to_string()))
    }

    async fn get_payload(&self, url: &str) -> Result<DrawPayload, FetchError> {
        let mut attempt = 1;

        loop {
            match self.get_once(url).await {
                Ok(payload) => return Ok(payload),
                Err(e) if e.is_transient() && attempt < self.retry.max_attempts => {
                    let backoff = self.retry.delay_for(attempt);
                    warn!(
                        url = url,
                        attempt = attempt,
                        backoff_ms = backoff.as_millis() as u64,
                        error = %e,
                        "Request failed, backing off"
                    );
                    tokio::time::sleep(backoff).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[async_trait::async_trait]
impl DrawSource for DrawClient {
    async fn fetch_latest(&self, variant: &LotteryVariant) -> Result<DrawRecord, FetchError> {
        let payload = self.get_payload(&variant.latest_url()).await?;
        let record = payload.into_record(variant)?;
        debug!(lottery = %variant.id, contest = record.contest(), "Latest draw fetched");
        Ok(record)
    }

    async fn fetch_contest(&self, variant: &LotteryVariant, contest: u32) -> Result<DrawRecord, FetchError> {
        let payload = self.get_payload(&variant.contest_url(contest)).await?;
        let record = payload.into_record(variant)?;
        if record.contest() != contest {
            return Err(ValidationError::ContestMismatch {
                expected: contest,
                actual: record.contest(),
            }
            .into());
        }
        Ok(record)
    }
}
