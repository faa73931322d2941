use std::sync::Arc;

use crate::models::{DrawRecord, LotteryVariant};

use super::FetchError;

/// A remote feed of draw results.
///
/// Implementations retry transient failures themselves; an `Err` returned
/// from here is final for this cycle.
#[async_trait::async_trait]
pub trait DrawSource: Send + Sync {
    /// The most recent contest, used to learn how far the feed has advanced.
    async fn fetch_latest(&self, variant: &LotteryVariant) -> Result<DrawRecord, FetchError>;

    /// One specific contest.
    async fn fetch_contest(&self, variant: &LotteryVariant, contest: u32) -> Result<DrawRecord, FetchError>;
}

#[async_trait::async_trait]
impl<T: DrawSource + ?Sized> DrawSource for Arc<T> {
    async fn fetch_latest(&self, variant: &LotteryVariant) -> Result<DrawRecord, FetchError> {
        (**self).fetch_latest(variant).await
    }

    async fn fetch_contest(&self, variant: &LotteryVariant, contest: u32) -> Result<DrawRecord, FetchError> {
        (**self).fetch_contest(variant, contest).await
    }
}
