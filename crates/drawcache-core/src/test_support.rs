//! In-memory draw feed for tests.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use tokio::sync::Notify;
use tokio::time::Instant;

use crate::api::{DrawSource, FetchError};
use crate::models::{DrawRecord, LotteryVariant, DEFAULT_BASE_URL};

pub fn lotofacil() -> LotteryVariant {
    LotteryVariant::new("lotofacil", "Lotofácil", 15, 1, 25, DEFAULT_BASE_URL)
}

/// A valid draw for `contest`; the numbers rotate with the contest number.
pub fn sample_draw(variant: &LotteryVariant, contest: u32) -> DrawRecord {
    let span = (variant.max_number - variant.min_number) as usize + 1;
    let numbers = (0..variant.draw_count)
        .map(|i| variant.min_number + ((contest as usize + i) % span) as u8)
        .collect();
    DrawRecord::new(variant, contest, format!("day {}", contest), numbers)
        .expect("sample draws fit the variant")
}

type ErrorFactory = Box<dyn Fn() -> FetchError + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FakeCall {
    pub contest: u32,
    pub at: Instant,
}

/// Serves `sample_draw` for contests `1..=latest`, except where told otherwise.
pub struct FakeDrawSource {
    variant: LotteryVariant,
    latest: u32,
    failures: HashMap<u32, ErrorFactory>,
    overrides: HashMap<u32, DrawRecord>,
    latest_error: Option<ErrorFactory>,
    gate: Option<Arc<Notify>>,
    calls: Mutex<Vec<FakeCall>>,
    latest_calls: Mutex<usize>,
}

impl FakeDrawSource {
    pub fn new(variant: LotteryVariant, latest: u32) -> Self {
        Self {
            variant,
            latest,
            failures: HashMap::new(),
            overrides: HashMap::new(),
            latest_error: None,
            gate: None,
            calls: Mutex::new(Vec::new()),
            latest_calls: Mutex::new(0),
        }
    }

    /// `contest` always fails with the error `make` builds.
    pub fn failing(mut self, contest: u32, make: impl Fn() -> FetchError + Send + Sync + 'static) -> Self {
        self.failures.insert(contest, Box::new(make));
        self
    }

    /// `fetch_latest` always fails.
    pub fn latest_failing(mut self, make: impl Fn() -> FetchError + Send + Sync + 'static) -> Self {
        self.latest_error = Some(Box::new(make));
        self
    }

    /// Serve `draw` for its contest instead of the sample.
    pub fn with_draw(mut self, draw: DrawRecord) -> Self {
        self.overrides.insert(draw.contest(), draw);
        self
    }

    /// `fetch_latest` waits for a notification on `gate` before answering.
    pub fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn calls(&self) -> Vec<FakeCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn requested(&self) -> HashSet<u32> {
        self.calls().iter().map(|c| c.contest).collect()
    }

    pub fn latest_calls(&self) -> usize {
        *self.latest_calls.lock().unwrap()
    }

    fn draw(&self, contest: u32) -> Result<DrawRecord, FetchError> {
        if let Some(make) = self.failures.get(&contest) {
            return Err(make());
        }
        if contest == 0 || contest > self.latest {
            return Err(FetchError::NotFound(format!("contest {}", contest)));
        }
        Ok(self
            .overrides
            .get(&contest)
            .cloned()
            .unwrap_or_else(|| sample_draw(&self.variant, contest)))
    }
}

#[async_trait::async_trait]
impl DrawSource for FakeDrawSource {
    async fn fetch_latest(&self, _variant: &LotteryVariant) -> Result<DrawRecord, FetchError> {
        *self.latest_calls.lock().unwrap() += 1;
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        if let Some(make) = &self.latest_error {
            return Err(make());
        }
        self.draw(self.latest)
    }

    async fn fetch_contest(&self, _variant: &LotteryVariant, contest: u32) -> Result<DrawRecord, FetchError> {
        self.calls.lock().unwrap().push(FakeCall {
            contest,
            at: Instant::now(),
        });
        self.draw(contest)
    }
}
