use std::collections::BTreeSet;

use crate::config::DEFAULT_WINDOW_SIZE;

/// Works out which contest numbers a collection is missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GapAnalyzer {
    window_size: u32,
}

impl Default for GapAnalyzer {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW_SIZE)
    }
}

impl GapAnalyzer {
    /// `window_size` bounds the backfill of an empty collection.
    pub fn new(window_size: u32) -> Self {
        Self {
            window_size: window_size.max(1),
        }
    }

    pub fn window_size(&self) -> u32 {
        self.window_size
    }

    /// Missing contest numbers, ascending.
    ///
    /// Empty holdings get the last `window_size` contests up to `remote_latest`.
    /// Otherwise: every hole between the lowest and highest held contest, plus
    /// the contests after the highest up to `remote_latest`, at most
    /// `window_size` of them per call. A larger jump is caught up over
    /// several cycles.
    pub fn missing(&self, existing: &BTreeSet<u32>, remote_latest: u32) -> Vec<u32> {
        let (Some(&lowest), Some(&highest)) = (existing.first(), existing.last()) else {
            if remote_latest == 0 {
                return Vec::new();
            }
            let start = remote_latest.saturating_sub(self.window_size - 1).max(1);
            return (start..=remote_latest).collect();
        };

        let holes = (lowest..=highest).filter(|n| !existing.contains(n));
        let frontier = remote_latest.min(highest.saturating_add(self.window_size));
        let trailing = highest.saturating_add(1)..=frontier;
        holes.chain(trailing).collect()
    }
}
