use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use crate::models::DrawRecord;

/// Result of folding fetched draws into the held ones.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeOutcome {
    /// Ascending by contest, one record per contest.
    pub draws: Vec<DrawRecord>,
    /// Contests that were not held before.
    pub added: usize,
    /// Contests where an incoming record differed from the one kept.
    pub conflicts: Vec<u32>,
}

/// Combine `existing` and `incoming` into one ordered, de-duplicated list.
///
/// When both sides carry the same contest the existing record is kept and the
/// incoming one is dropped; a differing payload is only reported in
/// `conflicts`. Within each side the first occurrence wins.
pub fn merge(existing: &[DrawRecord], incoming: &[DrawRecord]) -> MergeOutcome {
    let mut by_contest: BTreeMap<u32, &DrawRecord> = BTreeMap::new();
    for draw in existing {
        by_contest.entry(draw.contest()).or_insert(draw);
    }
    let held = by_contest.len();

    let mut conflicts = Vec::new();
    for draw in incoming {
        match by_contest.entry(draw.contest()) {
            Entry::Vacant(slot) => {
                slot.insert(draw);
            }
            Entry::Occupied(kept) => {
                if *kept.get() != draw {
                    conflicts.push(draw.contest());
                }
            }
        }
    }

    let added = by_contest.len() - held;
    MergeOutcome {
        draws: by_contest.into_values().cloned().collect(),
        added,
        conflicts,
    }
}
