use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::DrawRecord;

/// Store format version written into every collection.
pub const FORMAT_VERSION: &str = "1.0";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionMetadata {
    pub last_update: Option<DateTime<Utc>>,
    pub total_draws: usize,
    pub lottery_type: String,
    pub version: String,
}

/// Persisted draw history for one lottery game.
///
/// `draws` is ascending by contest number with no repeats. Statistics and
/// generation code read it through [`LotteryCollection::draws`]; only the
/// sync cycle produces new collections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LotteryCollection {
    pub metadata: CollectionMetadata,
    draws: Vec<DrawRecord>,
}

impl LotteryCollection {
    /// A game with nothing cached yet.
    pub fn empty(lottery_id: &str) -> Self {
        Self {
            metadata: CollectionMetadata {
                last_update: None,
                total_draws: 0,
                lottery_type: lottery_id.to_string(),
                version: FORMAT_VERSION.to_string(),
            },
            draws: Vec::new(),
        }
    }

    /// Build a collection from draws that are already merged (sorted, unique).
    pub fn from_merged(lottery_id: &str, draws: Vec<DrawRecord>, updated_at: DateTime<Utc>) -> Self {
        Self {
            metadata: CollectionMetadata {
                last_update: Some(updated_at),
                total_draws: draws.len(),
                lottery_type: lottery_id.to_string(),
                version: FORMAT_VERSION.to_string(),
            },
            draws,
        }
    }

    pub fn draws(&self) -> &[DrawRecord] {
        &self.draws
    }

    pub fn into_draws(self) -> Vec<DrawRecord> {
        self.draws
    }

    pub fn len(&self) -> usize {
        self.draws.len()
    }

    pub fn is_empty(&self) -> bool {
        self.draws.is_empty()
    }

    pub fn contest_numbers(&self) -> BTreeSet<u32> {
        self.draws.iter().map(DrawRecord::contest).collect()
    }

    pub fn latest_contest(&self) -> Option<u32> {
        self.draws.last().map(DrawRecord::contest)
    }

    pub fn get(&self, contest: u32) -> Option<&DrawRecord> {
        self.draws
            .binary_search_by_key(&contest, DrawRecord::contest)
            .ok()
            .map(|i| &self.draws[i])
    }

    /// True when contest numbers strictly increase and the metadata count matches.
    pub fn is_well_formed(&self) -> bool {
        self.metadata.total_draws == self.draws.len()
            && self.draws.windows(2).all(|w| w[0].contest() < w[1].contest())
    }

    pub fn age_minutes(&self) -> Option<i64> {
        self.metadata
            .last_update
            .map(|at| (Utc::now() - at).num_minutes())
    }

    pub fn age_display(&self) -> String {
        let Some(minutes) = self.age_minutes() else {
            return "never".to_string();
        };
        if minutes < 1 {
            // Negative ages come from clock skew
            "just now".to_string()
        } else if minutes < 60 {
            format!("{}m ago", minutes)
        } else if minutes < 1440 {
            let hours = minutes / 60;
            if minutes % 60 >= 30 {
                format!("{}h ago", hours + 1)
            } else {
                format!("{}h ago", hours)
            }
        } else {
            let days = minutes / 1440;
            if (minutes % 1440) / 60 >= 12 {
                format!("{}d ago", days + 1)
            } else {
                format!("{}d ago", days)
            }
        }
    }
}
