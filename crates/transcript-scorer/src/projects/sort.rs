use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::domain::TranscriptEntry;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    Date,
    Score,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownSortOption(pub String);

impl fmt::Display for UnknownSortOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown sort option '{}'", self.0)
    }
}

impl std::error::Error for UnknownSortOption {}

impl FromStr for SortKey {
    type Err = UnknownSortOption;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "date" => Ok(Self::Date),
            "score" => Ok(Self::Score),
            other => Err(UnknownSortOption(other.to_string())),
        }
    }
}

impl FromStr for SortOrder {
    type Err = UnknownSortOption;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(UnknownSortOption(other.to_string())),
        }
    }
}

/// Stable ordering of a project's history. Entries without a total score sort
/// as the lowest scores.
pub fn sorted_entries(
    entries: &[TranscriptEntry],
    key: SortKey,
    order: SortOrder,
) -> Vec<&TranscriptEntry> {
    let mut sorted: Vec<&TranscriptEntry> = entries.iter().collect();
    sorted.sort_by(|a, b| {
        let ascending = compare(a, b, key);
        match order {
            SortOrder::Asc => ascending,
            SortOrder::Desc => ascending.reverse(),
        }
    });
    sorted
}

fn compare(a: &TranscriptEntry, b: &TranscriptEntry, key: SortKey) -> Ordering {
    match key {
        SortKey::Date => a.timestamp.cmp(&b.timestamp),
        SortKey::Score => total(a).total_cmp(&total(b)),
    }
}

fn total(entry: &TranscriptEntry) -> f64 {
    entry.score.total_score.unwrap_or(f64::NEG_INFINITY)
}
