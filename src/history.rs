/// Persisted state for chrome.storage.local

use crate::config::{HISTORY_CAPACITY, HISTORY_KEY, MODE_KEY};
use serde::{Deserialize, Deserializer, Serialize};

/// Copied identifiers, most recent first, without duplicates
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct BvHistory {
    entries: Vec<String>,
}

/// Result of recording an identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    Added,
    AlreadyPresent,
}

impl BvHistory {
    pub fn new() -> Self {
        BvHistory {
            entries: Vec::new(),
        }
    }

    /// Prepend `bv` unless it is already present, then cut to capacity.
    /// An existing entry keeps its position.
    pub fn record(&mut self, bv: &str) -> RecordOutcome {
        if self.contains(bv) {
            return RecordOutcome::AlreadyPresent;
        }
        self.entries.insert(0, bv.to_string());
        self.entries.truncate(HISTORY_CAPACITY);
        RecordOutcome::Added
    }

    pub fn contains(&self, bv: &str) -> bool {
        self.entries.iter().any(|entry| entry == bv)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    /// All identifiers as one newline-separated block
    pub fn joined(&self) -> String {
        self.entries.join("\n")
    }
}

// Stored lists written by older builds or by a racing writer may carry
// duplicates or exceed capacity.
impl From<Vec<String>> for BvHistory {
    fn from(raw: Vec<String>) -> Self {
        let mut entries: Vec<String> = Vec::with_capacity(raw.len().min(HISTORY_CAPACITY));
        for bv in raw {
            if entries.len() == HISTORY_CAPACITY {
                break;
            }
            if !entries.contains(&bv) {
                entries.push(bv);
            }
        }
        BvHistory { entries }
    }
}

impl From<BvHistory> for Vec<String> {
    fn from(history: BvHistory) -> Self {
        history.entries
    }
}

/// Typed view of both storage keys
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoredState {
    #[serde(rename = "isBVModeEnabled", default, deserialize_with = "null_as_default")]
    pub mode_enabled: bool,
    #[serde(rename = "bvHistory", default, deserialize_with = "null_as_default")]
    pub history: BvHistory,
}

// A key explicitly set to null reads the same as a missing key
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl StoredState {
    /// Keys to request when reading the whole state
    pub fn keys() -> [&'static str; 2] {
        [MODE_KEY, HISTORY_KEY]
    }
}

/// Single-key write of the mode flag
#[derive(Debug, Serialize)]
pub struct ModeUpdate {
    #[serde(rename = "isBVModeEnabled")]
    pub mode_enabled: bool,
}

/// Single-key write of the history
#[derive(Debug, Serialize)]
pub struct HistoryUpdate<'a> {
    #[serde(rename = "bvHistory")]
    pub history: &'a BvHistory,
}
