//! Bounded snapshot history and its persistence.
//!
//! The durable document is a versioned envelope:
//!
//! ```text
//! {
//!   "version": 1,
//!   "entries": [
//!     { "timestamp": 1700000000000, "filePath": "...", "fileName": "...",
//!       "content": "...", "changeCount": 1 },
//!     ...
//!   ]
//! }
//! ```
//!
//! A bare JSON array of entries (the unversioned layout) is still accepted on
//! load and rewritten in the envelope on the next persist.

use crate::error::{TimelineError, TimelineResult};
use crate::SnapshotEntry;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use timetrail_storage::Storage;
use tracing::{debug, info, warn};

/// Default retention bound.
pub const MAX_ENTRIES: usize = 1000;

/// Version written into the persisted envelope.
pub const FORMAT_VERSION: u32 = 1;

/// Snapshot entries in recording order, never longer than `max_entries`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryLog {
    entries: Vec<SnapshotEntry>,
    max_entries: usize,
}

impl HistoryLog {
    /// Create an empty log holding at most `max_entries` (at least one).
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: Vec::new(),
            max_entries: max_entries.max(1),
        }
    }

    /// Create a log from existing entries, evicting the oldest beyond the bound.
    pub fn from_entries(entries: Vec<SnapshotEntry>, max_entries: usize) -> Self {
        let mut log = Self {
            entries,
            max_entries: max_entries.max(1),
        };
        log.evict();
        log
    }

    /// Append an entry, returning how many old entries were evicted.
    pub fn push(&mut self, entry: SnapshotEntry) -> usize {
        self.entries.push(entry);
        self.evict()
    }

    fn evict(&mut self) -> usize {
        let excess = self.entries.len().saturating_sub(self.max_entries);
        if excess > 0 {
            self.entries.drain(..excess);
        }
        excess
    }

    pub fn entries(&self) -> &[SnapshotEntry] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&SnapshotEntry> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Result of reading the durable history.
///
/// Loading never fails: unreadable or corrupt history yields an empty (or
/// partial) list plus a warning for the caller to surface.
#[derive(Debug, Clone, Default)]
pub struct LoadedHistory {
    pub entries: Vec<SnapshotEntry>,
    pub warning: Option<String>,
}

#[derive(Serialize)]
struct HistoryDocument<'a> {
    version: u32,
    entries: &'a [SnapshotEntry],
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredDocument {
    Versioned {
        version: u32,
        entries: Vec<serde_json::Value>,
    },
    Legacy(Vec<serde_json::Value>),
}

/// Loads and saves the history document.
#[derive(Clone)]
pub struct HistoryStore {
    storage: Arc<dyn Storage>,
}

impl HistoryStore {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Location of the durable document, for messages.
    pub fn location(&self) -> String {
        self.storage.location()
    }

    /// Read the durable history.
    ///
    /// Missing storage is an empty history without a warning.
    pub async fn load(&self) -> LoadedHistory {
        match self.storage.read().await {
            Ok(Some(raw)) => {
                let loaded = decode(&raw);
                if let Some(warning) = &loaded.warning {
                    warn!(location = %self.location(), "{}", warning);
                }
                info!(
                    location = %self.location(),
                    entries = loaded.entries.len(),
                    "Loaded timeline history"
                );
                loaded
            }
            Ok(None) => {
                debug!(location = %self.location(), "No timeline history yet");
                LoadedHistory::default()
            }
            Err(e) => {
                let warning = format!("could not read history, starting empty: {e}");
                warn!(location = %self.location(), "{}", warning);
                LoadedHistory {
                    entries: Vec::new(),
                    warning: Some(warning),
                }
            }
        }
    }

    /// Replace the durable history with `log`.
    pub async fn persist(&self, log: &HistoryLog) -> TimelineResult<()> {
        let document = HistoryDocument {
            version: FORMAT_VERSION,
            entries: log.entries(),
        };
        let json = serde_json::to_string_pretty(&document)?;

        self.storage
            .write(&json)
            .await
            .map_err(TimelineError::Persist)?;

        debug!(
            location = %self.location(),
            entries = log.len(),
            "Saved timeline history"
        );
        Ok(())
    }

    /// Empty `log` and persist the empty history.
    pub async fn clear(&self, log: &mut HistoryLog) -> TimelineResult<()> {
        log.clear();
        self.persist(log).await
    }
}

fn decode(raw: &str) -> LoadedHistory {
    let (version, values) = match serde_json::from_str::<StoredDocument>(raw) {
        Ok(StoredDocument::Versioned { version, entries }) => (Some(version), entries),
        Ok(StoredDocument::Legacy(entries)) => (None, entries),
        Err(e) => {
            return LoadedHistory {
                entries: Vec::new(),
                warning: Some(format!("history is corrupted, starting empty: {e}")),
            };
        }
    };

    if let Some(version) = version.filter(|v| *v > FORMAT_VERSION) {
        return LoadedHistory {
            entries: Vec::new(),
            warning: Some(format!(
                "history format version {version} is newer than supported version {FORMAT_VERSION}, starting empty"
            )),
        };
    }

    let total = values.len();
    let entries: Vec<SnapshotEntry> = values
        .into_iter()
        .filter_map(|value| serde_json::from_value::<SnapshotEntry>(value).ok())
        .filter(SnapshotEntry::is_well_formed)
        .collect();

    let skipped = total - entries.len();
    let warning =
        (skipped > 0).then(|| format!("skipped {skipped} malformed entries in history"));

    LoadedHistory { entries, warning }
}
