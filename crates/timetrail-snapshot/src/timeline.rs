//! The timeline handle: records saves, answers queries, restores snapshots.

use crate::aggregate::{self, TimeBucket};
use crate::cache::SnapshotCache;
use crate::clock::{Clock, SystemClock};
use crate::config::TimelineConfig;
use crate::diff::{change_magnitude, differing_lines, render};
use crate::error::TimelineResult;
use crate::history::{HistoryLog, HistoryStore};
use crate::restore::{self, RestoreReport};
use crate::SnapshotEntry;
use std::path::Path;
use std::sync::Arc;
use timetrail_storage::Storage;
use timetrail_util::TimingGuard;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// What [`Timeline::record_change`] did with a save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    /// A new snapshot was appended.
    Recorded(SnapshotEntry),
    /// The file was already known and no line differs; nothing was stored.
    Unchanged,
}

impl RecordOutcome {
    pub fn entry(&self) -> Option<&SnapshotEntry> {
        match self {
            Self::Recorded(entry) => Some(entry),
            Self::Unchanged => None,
        }
    }
}

struct State {
    log: HistoryLog,
    cache: SnapshotCache,
}

/// Chronological snapshot history for a set of files.
///
/// All operations take one lock and run to completion, so concurrent callers
/// are serialized and history order equals completion order.
pub struct Timeline {
    store: HistoryStore,
    state: Mutex<State>,
    clock: Arc<dyn Clock>,
    config: TimelineConfig,
    load_warning: Option<String>,
}

impl Timeline {
    /// Open a timeline backed by `storage`, using the wall clock.
    pub async fn open(storage: Arc<dyn Storage>, config: TimelineConfig) -> TimelineResult<Self> {
        Self::open_with_clock(storage, config, Arc::new(SystemClock)).await
    }

    /// Open a timeline with an explicit time source.
    pub async fn open_with_clock(
        storage: Arc<dyn Storage>,
        config: TimelineConfig,
        clock: Arc<dyn Clock>,
    ) -> TimelineResult<Self> {
        config.validate()?;

        let store = HistoryStore::new(storage);
        let loaded = store.load().await;
        let loaded_count = loaded.entries.len();
        let log = HistoryLog::from_entries(loaded.entries, config.max_entries);
        if log.len() < loaded_count {
            debug!(
                evicted = loaded_count - log.len(),
                max_entries = config.max_entries,
                "Trimmed loaded history to retention bound"
            );
        }

        let cache = if config.seed_cache_from_history {
            SnapshotCache::from_entries(log.entries())
        } else {
            SnapshotCache::new()
        };

        Ok(Self {
            store,
            state: Mutex::new(State { log, cache }),
            clock,
            config,
            load_warning: loaded.warning,
        })
    }

    pub fn config(&self) -> &TimelineConfig {
        &self.config
    }

    /// Where the history is persisted.
    pub fn location(&self) -> String {
        self.store.location()
    }

    /// Warning produced while loading the history, if it was unreadable or partly corrupt.
    pub fn load_warning(&self) -> Option<&str> {
        self.load_warning.as_deref()
    }

    /// Record a save of `file_path` with its full current text.
    ///
    /// The first save of a path is always recorded with a change count of 1
    /// and no diff. Later saves are recorded only when at least one line
    /// differs from the last known content.
    ///
    /// If persisting fails the snapshot stays in memory and
    /// [`TimelineError::Persist`](crate::TimelineError::Persist) is returned.
    pub async fn record_change(
        &self,
        file_path: impl AsRef<Path>,
        file_name: &str,
        current_text: &str,
    ) -> TimelineResult<RecordOutcome> {
        let path = file_path.as_ref();
        let mut state = self.state.lock().await;

        let (change_count, diff) = {
            let seen = state.cache.contains(path);
            let previous = state.cache.get(path).unwrap_or("");

            if seen && differing_lines(previous, current_text) == 0 {
                debug!(path = %path.display(), "Save has no line changes, skipping");
                return Ok(RecordOutcome::Unchanged);
            }

            let diff = (!previous.is_empty()).then(|| {
                let _timing = TimingGuard::diff(path.display().to_string());
                render(previous, current_text)
            });
            (change_magnitude(previous, current_text), diff)
        };

        let entry = SnapshotEntry {
            timestamp: self.clock.now_millis(),
            file_path: path.to_path_buf(),
            file_name: file_name.to_string(),
            content: current_text.to_string(),
            change_count,
            diff,
        };

        let evicted = state.log.push(entry.clone());
        state
            .cache
            .insert(path.to_path_buf(), current_text.to_string());

        info!(
            file = %file_name,
            change_count,
            entries = state.log.len(),
            "Recorded snapshot"
        );
        if evicted > 0 {
            debug!(evicted, "Evicted oldest snapshots");
        }

        if let Err(e) = self.store.persist(&state.log).await {
            warn!(location = %self.location(), error = %e, "Failed to persist timeline history");
            return Err(e);
        }

        Ok(RecordOutcome::Recorded(entry))
    }

    /// All snapshots, oldest first.
    pub async fn entries(&self) -> Vec<SnapshotEntry> {
        self.state.lock().await.log.entries().to_vec()
    }

    /// Snapshot at `index` in history order.
    pub async fn entry(&self, index: usize) -> Option<SnapshotEntry> {
        self.state.lock().await.log.get(index).cloned()
    }

    /// Snapshots of one file, oldest first.
    pub async fn entries_for(&self, path: impl AsRef<Path>) -> Vec<SnapshotEntry> {
        let path = path.as_ref();
        self.state
            .lock()
            .await
            .log
            .entries()
            .iter()
            .filter(|e| e.is_for(path))
            .cloned()
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.state.lock().await.log.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.lock().await.log.is_empty()
    }

    /// History grouped into windows of `interval_ms`.
    pub async fn aggregated_history(&self, interval_ms: i64) -> TimelineResult<Vec<TimeBucket>> {
        let state = self.state.lock().await;
        aggregate::bucket(state.log.entries(), interval_ms)
    }

    /// History grouped by the configured interval.
    pub async fn aggregated_default(&self) -> TimelineResult<Vec<TimeBucket>> {
        self.aggregated_history(self.config.bucket_interval_ms).await
    }

    /// Overwrite the live file with `entry`'s content.
    ///
    /// History and cache are left as they are. The next save of the file is
    /// compared against the last recorded content, not the restored one.
    pub async fn restore_snapshot(&self, entry: &SnapshotEntry) -> TimelineResult<RestoreReport> {
        let _state = self.state.lock().await;
        restore::restore(entry).await.map_err(|e| {
            warn!(path = %entry.file_path.display(), error = %e, "Restore failed");
            e
        })
    }

    /// Forget all snapshots and all last known content, then persist.
    pub async fn clear_history(&self) -> TimelineResult<()> {
        let mut state = self.state.lock().await;
        state.cache.clear();
        self.store.clear(&mut state.log).await?;
        info!(location = %self.location(), "Cleared timeline history");
        Ok(())
    }
}
