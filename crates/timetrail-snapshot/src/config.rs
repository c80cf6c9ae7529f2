//! Timeline configuration.

use crate::aggregate::DEFAULT_INTERVAL_MS;
use crate::error::{TimelineError, TimelineResult};
use crate::history::MAX_ENTRIES;
use serde::{Deserialize, Serialize};

/// Configuration for a [`Timeline`](crate::Timeline).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TimelineConfig {
    /// Maximum number of snapshots kept; the oldest are evicted first.
    pub max_entries: usize,

    /// Default bucket width for aggregated history, in milliseconds.
    pub bucket_interval_ms: i64,

    /// Seed the last-known-content cache from the loaded history.
    ///
    /// When disabled, the first save of every file after opening is treated
    /// as a first observation.
    pub seed_cache_from_history: bool,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            max_entries: MAX_ENTRIES,
            bucket_interval_ms: DEFAULT_INTERVAL_MS,
            seed_cache_from_history: true,
        }
    }
}

impl TimelineConfig {
    /// Reject settings the engine cannot honor.
    pub fn validate(&self) -> TimelineResult<()> {
        if self.max_entries == 0 {
            return Err(TimelineError::InvalidConfig(
                "maxEntries must be at least 1".to_string(),
            ));
        }
        if self.bucket_interval_ms <= 0 {
            return Err(TimelineError::InvalidConfig(format!(
                "bucketIntervalMs must be positive, got {}",
                self.bucket_interval_ms
            )));
        }
        Ok(())
    }
}
