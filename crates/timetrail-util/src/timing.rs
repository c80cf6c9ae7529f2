//! RAII-based timing for measuring and logging operation durations.
//!
//! # Example
//!
//! ```rust,ignore
//! use timetrail_util::timing::TimingGuard;
//!
//! async fn persist(path: &Path) {
//!     let _timing = TimingGuard::storage(path.display().to_string());
//!     // ... write ...
//!     // Duration is logged when _timing is dropped
//! }
//! ```

use std::time::Instant;
use tracing::{debug, info, warn};

/// RAII guard that measures and logs the duration of an operation.
pub struct TimingGuard {
    /// Type of operation (e.g., "storage", "diff")
    operation_type: &'static str,
    /// Name of the specific operation (usually a path)
    operation_name: String,
    start: Instant,
    /// Minimum duration to log at info level (below this uses debug)
    info_threshold_ms: u64,
    /// Minimum duration to log at warn level
    warn_threshold_ms: u64,
}

impl TimingGuard {
    /// Create a new timing guard.
    ///
    /// The duration will be logged when the guard is dropped.
    pub fn new(operation_type: &'static str, operation_name: impl Into<String>) -> Self {
        Self {
            operation_type,
            operation_name: operation_name.into(),
            start: Instant::now(),
            info_threshold_ms: 250,
            warn_threshold_ms: 2000,
        }
    }

    /// Create a timing guard for a storage write.
    pub fn storage(name: impl Into<String>) -> Self {
        Self::new("storage", name)
    }

    /// Create a timing guard for diff rendering.
    pub fn diff(name: impl Into<String>) -> Self {
        Self::new("diff", name)
    }

    /// Get the elapsed time in milliseconds.
    pub fn elapsed_ms(&self) -> u128 {
        self.start.elapsed().as_millis()
    }
}

impl Drop for TimingGuard {
    fn drop(&mut self) {
        let duration_ms = self.start.elapsed().as_millis() as u64;

        if duration_ms >= self.warn_threshold_ms {
            warn!(
                operation_type = self.operation_type,
                operation_name = %self.operation_name,
                duration_ms,
                "Slow operation completed"
            );
        } else if duration_ms >= self.info_threshold_ms {
            info!(
                operation_type = self.operation_type,
                operation_name = %self.operation_name,
                duration_ms,
                "Operation completed"
            );
        } else {
            debug!(
                operation_type = self.operation_type,
                operation_name = %self.operation_name,
                duration_ms,
                "Operation completed"
            );
        }
    }
}
