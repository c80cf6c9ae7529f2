//! Timeline error types.

use std::path::PathBuf;
use thiserror::Error;
use timetrail_storage::StorageError;

/// Result type for timeline operations.
pub type TimelineResult<T> = Result<T, TimelineError>;

/// Errors that can occur during timeline operations.
#[derive(Debug, Error)]
pub enum TimelineError {
    /// Writing the history to durable storage failed.
    ///
    /// The in-memory history still holds the change.
    #[error("failed to save history: {0}")]
    Persist(#[source] StorageError),

    /// The history could not be encoded.
    #[error("failed to encode history: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The live file for a restore could not be opened or written.
    #[error("failed to restore {file_name}: {reason}")]
    TargetUnavailable {
        file_name: String,
        path: PathBuf,
        reason: String,
    },

    /// Bucket width must be positive.
    #[error("invalid bucket interval: {0} ms")]
    InvalidInterval(i64),

    /// Configuration rejected at open time.
    #[error("invalid timeline configuration: {0}")]
    InvalidConfig(String),
}

impl TimelineError {
    /// Create a target unavailable error.
    pub fn target_unavailable(
        file_name: impl Into<String>,
        path: impl Into<PathBuf>,
        reason: impl Into<String>,
    ) -> Self {
        Self::TargetUnavailable {
            file_name: file_name.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Whether the in-memory state moved ahead of durable storage.
    pub fn is_persist_failure(&self) -> bool {
        matches!(self, Self::Persist(_))
    }
}
