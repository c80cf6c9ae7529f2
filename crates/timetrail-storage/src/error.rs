//! Storage error types.

use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// IO error (permission denied, disk full, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The storage location is unusable (no parent directory, is a directory, ...)
    #[error("Invalid storage location: {0}")]
    InvalidLocation(String),

    /// Storage is read-only
    #[error("Storage is read-only")]
    ReadOnly,

    /// Lock was poisoned (another thread panicked while holding the lock)
    #[error("Lock poisoned: {0}")]
    LockPoisoned(String),
}

impl StorageError {
    /// Create an invalid location error.
    pub fn invalid_location(message: impl Into<String>) -> Self {
        Self::InvalidLocation(message.into())
    }
}
