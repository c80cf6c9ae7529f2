//! Storage layer for timetrail.
//!
//! The history is a single logical document, so the abstraction here is a
//! whole-document store rather than a key-value map:
//! - File storage (default): one file on disk, replaced atomically
//! - In-memory storage (for testing)

pub mod error;
pub mod file;
pub mod memory;

pub use error::{StorageError, StorageResult};
pub use file::FileStorage;
pub use memory::MemoryStorage;

use async_trait::async_trait;

/// A durable location holding one text document.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Read the whole document.
    ///
    /// Returns `None` if nothing has been written yet.
    async fn read(&self) -> StorageResult<Option<String>>;

    /// Replace the whole document.
    ///
    /// Implementations must be atomic: a reader sees either the previous
    /// contents or the new contents, never a partial write.
    async fn write(&self, contents: &str) -> StorageResult<()>;

    /// Check if the document exists.
    async fn exists(&self) -> StorageResult<bool>;

    /// Human-readable location, used in logs.
    fn location(&self) -> String;
}
