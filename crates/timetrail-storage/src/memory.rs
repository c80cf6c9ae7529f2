//! In-memory storage implementation for testing.

use crate::{Storage, StorageError, StorageResult};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::RwLock;

/// In-memory storage for testing.
///
/// This stores the document in memory and is not persistent. It can be
/// switched to read-only to simulate a failing disk.
#[derive(Default)]
pub struct MemoryStorage {
    data: RwLock<Option<String>>,
    read_only: AtomicBool,
    writes: AtomicUsize,
}

impl MemoryStorage {
    /// Create a new, empty in-memory storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an in-memory storage that already holds `contents`.
    pub fn with_contents(contents: impl Into<String>) -> Self {
        Self {
            data: RwLock::new(Some(contents.into())),
            ..Self::default()
        }
    }

    /// Make subsequent writes fail with [`StorageError::ReadOnly`].
    pub fn set_read_only(&self, read_only: bool) {
        self.read_only.store(read_only, Ordering::SeqCst);
    }

    /// Number of successful writes so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Snapshot of the current contents.
    pub fn contents(&self) -> Option<String> {
        self.data.read().ok().and_then(|data| data.clone())
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn read(&self) -> StorageResult<Option<String>> {
        let data = self
            .data
            .read()
            .map_err(|e| StorageError::LockPoisoned(e.to_string()))?;
        Ok(data.clone())
    }

    async fn write(&self, contents: &str) -> StorageResult<()> {
        if self.read_only.load(Ordering::SeqCst) {
            return Err(StorageError::ReadOnly);
        }

        let mut data = self
            .data
            .write()
            .map_err(|e| StorageError::LockPoisoned(e.to_string()))?;
        *data = Some(contents.to_string());
        self.writes.fetch_add(1, Ordering::SeqCst);

        Ok(())
    }

    async fn exists(&self) -> StorageResult<bool> {
        let data = self
            .data
            .read()
            .map_err(|e| StorageError::LockPoisoned(e.to_string()))?;
        Ok(data.is_some())
    }

    fn location(&self) -> String {
        "<memory>".to_string()
    }
}
