//! Last-known content per file.

use crate::SnapshotEntry;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Text of the most recently recorded snapshot of each file.
///
/// Change scoring compares a save against this, not against the file on disk.
#[derive(Debug, Clone, Default)]
pub struct SnapshotCache {
    contents: HashMap<PathBuf, String>,
}

impl SnapshotCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a cache from history: the last entry of each path wins.
    pub fn from_entries<'a>(entries: impl IntoIterator<Item = &'a SnapshotEntry>) -> Self {
        let mut cache = Self::new();
        for entry in entries {
            cache.insert(entry.file_path.clone(), entry.content.clone());
        }
        cache
    }

    pub fn get(&self, path: &Path) -> Option<&str> {
        self.contents.get(path).map(String::as_str)
    }

    /// Whether `path` has been observed before.
    pub fn contains(&self, path: &Path) -> bool {
        self.contents.contains_key(path)
    }

    pub fn insert(&mut self, path: PathBuf, content: String) {
        self.contents.insert(path, content);
    }

    pub fn clear(&mut self) {
        self.contents.clear();
    }

    pub fn len(&self) -> usize {
        self.contents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }
}
