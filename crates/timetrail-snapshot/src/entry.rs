//! Snapshot data structures.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One recorded save of one file.
///
/// Entries are immutable: they are only ever appended to or evicted from the
/// history, never edited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotEntry {
    /// Capture time in milliseconds since the Unix epoch.
    pub timestamp: i64,

    /// Path identifying the tracked file.
    pub file_path: PathBuf,

    /// Display name, fixed when the entry was created.
    pub file_name: String,

    /// Full text of the file at capture time.
    pub content: String,

    /// How many lines changed relative to the previous snapshot (at least 1).
    pub change_count: usize,

    /// Rendered diff against the previous snapshot of the same file.
    ///
    /// Absent for the first snapshot of a file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diff: Option<String>,
}

impl SnapshotEntry {
    /// Check if this entry belongs to `path`.
    pub fn is_for(&self, path: &Path) -> bool {
        self.file_path == path
    }

    /// Whether the entry satisfies the stored-entry invariants.
    pub(crate) fn is_well_formed(&self) -> bool {
        self.change_count >= 1
    }
}

/// Display name for a path: its final component, or the whole path when it has none.
pub fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
