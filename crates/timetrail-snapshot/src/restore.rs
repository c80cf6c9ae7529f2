//! Restore a live file from a stored snapshot.

use crate::error::{TimelineError, TimelineResult};
use crate::SnapshotEntry;
use std::io;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

/// Feedback for a successful restore.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestoreReport {
    pub file_name: String,
    /// Timestamp of the snapshot that was written back.
    pub timestamp: i64,
}

impl RestoreReport {
    /// Short message for the user, e.g. `Restored notes.txt to 2024-01-01 12:00:00`.
    pub fn message(&self) -> String {
        format!(
            "Restored {} to {}",
            self.file_name,
            timetrail_util::format_millis(self.timestamp)
        )
    }
}

/// Overwrite the live file at `entry.file_path` with `entry.content`.
///
/// The file must already exist; restore never creates files. Any unsaved
/// content in the live file is lost.
///
/// The live file is only cut to the snapshot's length after the new content
/// is written, so an open or permission failure leaves it untouched. A write
/// that fails partway can still leave the file partially overwritten.
pub async fn restore(entry: &SnapshotEntry) -> TimelineResult<RestoreReport> {
    let unavailable =
        |reason: String| TimelineError::target_unavailable(&entry.file_name, &entry.file_path, reason);

    let metadata = tokio::fs::metadata(&entry.file_path)
        .await
        .map_err(|e| unavailable(describe(&e)))?;
    if metadata.is_dir() {
        return Err(unavailable("path is a directory".to_string()));
    }

    let mut file = OpenOptions::new()
        .write(true)
        .create(false)
        .open(&entry.file_path)
        .await
        .map_err(|e| unavailable(describe(&e)))?;

    file.write_all(entry.content.as_bytes())
        .await
        .map_err(|e| unavailable(describe(&e)))?;
    file.flush().await.map_err(|e| unavailable(describe(&e)))?;
    file.set_len(entry.content.len() as u64)
        .await
        .map_err(|e| unavailable(describe(&e)))?;

    debug!(
        path = %entry.file_path.display(),
        bytes = entry.content.len(),
        "Wrote snapshot content"
    );
    info!(
        file = %entry.file_name,
        timestamp = entry.timestamp,
        "Restored snapshot"
    );

    Ok(RestoreReport {
        file_name: entry.file_name.clone(),
        timestamp: entry.timestamp,
    })
}

fn describe(err: &io::Error) -> String {
    match err.kind() {
        io::ErrorKind::NotFound => "file no longer exists".to_string(),
        io::ErrorKind::PermissionDenied => "permission denied".to_string(),
        _ => err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use tempfile::TempDir;

    fn entry_for(path: &Path, content: &str) -> SnapshotEntry {
        SnapshotEntry {
            timestamp: 1_700_000_000_000,
            file_path: path.to_path_buf(),
            file_name: crate::file_name_of(path),
            content: content.to_string(),
            change_count: 1,
            diff: None,
        }
    }

    #[tokio::test]
    async fn overwrites_entire_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "Y is a much longer live body\nwith two lines\n").unwrap();

        let report = restore(&entry_for(&path, "X")).await.unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "X");
        assert_eq!(report.file_name, "notes.txt");
        assert_eq!(report.timestamp, 1_700_000_000_000);
    }

    #[tokio::test]
    async fn longer_snapshot_replaces_shorter_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "short").unwrap();

        let content = "line one\nline two\nline three\n";
        restore(&entry_for(&path, content)).await.unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), content);
    }

    #[tokio::test]
    async fn restores_empty_snapshot() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.txt");
        std::fs::write(&path, "something").unwrap();

        restore(&entry_for(&path, "")).await.unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "");
    }

    #[tokio::test]
    async fn missing_file_is_not_created() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("gone.txt");

        let err = restore(&entry_for(&path, "X")).await.unwrap_err();

        assert_eq!(
            err.to_string(),
            "failed to restore gone.txt: file no longer exists"
        );
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn directory_target_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sub");
        std::fs::create_dir(&path).unwrap();

        let err = restore(&entry_for(&path, "X")).await.unwrap_err();
        assert!(matches!(err, TimelineError::TargetUnavailable { .. }));
        assert!(err.to_string().contains("directory"));
    }

    #[test]
    fn report_message_names_file() {
        let report = RestoreReport {
            file_name: "notes.txt".to_string(),
            timestamp: 0,
        };
        assert!(report.message().starts_with("Restored notes.txt to "));
    }
}
