//! Command handlers for the timetrail CLI.

pub mod clear;
pub mod history;
pub mod list;
pub mod record;
pub mod restore;
pub mod show;
pub mod watch;

pub use clear::*;
pub use history::*;
pub use list::*;
pub use record::*;
pub use restore::*;
pub use show::*;
pub use watch::*;

use crate::config::Config;
use anyhow::Context as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use timetrail_snapshot::{file_name_of, SnapshotEntry, Timeline};
use timetrail_storage::FileStorage;

/// Resolved settings shared by every command.
pub struct Context {
    /// Project root; only files under it are recorded.
    pub root: PathBuf,
    pub history_file: PathBuf,
    pub config: Config,
}

impl Context {
    /// Open the timeline, surfacing a load warning on stderr.
    pub async fn open_timeline(&self) -> anyhow::Result<Timeline> {
        let storage = Arc::new(FileStorage::new(&self.history_file));
        let timeline = Timeline::open(storage, self.config.timeline_config())
            .await
            .context("failed to open timeline")?;
        if let Some(warning) = timeline.load_warning() {
            eprintln!("Warning: {warning}");
        }
        Ok(timeline)
    }

    /// Absolute form of a user-supplied path.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        let base = std::env::current_dir().unwrap_or_else(|_| self.root.clone());
        timetrail_util::path::absolutize(path, &base)
    }

    /// Check that `path` may be recorded and read its text.
    ///
    /// A trackable file exists, is a regular file under the root, is not the
    /// history file itself and holds UTF-8 text.
    pub async fn trackable(&self, path: &Path) -> Result<TrackedFile, String> {
        if !timetrail_util::path::is_within(path, &self.root) {
            return Err(format!("not under {}", self.root.display()));
        }
        if path == self.history_file {
            return Err("is the history file".to_string());
        }

        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|_| "file does not exist".to_string())?;
        if !metadata.is_file() {
            return Err("not a regular file".to_string());
        }

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| format!("could not read file: {e}"))?;
        let text = String::from_utf8(bytes).map_err(|_| "not a UTF-8 text file".to_string())?;

        Ok(TrackedFile {
            path: path.to_path_buf(),
            name: file_name_of(path),
            text,
        })
    }
}

/// A file that passed the trackability check.
#[derive(Debug)]
pub struct TrackedFile {
    pub path: PathBuf,
    pub name: String,
    pub text: String,
}

/// Look up a snapshot by its history index.
pub async fn entry_at(timeline: &Timeline, index: usize) -> anyhow::Result<SnapshotEntry> {
    match timeline.entry(index).await {
        Some(entry) => Ok(entry),
        None => anyhow::bail!(
            "no snapshot at index {index} (history has {} entries)",
            timeline.len().await
        ),
    }
}

/// "1 change" / "3 changes".
pub fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{count} {noun}")
    } else {
        format!("{count} {noun}s")
    }
}
