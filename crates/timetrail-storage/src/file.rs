//! File-based storage implementation.
//!
//! The document lives in a single file. Writes go to a sibling temp file
//! (`timeline.json.tmp`) which is then renamed over the target, so a crash or
//! a failed write never leaves a truncated document behind.

use crate::{Storage, StorageError, StorageResult};
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use timetrail_util::TimingGuard;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

/// Single-file storage.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    /// Create a new file storage backed by `path`.
    ///
    /// Nothing is touched on disk until the first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of the temp file used for atomic replacement.
    pub fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| OsString::from("storage"));
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl Storage for FileStorage {
    async fn read(&self) -> StorageResult<Option<String>> {
        debug!(path = %self.path.display(), "Reading from storage");

        match fs::read_to_string(&self.path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::Io(e)),
        }
    }

    async fn write(&self, contents: &str) -> StorageResult<()> {
        let _timing = TimingGuard::storage(self.path.display().to_string());
        debug!(path = %self.path.display(), bytes = contents.len(), "Writing to storage");

        if self.path.file_name().is_none() {
            return Err(StorageError::invalid_location(format!(
                "{} has no file name",
                self.path.display()
            )));
        }

        // Create parent directories
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        // Write atomically (write to temp file, then rename)
        let temp_path = self.temp_path();
        let result = async {
            let mut file = fs::File::create(&temp_path).await?;
            file.write_all(contents.as_bytes()).await?;
            file.sync_all().await?;
            drop(file);
            fs::rename(&temp_path, &self.path).await
        }
        .await;

        if let Err(e) = result {
            if let Err(cleanup) = fs::remove_file(&temp_path).await {
                if cleanup.kind() != std::io::ErrorKind::NotFound {
                    warn!(path = %temp_path.display(), error = %cleanup, "Failed to remove temp file");
                }
            }
            return Err(StorageError::Io(e));
        }

        Ok(())
    }

    async fn exists(&self) -> StorageResult<bool> {
        Ok(fs::try_exists(&self.path).await?)
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}
