//! Snapshot history engine for timetrail.
//!
//! This crate keeps a chronological history of text files:
//! - Every recorded save stores a full snapshot plus a rendered diff
//! - A positional line scan scores how much changed
//! - History is bounded (oldest snapshots are evicted first) and persisted
//! - Snapshots can be grouped into fixed time windows for display
//! - Any snapshot can be written back over the live file
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use timetrail_snapshot::{Timeline, TimelineConfig};
//! use timetrail_storage::FileStorage;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let storage = Arc::new(FileStorage::new("/tmp/timetrail/timeline.json"));
//! let timeline = Timeline::open(storage, TimelineConfig::default()).await?;
//!
//! // A save event from the host
//! timeline
//!     .record_change("/project/notes.txt", "notes.txt", "hello\nworld\n")
//!     .await?;
//!
//! // Browse in five minute windows
//! for bucket in timeline.aggregated_default().await? {
//!     println!("{}: {} changes", bucket.bucket_start, bucket.total_change_count);
//! }
//!
//! // Roll the file back to its first snapshot
//! if let Some(entry) = timeline.entry(0).await {
//!     timeline.restore_snapshot(&entry).await?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod aggregate;
pub mod cache;
pub mod clock;
pub mod config;
pub mod diff;
mod entry;
mod error;
pub mod history;
pub mod restore;
mod timeline;

pub use aggregate::{bucket, TimeBucket};
pub use cache::SnapshotCache;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::TimelineConfig;
pub use diff::{change_magnitude, differing_lines, render};
pub use entry::{file_name_of, SnapshotEntry};
pub use error::{TimelineError, TimelineResult};
pub use history::{HistoryLog, HistoryStore, LoadedHistory, MAX_ENTRIES};
pub use restore::RestoreReport;
pub use timeline::{RecordOutcome, Timeline};
