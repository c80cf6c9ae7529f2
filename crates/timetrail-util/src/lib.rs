//! Shared utilities for timetrail.
//!
//! This crate provides common utilities used across the timetrail workspace:
//! - Logging setup with tracing
//! - Path utilities (XDG directories, project containment checks)
//! - Millisecond timestamp helpers
//! - RAII-based timing for operation measurement

pub mod log;
pub mod path;
pub mod time;
pub mod timing;

pub use time::{format_millis, now_millis};
pub use timing::TimingGuard;
