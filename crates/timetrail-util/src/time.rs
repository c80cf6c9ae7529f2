//! Millisecond timestamp helpers.
//!
//! Snapshots carry plain `i64` milliseconds since the Unix epoch; these
//! helpers convert to and from chrono for display.

use chrono::{DateTime, Local, Utc};

/// Current wall-clock time in milliseconds since the Unix epoch.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Convert milliseconds since the epoch into a UTC datetime.
pub fn to_datetime(ms: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(ms)
}

/// Format a millisecond timestamp in local time (`2024-05-01 14:03:22`).
pub fn format_millis(ms: i64) -> String {
    match to_datetime(ms) {
        Some(dt) => dt
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string(),
        None => format!("<invalid timestamp {ms}>"),
    }
}

/// Format a millisecond timestamp as local clock time only (`14:03`).
pub fn format_clock(ms: i64) -> String {
    match to_datetime(ms) {
        Some(dt) => dt.with_timezone(&Local).format("%H:%M").to_string(),
        None => "--:--".to_string(),
    }
}
