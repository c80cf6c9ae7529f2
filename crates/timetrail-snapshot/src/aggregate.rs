//! Fixed-width time bucketing of snapshot history.

use crate::error::{TimelineError, TimelineResult};
use crate::SnapshotEntry;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::warn;

pub const ONE_MINUTE_MS: i64 = 60_000;
pub const TWO_MINUTES_MS: i64 = 120_000;
pub const FIVE_MINUTES_MS: i64 = 300_000;

/// Bucket width used when the caller does not choose one.
pub const DEFAULT_INTERVAL_MS: i64 = FIVE_MINUTES_MS;

/// Snapshots that fall into one time window.
///
/// Built fresh for every query; never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeBucket {
    /// Window start, a multiple of the interval in milliseconds since the epoch.
    pub bucket_start: i64,
    /// Sum of `change_count` over `entries`.
    pub total_change_count: usize,
    /// Entries in history order.
    pub entries: Vec<SnapshotEntry>,
}

impl TimeBucket {
    /// Exclusive end of the window.
    pub fn bucket_end(&self, interval_ms: i64) -> i64 {
        self.bucket_start.saturating_add(interval_ms)
    }
}

/// Window start for `timestamp`, rounding toward negative infinity.
///
/// `None` when the start is not representable, which only happens for
/// timestamps within one interval of `i64::MIN`.
pub fn bucket_start(timestamp: i64, interval_ms: i64) -> Option<i64> {
    timestamp.div_euclid(interval_ms).checked_mul(interval_ms)
}

/// Group `entries` into windows of `interval_ms`.
///
/// Output is sparse and sorted by window start. Entries keep their relative
/// order inside a window. Entries with a zero change count can only come from
/// a tampered history and are skipped.
pub fn bucket<'a>(
    entries: impl IntoIterator<Item = &'a SnapshotEntry>,
    interval_ms: i64,
) -> TimelineResult<Vec<TimeBucket>> {
    if interval_ms <= 0 {
        return Err(TimelineError::InvalidInterval(interval_ms));
    }

    let mut windows: BTreeMap<i64, TimeBucket> = BTreeMap::new();
    for entry in entries {
        if !entry.is_well_formed() {
            warn!(
                file = %entry.file_name,
                timestamp = entry.timestamp,
                "Skipping malformed snapshot during aggregation"
            );
            continue;
        }

        let Some(start) = bucket_start(entry.timestamp, interval_ms) else {
            warn!(
                file = %entry.file_name,
                timestamp = entry.timestamp,
                interval_ms,
                "Skipping snapshot whose window start overflows"
            );
            continue;
        };
        let window = windows.entry(start).or_insert_with(|| TimeBucket {
            bucket_start: start,
            total_change_count: 0,
            entries: Vec::new(),
        });
        window.total_change_count += entry.change_count;
        window.entries.push(entry.clone());
    }

    Ok(windows.into_values().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn entry(timestamp: i64, change_count: usize) -> SnapshotEntry {
        SnapshotEntry {
            timestamp,
            file_path: PathBuf::from("/work/a.txt"),
            file_name: "a.txt".to_string(),
            content: format!("at {timestamp}"),
            change_count,
            diff: None,
        }
    }

    #[test]
    fn groups_into_five_minute_windows() {
        let entries = vec![entry(0, 2), entry(100_000, 3), entry(400_000, 5)];
        let buckets = bucket(&entries, DEFAULT_INTERVAL_MS).unwrap();

        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].bucket_start, 0);
        assert_eq!(buckets[0].total_change_count, 5);
        assert_eq!(buckets[0].entries, entries[..2]);
        assert_eq!(buckets[1].bucket_start, 300_000);
        assert_eq!(buckets[1].total_change_count, 5);
        assert_eq!(buckets[1].entries, entries[2..]);
    }

    #[test]
    fn keeps_history_order_inside_a_window() {
        // out of timestamp order, as after a clock step backwards
        let entries = vec![entry(50_000, 1), entry(10_000, 1), entry(30_000, 1)];
        let buckets = bucket(&entries, ONE_MINUTE_MS).unwrap();

        assert_eq!(buckets.len(), 1);
        let stamps: Vec<i64> = buckets[0].entries.iter().map(|e| e.timestamp).collect();
        assert_eq!(stamps, vec![50_000, 10_000, 30_000]);
    }

    #[test]
    fn output_is_sparse_and_ascending() {
        let entries = vec![entry(700_000, 1), entry(0, 1), entry(10 * ONE_MINUTE_MS, 1)];
        let buckets = bucket(&entries, ONE_MINUTE_MS).unwrap();

        let starts: Vec<i64> = buckets.iter().map(|b| b.bucket_start).collect();
        assert_eq!(starts, vec![0, 600_000, 660_000]);
    }

    #[test]
    fn completeness_holds_for_every_preset() {
        let entries: Vec<SnapshotEntry> = (0..200)
            .map(|i| entry(i * 7_919, (i % 4 + 1) as usize))
            .collect();
        let expected: usize = entries.iter().map(|e| e.change_count).sum();

        for interval in [ONE_MINUTE_MS, TWO_MINUTES_MS, FIVE_MINUTES_MS, 1] {
            let buckets = bucket(&entries, interval).unwrap();
            let total: usize = buckets.iter().map(|b| b.total_change_count).sum();
            let count: usize = buckets.iter().map(|b| b.entries.len()).sum();
            assert_eq!(total, expected);
            assert_eq!(count, entries.len());
            for b in &buckets {
                assert_eq!(b.bucket_start % interval, 0);
                assert!(b
                    .entries
                    .iter()
                    .all(|e| e.timestamp >= b.bucket_start && e.timestamp < b.bucket_end(interval)));
            }
        }
    }

    #[test]
    fn negative_timestamps_round_down() {
        assert_eq!(bucket_start(-1, ONE_MINUTE_MS), Some(-60_000));
        assert_eq!(bucket_start(-60_000, ONE_MINUTE_MS), Some(-60_000));
        assert_eq!(bucket_start(59_999, ONE_MINUTE_MS), Some(0));
    }

    #[test]
    fn unrepresentable_window_start_is_skipped() {
        assert_eq!(bucket_start(i64::MIN, FIVE_MINUTES_MS), None);
        assert_eq!(bucket_start(i64::MAX, FIVE_MINUTES_MS), Some(i64::MAX - i64::MAX % FIVE_MINUTES_MS));

        let entries = vec![entry(i64::MIN, 3), entry(0, 2)];
        let buckets = bucket(&entries, FIVE_MINUTES_MS).unwrap();
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].bucket_start, 0);
        assert_eq!(buckets[0].total_change_count, 2);
    }

    #[test]
    fn empty_history_has_no_buckets() {
        let buckets = bucket(&Vec::<SnapshotEntry>::new(), ONE_MINUTE_MS).unwrap();
        assert!(buckets.is_empty());
    }

    #[test]
    fn malformed_entries_are_skipped() {
        let entries = vec![entry(0, 2), entry(1_000, 0), entry(2_000, 1)];
        let buckets = bucket(&entries, ONE_MINUTE_MS).unwrap();
        assert_eq!(buckets[0].entries.len(), 2);
        assert_eq!(buckets[0].total_change_count, 3);
    }

    #[test]
    fn rejects_non_positive_interval() {
        let entries = vec![entry(0, 1)];
        assert!(matches!(
            bucket(&entries, 0),
            Err(TimelineError::InvalidInterval(0))
        ));
        assert!(bucket(&entries, -5).is_err());
    }
}
