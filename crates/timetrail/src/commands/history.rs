//! `timetrail history`: snapshots grouped into time windows.

use super::{plural, Context};
use timetrail_snapshot::aggregate::{FIVE_MINUTES_MS, ONE_MINUTE_MS, TWO_MINUTES_MS};
use timetrail_util::format_millis;
use timetrail_util::time::format_clock;

/// Parse an interval: `1m`, `2m`, `5m` or a number of milliseconds.
pub fn parse_interval(s: &str) -> Result<i64, String> {
    match s.trim() {
        "1m" => Ok(ONE_MINUTE_MS),
        "2m" => Ok(TWO_MINUTES_MS),
        "5m" => Ok(FIVE_MINUTES_MS),
        other => {
            let ms: i64 = other
                .trim_end_matches("ms")
                .parse()
                .map_err(|_| format!("invalid interval '{other}', expected 1m, 2m, 5m or milliseconds"))?;
            if ms <= 0 {
                return Err(format!("interval must be positive, got {ms}"));
            }
            Ok(ms)
        }
    }
}

/// Print aggregated history.
pub async fn handle_history(
    ctx: &Context,
    interval: Option<i64>,
    json: bool,
) -> anyhow::Result<()> {
    let timeline = ctx.open_timeline().await?;
    let interval = interval.unwrap_or(timeline.config().bucket_interval_ms);
    let buckets = timeline.aggregated_history(interval).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&buckets)?);
        return Ok(());
    }

    if buckets.is_empty() {
        println!("No snapshots recorded");
        return Ok(());
    }

    for bucket in &buckets {
        println!(
            "{} - {}  {}  ({})",
            format_millis(bucket.bucket_start),
            format_clock(bucket.bucket_end(interval)),
            plural(bucket.total_change_count, "change"),
            plural(bucket.entries.len(), "snapshot")
        );
        for entry in &bucket.entries {
            println!(
                "    {}  {}  +{}",
                format_clock(entry.timestamp),
                entry.file_name,
                entry.change_count
            );
        }
    }
    Ok(())
}
