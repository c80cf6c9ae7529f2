//! `timetrail list`: flat listing of snapshots.

use super::{plural, Context};
use std::path::PathBuf;
use timetrail_util::format_millis;

/// Print every snapshot with its history index, optionally for one file.
pub async fn handle_list(ctx: &Context, file: Option<PathBuf>) -> anyhow::Result<()> {
    let timeline = ctx.open_timeline().await?;
    let filter = file.map(|f| ctx.resolve(&f));

    let entries = timeline.entries().await;
    let mut shown = 0usize;
    for (index, entry) in entries.iter().enumerate() {
        if let Some(path) = &filter {
            if !entry.is_for(path) {
                continue;
            }
        }
        println!(
            "{:>4}  {}  {}  {}",
            index,
            format_millis(entry.timestamp),
            entry.file_name,
            plural(entry.change_count, "change")
        );
        shown += 1;
    }

    if shown == 0 {
        println!("No snapshots recorded");
    }
    Ok(())
}
