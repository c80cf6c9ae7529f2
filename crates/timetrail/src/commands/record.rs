//! `timetrail record`: snapshot files as a save event would.

use super::{plural, Context};
use std::path::PathBuf;
use timetrail_snapshot::RecordOutcome;
use tracing::warn;

/// Record the current text of each file.
pub async fn handle_record(ctx: &Context, files: Vec<PathBuf>) -> anyhow::Result<()> {
    let timeline = ctx.open_timeline().await?;
    let mut skipped = 0usize;
    let mut failed = 0usize;

    for file in files {
        let path = ctx.resolve(&file);
        let tracked = match ctx.trackable(&path).await {
            Ok(tracked) => tracked,
            Err(reason) => {
                eprintln!("Skipping {}: {reason}", file.display());
                skipped += 1;
                continue;
            }
        };

        match timeline
            .record_change(&tracked.path, &tracked.name, &tracked.text)
            .await
        {
            Ok(RecordOutcome::Recorded(entry)) => {
                println!(
                    "Recorded {} ({})",
                    entry.file_name,
                    plural(entry.change_count, "change")
                );
            }
            Ok(RecordOutcome::Unchanged) => println!("No changes in {}", tracked.name),
            Err(e) => {
                eprintln!("Failed to record {}: {e}", tracked.name);
                failed += 1;
            }
        }
    }

    if skipped + failed > 0 {
        warn!(skipped, failed, "Some files were not recorded");
        anyhow::bail!("{} not recorded", plural(skipped + failed, "file"));
    }
    Ok(())
}
