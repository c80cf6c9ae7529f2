//! `timetrail restore`: write a snapshot back over the live file.

use super::{entry_at, Context};

/// Restore snapshot `index`.
pub async fn handle_restore(ctx: &Context, index: usize) -> anyhow::Result<()> {
    let timeline = ctx.open_timeline().await?;
    let entry = entry_at(&timeline, index).await?;

    let report = timeline.restore_snapshot(&entry).await?;
    println!("{}", report.message());
    Ok(())
}
