//! `timetrail show`: print one snapshot.

use super::{entry_at, Context};

/// Print the content of snapshot `index`, or its rendered diff.
pub async fn handle_show(ctx: &Context, index: usize, diff: bool) -> anyhow::Result<()> {
    let timeline = ctx.open_timeline().await?;
    let entry = entry_at(&timeline, index).await?;

    if !diff {
        print!("{}", entry.content);
        return Ok(());
    }

    match &entry.diff {
        Some(html) => println!("{html}"),
        None => println!("No diff: first snapshot of {}", entry.file_name),
    }
    Ok(())
}
