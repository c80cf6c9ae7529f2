//! `timetrail clear`: drop all history.

use super::Context;

pub async fn handle_clear(ctx: &Context) -> anyhow::Result<()> {
    let timeline = ctx.open_timeline().await?;
    timeline.clear_history().await?;
    println!("Timeline history cleared");
    Ok(())
}
