//! `timetrail watch`: record every save under the root until interrupted.
//!
//! The notify callback runs on the watcher's own thread, so it only filters
//! events and forwards paths through a channel. Reading files and recording
//! happen on the async side.

use super::{plural, Context};
use notify::event::{CreateKind, ModifyKind, RenameMode};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use timetrail_snapshot::{RecordOutcome, Timeline};
use timetrail_storage::FileStorage;
use tokio::sync::mpsc;
use tracing::{debug, info, trace, warn};

const CHANNEL_CAPACITY: usize = 1000;

/// Filter applied to paths reported by the watcher.
#[derive(Debug, Clone)]
pub struct WatchFilter {
    root: PathBuf,
    history_file: PathBuf,
    history_temp: PathBuf,
    extensions: Vec<String>,
}

impl WatchFilter {
    pub fn new(root: PathBuf, history_file: PathBuf, extensions: Vec<String>) -> Self {
        let history_temp = FileStorage::new(&history_file).temp_path();
        Self {
            root,
            history_file,
            history_temp,
            extensions,
        }
    }

    /// Whether a changed path should be recorded.
    ///
    /// Hidden directories, the history file (and its temp sibling) and files
    /// with other extensions are ignored.
    pub fn accepts(&self, path: &Path) -> bool {
        if path == self.history_file || path == self.history_temp {
            return false;
        }
        if timetrail_util::path::has_hidden_component(path, &self.root) {
            return false;
        }
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) => self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)),
            None => false,
        }
    }
}

/// Watch the root recursively and record saves until Ctrl-C.
pub async fn handle_watch(ctx: &Context) -> anyhow::Result<()> {
    let timeline = ctx.open_timeline().await?;
    let filter = WatchFilter::new(
        ctx.root.clone(),
        ctx.history_file.clone(),
        ctx.config.watch_extensions(),
    );

    let (tx, mut rx) = mpsc::channel::<PathBuf>(CHANNEL_CAPACITY);
    // Dropping the watcher stops it, so keep it alive for the whole loop
    let _watcher = create_watcher(&ctx.root, filter, tx)?;

    println!(
        "Watching {} (history in {}). Press Ctrl-C to stop.",
        ctx.root.display(),
        ctx.history_file.display()
    );

    loop {
        tokio::select! {
            changed = rx.recv() => {
                let Some(path) = changed else { break };
                record_path(ctx, &timeline, &path).await;
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Stopping watcher");
                break;
            }
        }
    }

    println!("Stopped watching, {} in history", plural(timeline.len().await, "snapshot"));
    Ok(())
}

fn create_watcher(
    root: &Path,
    filter: WatchFilter,
    tx: mpsc::Sender<PathBuf>,
) -> anyhow::Result<RecommendedWatcher> {
    let mut watcher = RecommendedWatcher::new(
        move |res: Result<Event, notify::Error>| forward_event(res, &filter, &tx),
        notify::Config::default(),
    )?;
    watcher.watch(root, RecursiveMode::Recursive)?;
    debug!(root = %root.display(), "Started recursive watch");
    Ok(watcher)
}

fn forward_event(
    res: Result<Event, notify::Error>,
    filter: &WatchFilter,
    tx: &mpsc::Sender<PathBuf>,
) {
    let event = match res {
        Ok(event) => event,
        Err(e) => {
            warn!(error = %e, "File watcher error");
            return;
        }
    };

    for path in saved_paths(event) {
        if !filter.accepts(&path) {
            continue;
        }
        // never block the notify thread
        if let Err(e) = tx.try_send(path) {
            warn!(error = %e, "Dropped file event, channel full");
        }
    }
}

/// Paths whose contents were just saved, according to one watcher event.
///
/// Editors that save atomically write a temp file and rename it over the
/// target, so a rename counts as a save of its destination.
fn saved_paths(event: Event) -> Vec<PathBuf> {
    match event.kind {
        EventKind::Create(CreateKind::File | CreateKind::Any)
        | EventKind::Modify(ModifyKind::Data(_) | ModifyKind::Any)
        | EventKind::Modify(ModifyKind::Name(RenameMode::To | RenameMode::Any)) => event.paths,
        // paths are [from, to]
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => {
            event.paths.into_iter().last().into_iter().collect()
        }
        kind => {
            trace!(?kind, "Ignoring event kind");
            Vec::new()
        }
    }
}

async fn record_path(ctx: &Context, timeline: &Timeline, path: &Path) {
    let tracked = match ctx.trackable(path).await {
        Ok(tracked) => tracked,
        Err(reason) => {
            debug!(path = %path.display(), reason = %reason, "Not recording");
            return;
        }
    };

    match timeline
        .record_change(&tracked.path, &tracked.name, &tracked.text)
        .await
    {
        Ok(RecordOutcome::Recorded(entry)) => println!(
            "Recorded {} ({})",
            entry.file_name,
            plural(entry.change_count, "change")
        ),
        Ok(RecordOutcome::Unchanged) => {}
        Err(e) => eprintln!("Warning: {e}"),
    }
}
