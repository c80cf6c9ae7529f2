//! timetrail - a local timeline of file saves.
//!
//! This is the main entry point for the timetrail CLI.

mod commands;
mod config;

use clap::{Parser, Subcommand};
use commands::*;
use config::Config;
use std::path::PathBuf;
use timetrail_util::log::{LogConfig, LogLevel};

#[derive(Parser)]
#[command(name = "timetrail")]
#[command(author, version, about = "Snapshot every save, browse by time, restore any version", long_about = None)]
struct Cli {
    /// Project root; only files under it are recorded
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// History file (overrides config)
    #[arg(long, global = true)]
    history_file: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record the current content of one or more files
    Record {
        /// Files to record
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// List recorded snapshots
    List {
        /// Only show snapshots of this file
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
    /// Show snapshots grouped into time windows
    History {
        /// Window width: 1m, 2m, 5m or milliseconds
        #[arg(short, long, value_parser = parse_interval)]
        interval: Option<i64>,
        /// Print buckets as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print a snapshot's content
    Show {
        /// Snapshot index, as printed by `list`
        index: usize,
        /// Print the rendered diff instead of the content
        #[arg(long)]
        diff: bool,
    },
    /// Overwrite a file with a snapshot's content
    Restore {
        /// Snapshot index, as printed by `list`
        index: usize,
    },
    /// Delete all snapshots
    Clear,
    /// Watch the root and record every save until Ctrl-C
    Watch,
    /// Print version information
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Commands::Version = cli.command {
        print_version();
        return Ok(());
    }

    let cwd = std::env::current_dir()?;
    let root = match &cli.root {
        Some(root) => timetrail_util::path::absolutize(root, &cwd),
        None => cwd.clone(),
    };

    let (config, sources) = Config::load(Some(&root)).await?;
    init_logging(cli.verbose, &config)?;
    for source in &sources {
        tracing::debug!(path = %source.display(), "Loaded config");
    }

    let explicit = cli
        .history_file
        .as_deref()
        .map(|p| timetrail_util::path::absolutize(p, &cwd));
    let history_file = config.history_path(explicit.as_deref(), &root)?;
    tracing::debug!(
        root = %root.display(),
        history = %history_file.display(),
        "Resolved paths"
    );

    let ctx = Context {
        root,
        history_file,
        config,
    };

    match cli.command {
        Commands::Record { files } => handle_record(&ctx, files).await,
        Commands::List { file } => handle_list(&ctx, file).await,
        Commands::History { interval, json } => handle_history(&ctx, interval, json).await,
        Commands::Show { index, diff } => handle_show(&ctx, index, diff).await,
        Commands::Restore { index } => handle_restore(&ctx, index).await,
        Commands::Clear => handle_clear(&ctx).await,
        Commands::Watch => handle_watch(&ctx).await,
        Commands::Version => Ok(()),
    }
}

/// Install the tracing subscriber. `-v` means debug, otherwise the configured level.
fn init_logging(verbose: bool, config: &Config) -> anyhow::Result<()> {
    let level = if verbose {
        LogLevel::Debug
    } else {
        config.log_level().unwrap_or_default()
    };

    timetrail_util::log::init(LogConfig {
        level,
        file: config.log_file.clone(),
        ..Default::default()
    })?;
    Ok(())
}

fn print_version() {
    println!("timetrail {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("A local timeline of file saves.");
}
