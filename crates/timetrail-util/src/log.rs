//! Logging setup using tracing.
//!
//! Library crates only emit events; the binary calls [`init`] once at startup.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Log level configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    #[default]
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }

    /// Parse a log level from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "trace" => Some(LogLevel::Trace),
            "debug" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "warn" | "warning" => Some(LogLevel::Warn),
            "error" => Some(LogLevel::Error),
            _ => None,
        }
    }
}

/// Logging configuration.
pub struct LogConfig {
    /// Whether to print logs at all.
    pub print: bool,
    /// Log level.
    pub level: LogLevel,
    /// Whether to include file/line info in logs.
    pub include_location: bool,
    /// Append to this file instead of stderr.
    pub file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            print: true,
            level: LogLevel::Warn,
            include_location: false,
            file: None,
        }
    }
}

impl LogConfig {
    /// Build the filter directive for the workspace crates at the configured level.
    pub fn directive(&self) -> String {
        let level = self.level.as_str();
        format!(
            "timetrail={level},timetrail_snapshot={level},timetrail_storage={level},timetrail_util={level}"
        )
    }
}

/// Initialize logging with the given configuration.
///
/// `RUST_LOG` takes precedence over the configured level. Calling this more
/// than once keeps the first subscriber.
pub fn init(config: LogConfig) -> std::io::Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.directive()));

    let subscriber = tracing_subscriber::registry().with(filter);

    if !config.print {
        // Spans still work, events go nowhere
        let _ = subscriber.try_init();
        return Ok(());
    }

    match &config.file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            let fmt_layer = fmt::layer()
                .with_target(true)
                .with_ansi(false)
                .with_file(config.include_location)
                .with_line_number(config.include_location)
                .with_writer(Mutex::new(file));
            let _ = subscriber.with(fmt_layer).try_init();
        }
        None => {
            let fmt_layer = fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_file(config.include_location)
                .with_line_number(config.include_location)
                .with_writer(std::io::stderr);
            let _ = subscriber.with(fmt_layer).try_init();
        }
    }

    Ok(())
}
