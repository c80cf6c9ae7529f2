//! Configuration loading for the timetrail CLI.
//!
//! Configuration is loaded from multiple sources, later ones winning:
//! 1. Global config: `~/.config/timetrail/config.json` (or `timetrail.json`, `timetrail.jsonc`)
//! 2. Environment variable: `TIMETRAIL_CONFIG_CONTENT`
//! 3. Project config: `timetrail.jsonc` or `timetrail.json` in the project root
//!
//! All files are JSONC: `//` and `/* */` comments are allowed.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use timetrail_snapshot::TimelineConfig;
use timetrail_util::log::LogLevel;

/// Environment variable holding inline config content.
pub const CONFIG_CONTENT_ENV: &str = "TIMETRAIL_CONFIG_CONTENT";

const GLOBAL_CONFIG_NAMES: &[&str] = &["config.json", "timetrail.json", "timetrail.jsonc"];
const PROJECT_CONFIG_NAMES: &[&str] = &["timetrail.jsonc", "timetrail.json"];

/// Extensions watched when none are configured.
pub const DEFAULT_WATCH_EXTENSIONS: &[&str] = &[
    "c", "cpp", "css", "go", "h", "html", "java", "js", "json", "jsx", "md", "py", "rb", "rs",
    "sh", "toml", "ts", "tsx", "txt", "yaml", "yml",
];

/// CLI configuration. Every field is optional so layers can be merged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// Where the history document lives.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history_file: Option<PathBuf>,

    /// Log level: trace, debug, info, warn or error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,

    /// Append logs to this file instead of stderr.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,

    /// Retention bound for snapshots.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_entries: Option<usize>,

    /// Default bucket width in milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bucket_interval: Option<i64>,

    /// Seed the change cache from stored history on startup.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed_cache: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub watch: Option<WatchConfig>,
}

/// Settings for `timetrail watch`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WatchConfig {
    /// File extensions (without dot) to record.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Vec<String>>,
}

impl Config {
    /// Merge another config into this one. Values set in `other` win.
    pub fn merge(mut self, other: Self) -> Self {
        if other.history_file.is_some() {
            self.history_file = other.history_file;
        }
        if other.log_level.is_some() {
            self.log_level = other.log_level;
        }
        if other.log_file.is_some() {
            self.log_file = other.log_file;
        }
        if other.max_entries.is_some() {
            self.max_entries = other.max_entries;
        }
        if other.bucket_interval.is_some() {
            self.bucket_interval = other.bucket_interval;
        }
        if other.seed_cache.is_some() {
            self.seed_cache = other.seed_cache;
        }
        if let Some(watch) = other.watch {
            let mut merged = self.watch.unwrap_or_default();
            if watch.extensions.is_some() {
                merged.extensions = watch.extensions;
            }
            self.watch = Some(merged);
        }
        self
    }

    /// Load configuration from all sources.
    ///
    /// Returns the merged config and the files it was read from.
    pub async fn load(project_dir: Option<&Path>) -> anyhow::Result<(Self, Vec<PathBuf>)> {
        let mut config = Config::default();
        let mut sources = Vec::new();

        // 1. Global config
        if let Some(global_dir) = timetrail_util::path::config_dir() {
            if let Some(path) = first_existing(&global_dir, GLOBAL_CONFIG_NAMES) {
                let loaded = Self::load_file(&path).await?;
                config = config.merge(loaded);
                sources.push(path);
            }
        }

        // 2. Environment variable
        if let Ok(content) = std::env::var(CONFIG_CONTENT_ENV) {
            let loaded = Self::parse_jsonc(&content, "<env>")?;
            config = config.merge(loaded);
        }

        // 3. Project config
        if let Some(dir) = project_dir {
            if let Some(path) = first_existing(dir, PROJECT_CONFIG_NAMES) {
                let loaded = Self::load_file(&path).await?;
                config = config.merge(loaded);
                sources.push(path);
            }
        }

        Ok((config, sources))
    }

    /// Load configuration from a single file.
    pub async fn load_file(path: &Path) -> anyhow::Result<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::parse_jsonc(&content, &path.display().to_string())
    }

    /// Parse JSONC content.
    pub fn parse_jsonc(content: &str, source: &str) -> anyhow::Result<Self> {
        let stripped = strip_comments(content);
        serde_json::from_str(&stripped).with_context(|| format!("invalid config in {source}"))
    }

    /// Engine settings, with defaults for anything unset.
    pub fn timeline_config(&self) -> TimelineConfig {
        let defaults = TimelineConfig::default();
        TimelineConfig {
            max_entries: self.max_entries.unwrap_or(defaults.max_entries),
            bucket_interval_ms: self.bucket_interval.unwrap_or(defaults.bucket_interval_ms),
            seed_cache_from_history: self.seed_cache.unwrap_or(defaults.seed_cache_from_history),
        }
    }

    /// Configured log level, if it names a known level.
    pub fn log_level(&self) -> Option<LogLevel> {
        self.log_level.as_deref().and_then(LogLevel::parse)
    }

    /// Resolve the history file: explicit override, then config, then the data dir.
    ///
    /// Relative paths are taken relative to `root`.
    pub fn history_path(&self, explicit: Option<&Path>, root: &Path) -> anyhow::Result<PathBuf> {
        let chosen = explicit
            .map(Path::to_path_buf)
            .or_else(|| self.history_file.clone())
            .or_else(timetrail_util::path::default_history_file)
            .context("could not determine a location for the history file; pass --history-file")?;
        Ok(timetrail_util::path::absolutize(&chosen, root))
    }

    /// Extensions recorded by `watch`, lowercased and without leading dots.
    pub fn watch_extensions(&self) -> Vec<String> {
        match self.watch.as_ref().and_then(|w| w.extensions.as_ref()) {
            Some(exts) => exts
                .iter()
                .map(|e| e.trim_start_matches('.').to_lowercase())
                .collect(),
            None => DEFAULT_WATCH_EXTENSIONS
                .iter()
                .map(|e| e.to_string())
                .collect(),
        }
    }
}

fn first_existing(dir: &Path, names: &[&str]) -> Option<PathBuf> {
    names.iter().map(|name| dir.join(name)).find(|p| p.exists())
}

/// Strip `//` and `/* */` comments outside of string literals.
fn strip_comments(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    let mut in_string = false;
    let mut escape_next = false;

    while let Some(c) = chars.next() {
        if escape_next {
            result.push(c);
            escape_next = false;
            continue;
        }

        if c == '\\' && in_string {
            result.push(c);
            escape_next = true;
            continue;
        }

        if c == '"' {
            in_string = !in_string;
            result.push(c);
            continue;
        }

        if !in_string && c == '/' {
            match chars.peek() {
                Some('/') => {
                    chars.next();
                    for c in chars.by_ref() {
                        if c == '\n' {
                            result.push('\n');
                            break;
                        }
                    }
                    continue;
                }
                Some('*') => {
                    chars.next();
                    let mut prev = ' ';
                    for c in chars.by_ref() {
                        if prev == '*' && c == '/' {
                            break;
                        }
                        // keep line numbers stable for error messages
                        if c == '\n' {
                            result.push('\n');
                        }
                        prev = c;
                    }
                    continue;
                }
                _ => {}
            }
        }

        result.push(c);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_line_and_block_comments() {
        let input = r#"{
            // retention
            "maxEntries": 5, /* inline */
            "historyFile": "http://not-a-comment/timeline.json"
        }"#;
        let config = Config::parse_jsonc(input, "test").unwrap();
        assert_eq!(config.max_entries, Some(5));
        assert_eq!(
            config.history_file,
            Some(PathBuf::from("http://not-a-comment/timeline.json"))
        );
    }

    #[test]
    fn escaped_quotes_do_not_end_strings() {
        let stripped = strip_comments(r#"{"a": "x\"// y"}"#);
        assert_eq!(stripped, r#"{"a": "x\"// y"}"#);
    }

    #[test]
    fn later_layers_win() {
        let global = Config {
            max_entries: Some(10),
            log_level: Some("info".to_string()),
            ..Default::default()
        };
        let project = Config {
            max_entries: Some(20),
            ..Default::default()
        };
        let merged = global.merge(project);
        assert_eq!(merged.max_entries, Some(20));
        assert_eq!(merged.log_level.as_deref(), Some("info"));
    }

    #[test]
    fn watch_extensions_merge_and_normalize() {
        let base = Config::default();
        assert!(base.watch_extensions().contains(&"rs".to_string()));

        let project = Config::parse_jsonc(r#"{"watch": {"extensions": [".MD", "txt"]}}"#, "test")
            .unwrap();
        let merged = base.merge(project);
        assert_eq!(merged.watch_extensions(), vec!["md", "txt"]);
    }

    #[test]
    fn timeline_config_falls_back_to_defaults() {
        let config = Config {
            bucket_interval: Some(60_000),
            ..Default::default()
        };
        let timeline = config.timeline_config();
        assert_eq!(timeline.max_entries, 1000);
        assert_eq!(timeline.bucket_interval_ms, 60_000);
        assert!(timeline.seed_cache_from_history);
    }

    #[test]
    fn history_path_prefers_explicit_then_config() {
        let root = Path::new("/project");
        let config = Config {
            history_file: Some(PathBuf::from(".timetrail/timeline.json")),
            ..Default::default()
        };

        let explicit = config
            .history_path(Some(Path::new("/tmp/h.json")), root)
            .unwrap();
        assert_eq!(explicit, PathBuf::from("/tmp/h.json"));

        let configured = config.history_path(None, root).unwrap();
        assert_eq!(configured, PathBuf::from("/project/.timetrail/timeline.json"));
    }

    #[test]
    fn unknown_log_level_is_ignored() {
        let config = Config {
            log_level: Some("loud".to_string()),
            ..Default::default()
        };
        assert_eq!(config.log_level(), None);
    }

    #[test]
    fn invalid_json_names_its_source() {
        let err = Config::parse_jsonc("{", "timetrail.json").unwrap_err();
        assert!(err.to_string().contains("timetrail.json"));
    }

    #[tokio::test]
    async fn project_file_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("timetrail.jsonc"),
            "{ // project\n \"seedCache\": false }",
        )
        .unwrap();

        let (config, sources) = Config::load(Some(dir.path())).await.unwrap();
        assert_eq!(config.seed_cache, Some(false));
        assert!(sources.contains(&dir.path().join("timetrail.jsonc")));
    }
}
