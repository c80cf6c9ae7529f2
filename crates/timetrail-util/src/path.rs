//! Path utilities.
//!
//! This module provides utilities for working with file paths.

use std::path::{Component, Path, PathBuf};

/// File name of the history document inside the data directory.
pub const HISTORY_FILE_NAME: &str = "timeline.json";

/// Get the timetrail configuration directory.
///
/// This follows XDG conventions on Linux/macOS:
/// - `$XDG_CONFIG_HOME/timetrail` if set
/// - `~/.config/timetrail` otherwise
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("timetrail"))
}

/// Get the timetrail data directory.
///
/// This follows XDG conventions:
/// - `$XDG_DATA_HOME/timetrail` if set
/// - `~/.local/share/timetrail` otherwise
pub fn data_dir() -> Option<PathBuf> {
    dirs::data_local_dir().map(|p| p.join("timetrail"))
}

/// Default location of the persisted history.
pub fn default_history_file() -> Option<PathBuf> {
    data_dir().map(|p| p.join(HISTORY_FILE_NAME))
}

/// Check if a path is within a base directory.
pub fn is_within(path: &Path, base: &Path) -> bool {
    let canonical_path = path.canonicalize().ok();
    let canonical_base = base.canonicalize().ok();

    match (canonical_path, canonical_base) {
        (Some(p), Some(b)) => p.starts_with(&b),
        // Fall back to a lexical check when either side does not exist
        _ => normalize(path).starts_with(normalize(base)),
    }
}

/// Normalize a path by removing `.` and `..` components.
///
/// Unlike `canonicalize`, this doesn't require the path to exist.
pub fn normalize(path: &Path) -> PathBuf {
    let mut result = PathBuf::new();

    for component in path.components() {
        match component {
            Component::ParentDir => {
                result.pop();
            }
            Component::CurDir => {}
            _ => {
                result.push(component);
            }
        }
    }

    result
}

/// Resolve `path` against `base` when it is relative, then normalize.
pub fn absolutize(path: &Path, base: &Path) -> PathBuf {
    if path.is_absolute() {
        normalize(path)
    } else {
        normalize(&base.join(path))
    }
}

/// Make a path relative to a base directory.
///
/// Returns `None` if the path is not within the base directory.
pub fn relative_to(path: &Path, base: &Path) -> Option<PathBuf> {
    path.strip_prefix(base).ok().map(|p| p.to_path_buf())
}

/// Whether any component below `base` starts with a dot (`.git`, `.idea`, ...).
pub fn has_hidden_component(path: &Path, base: &Path) -> bool {
    let relative = relative_to(path, base).unwrap_or_else(|| path.to_path_buf());
    relative.components().any(|c| match c {
        Component::Normal(name) => name.to_string_lossy().starts_with('.'),
        _ => false,
    })
}
