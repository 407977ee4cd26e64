//! Data directory layout (`~/.timeline` unless overridden)

use std::path::PathBuf;
use std::sync::OnceLock;

static DATA_DIR: OnceLock<PathBuf> = OnceLock::new();

/// Set the data directory. Call once, before any other path function; later
/// calls are ignored.
pub fn init_data_dir(custom_path: Option<PathBuf>) {
    let path = custom_path.unwrap_or_else(default_data_dir);
    if DATA_DIR.set(path.clone()).is_err() {
        tracing::debug!(path = %path.display(), "Data directory already initialized");
    }
}

fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".timeline"))
        .unwrap_or_else(|| PathBuf::from(".timeline"))
}

pub fn data_dir() -> PathBuf {
    DATA_DIR.get().cloned().unwrap_or_else(default_data_dir)
}

pub fn logs_dir() -> PathBuf {
    data_dir().join("logs")
}

/// `~/.timeline/logs/timeline.log`
pub fn log_file_path() -> PathBuf {
    logs_dir().join("timeline.log")
}

/// `~/.timeline/config.toml`
pub fn config_path() -> PathBuf {
    data_dir().join("config.toml")
}
