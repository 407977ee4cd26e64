use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::timeline::FollowPolicy;
use crate::ui::action::Action;
use crate::util::paths::config_path;

use super::default_keys::default_keybindings;
use super::keys::{KeyParseError, KeybindingConfig};

/// Example configuration file contents (bundled with the binary)
pub const EXAMPLE_CONFIG: &str = include_str!("config.toml.example");

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid key for {action}: {source}")]
    Key {
        action: String,
        #[source]
        source: KeyParseError,
    },

    #[error("Unknown action in [keys]: {0}")]
    UnknownAction(String),
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub playback: PlaybackConfig,
    pub feed: FeedConfig,
    pub keybindings: KeybindingConfig,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackConfig {
    /// Points moved by the "many" step actions
    pub step_size: usize,
    pub resume_follow_at_live_edge: bool,
    pub tick_rate_ms: u64,
    pub smooth_scroll_steps: u32,
}

impl PlaybackConfig {
    pub fn follow_policy(&self) -> FollowPolicy {
        if self.resume_follow_at_live_edge {
            FollowPolicy::ResumeAtLiveEdge
        } else {
            FollowPolicy::Sticky
        }
    }

    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.tick_rate_ms.max(1))
    }
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            step_size: 10,
            resume_follow_at_live_edge: false,
            tick_rate_ms: 33,
            smooth_scroll_steps: 8,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeedConfig {
    pub poll_interval_ms: u64,
}

impl FeedConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(10))
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 250,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            playback: PlaybackConfig::default(),
            feed: FeedConfig::default(),
            keybindings: default_keybindings(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlPlaybackConfig {
    pub step_size: Option<usize>,
    pub resume_follow_at_live_edge: Option<bool>,
    pub tick_rate_ms: Option<u64>,
    pub smooth_scroll_steps: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlFeedConfig {
    pub poll_interval_ms: Option<u64>,
}

/// TOML representation of the config file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    pub playback: Option<TomlPlaybackConfig>,
    pub feed: Option<TomlFeedConfig>,
    /// action name -> key notation
    pub keys: Option<HashMap<String, String>>,
}

/// Parse a `[keys]` table. Bad entries are returned next to the bindings
/// that did parse.
fn parse_keys(keys: &HashMap<String, String>) -> (KeybindingConfig, Vec<ConfigError>) {
    let mut config = KeybindingConfig::new();
    let mut errors = Vec::new();
    for (name, notation) in keys {
        let Some(action) = Action::from_name(name) else {
            errors.push(ConfigError::UnknownAction(name.clone()));
            continue;
        };
        if let Err(source) = config.bind(notation, action) {
            errors.push(ConfigError::Key {
                action: name.clone(),
                source,
            });
        }
    }
    (config, errors)
}

impl Config {
    /// Load from `path`, or from `~/.timeline/config.toml` when `None`.
    ///
    /// Never fails: a missing file yields defaults, an unreadable or invalid
    /// one yields defaults with a warning. The default location is seeded
    /// with the bundled example on first run.
    pub fn load(path: Option<&Path>) -> Self {
        let config_file = match path {
            Some(path) => path.to_path_buf(),
            None => {
                let default = config_path();
                if !default.exists() {
                    Self::create_default_config(&default);
                }
                default
            }
        };

        if !config_file.exists() {
            if path.is_some() {
                tracing::warn!(path = %config_file.display(), "Config file not found, using defaults");
            }
            return Config::default();
        }

        match Self::from_file(&config_file) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(path = %config_file.display(), error = %e, "Ignoring config file");
                Config::default()
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Merge a TOML document over the defaults. Invalid `[keys]` entries are
    /// logged and skipped; only a malformed document is an error.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let toml_config: TomlConfig = toml::from_str(contents)?;
        let mut config = Config::default();

        if let Some(playback) = toml_config.playback {
            if let Some(step_size) = playback.step_size {
                config.playback.step_size = step_size.max(1);
            }
            if let Some(resume) = playback.resume_follow_at_live_edge {
                config.playback.resume_follow_at_live_edge = resume;
            }
            if let Some(tick_rate_ms) = playback.tick_rate_ms {
                config.playback.tick_rate_ms = tick_rate_ms;
            }
            if let Some(steps) = playback.smooth_scroll_steps {
                config.playback.smooth_scroll_steps = steps;
            }
        }

        if let Some(feed) = toml_config.feed {
            if let Some(poll_interval_ms) = feed.poll_interval_ms {
                config.feed.poll_interval_ms = poll_interval_ms;
            }
        }

        if let Some(keys) = toml_config.keys {
            let (user_bindings, errors) = parse_keys(&keys);
            for e in errors {
                tracing::warn!(error = %e, "Skipping key binding");
            }
            config.keybindings.merge(user_bindings);
        }

        Ok(config)
    }

    fn create_default_config(path: &Path) {
        if let Some(parent) = path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                tracing::warn!(error = %e, "Failed to create config directory");
                return;
            }
        }
        if let Err(e) = fs::write(path, EXAMPLE_CONFIG) {
            tracing::warn!(error = %e, "Failed to write default config");
        }
    }

    pub fn with_resume_follow_at_live_edge(mut self, resume: bool) -> Self {
        self.playback.resume_follow_at_live_edge = resume;
        self
    }
}
