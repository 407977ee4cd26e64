pub mod default_keys;
pub mod keys;
mod settings;

pub use default_keys::default_keybindings;
pub use keys::{parse_key_notation, KeyCombo, KeyParseError, KeybindingConfig};
pub use settings::{Config, ConfigError, FeedConfig, PlaybackConfig, EXAMPLE_CONFIG};
