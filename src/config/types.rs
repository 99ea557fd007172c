//! Core configuration types and loading.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Tracker configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Identity of the tracking bot.
    pub bot: BotConfig,
    /// Channel tracking policy and storage.
    #[serde(default)]
    pub channelstats: ChannelStatsConfig,
    /// Directory of the file this config was loaded from.
    #[serde(skip)]
    pub source_dir: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&content)?;
        config.source_dir = path
            .canonicalize()
            .ok()
            .and_then(|p| p.parent().map(Path::to_path_buf));
        Ok(config)
    }

    /// Database location with relative paths anchored at the config directory.
    pub fn db_path(&self) -> String {
        self.channelstats.resolve_db_path(self.source_dir.as_deref())
    }
}

/// Bot identity configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct BotConfig {
    /// The bot's own nickname. Messages from this nick are never counted.
    pub nick: String,
    /// Nicknames allowed to run `.monitor` (case-insensitive).
    #[serde(default)]
    pub admins: Vec<String>,
    /// Prefix that marks a message as a command (default: ".").
    #[serde(default = "default_command_prefix")]
    pub command_prefix: String,
}

/// Channel tracking configuration (`[channelstats]`).
#[derive(Debug, Clone, Deserialize)]
pub struct ChannelStatsConfig {
    /// Static allow-list of channels that may be tracked.
    #[serde(default)]
    pub channels: Vec<String>,
    /// Allow admins to add channels outside the allow-list with `.monitor on`.
    #[serde(default)]
    pub allow_admin_add: bool,
    /// SQLite database file (default: "monitor.db").
    /// Relative paths are resolved next to the config file.
    #[serde(default = "default_db_path")]
    pub db_path: String,
    /// Track allow-listed channels until explicitly disabled.
    #[serde(default)]
    pub default_enabled: bool,
}

impl Default for ChannelStatsConfig {
    fn default() -> Self {
        Self {
            channels: Vec::new(),
            allow_admin_add: false,
            db_path: default_db_path(),
            default_enabled: false,
        }
    }
}

impl ChannelStatsConfig {
    /// Resolve `db_path` against `base_dir`, or the working directory when unknown.
    pub fn resolve_db_path(&self, base_dir: Option<&Path>) -> String {
        if self.db_path == ":memory:" || Path::new(&self.db_path).is_absolute() {
            return self.db_path.clone();
        }

        let base = base_dir
            .map(Path::to_path_buf)
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_default();
        base.join(&self.db_path).to_string_lossy().into_owned()
    }
}

fn default_command_prefix() -> String {
    ".".to_string()
}

fn default_db_path() -> String {
    "monitor.db".to_string()
}
