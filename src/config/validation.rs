//! Configuration validation.
//!
//! Validates configuration at startup to catch common errors early.

use super::Config;
use crate::casemap::channel_key;
use std::path::Path;
use thiserror::Error;

/// Validation errors for configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("bot.nick is required")]
    MissingNick,
    #[error("bot.command_prefix cannot be empty")]
    EmptyCommandPrefix,
    #[error("channelstats.db_path parent directory does not exist: {0}")]
    DatabasePathInvalid(String),
}

/// Validate a configuration, returning all errors found.
///
/// Malformed allow-list entries are not fatal; they are logged and skipped
/// when the eligibility policy is built.
pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.bot.nick.trim().is_empty() {
        errors.push(ValidationError::MissingNick);
    }
    if config.bot.command_prefix.is_empty() {
        errors.push(ValidationError::EmptyCommandPrefix);
    }

    let db_path = config.db_path();
    if db_path != ":memory:"
        && let Some(parent) = Path::new(&db_path).parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        errors.push(ValidationError::DatabasePathInvalid(db_path.clone()));
    }

    for channel in &config.channelstats.channels {
        if channel_key(channel).is_none() {
            tracing::warn!(channel = %channel, "Ignoring invalid channel in channelstats.channels");
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
