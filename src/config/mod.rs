//! Configuration loading and management.
//!
//! - [`types`]: config struct definitions and TOML loading
//! - [`validation`]: startup checks that report every problem at once

mod types;
pub mod validation;

pub use types::{BotConfig, ChannelStatsConfig, Config, ConfigError};
