//! Unified error handling for the tracker.
//!
//! [`StatsError`] covers every failure a caller of the query engine or
//! admin control can see. Expected outcomes (permission, presence,
//! eligibility, missing stats) turn into plain reply text; store failures
//! are logged by whoever drops them.

use crate::db::DbError;
use thiserror::Error;

/// Errors returned by tracker operations.
#[derive(Debug, Error)]
pub enum StatsError {
    #[error("permission denied")]
    PermissionDenied,

    #[error("not in channel: {0}")]
    NotInChannel(String),

    #[error("channel not eligible: {channel}")]
    NotEligible {
        channel: String,
        /// Current allow-list, reported back to the admin.
        eligible: Vec<String>,
    },

    #[error("no stats for {nick} in {channel}")]
    NotFound { nick: String, channel: String },

    #[error("monitoring not enabled in {0}")]
    NotMonitored(String),

    #[error("store failure: {0}")]
    StoreFailure(#[from] DbError),
}

impl StatsError {
    /// Get a static error code string for log labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::PermissionDenied => "permission_denied",
            Self::NotInChannel(_) => "not_in_channel",
            Self::NotEligible { .. } => "not_eligible",
            Self::NotFound { .. } => "not_found",
            Self::NotMonitored(_) => "not_monitored",
            Self::StoreFailure(_) => "store_failure",
        }
    }

    /// Whether this is an ordinary refusal rather than a malfunction.
    pub fn is_expected(&self) -> bool {
        !matches!(self, Self::StoreFailure(_))
    }

    /// Text reported back to the caller.
    pub fn to_reply(&self) -> String {
        match self {
            Self::PermissionDenied => "Only bot admins can do that.".to_string(),
            Self::NotInChannel(channel) => format!("I'm not currently in {}.", channel),
            Self::NotEligible { channel, eligible } => {
                let current = if eligible.is_empty() {
                    "(none configured)".to_string()
                } else {
                    eligible.join(", ")
                };
                format!(
                    "{} is not in the eligible channel list in config. Eligible: {}. Add it under [channelstats] channels.",
                    channel, current
                )
            }
            Self::NotFound { nick, channel } => format!("No stats for {} in {} yet.", nick, channel),
            Self::NotMonitored(_) => "Monitoring is not enabled in this channel.".to_string(),
            Self::StoreFailure(_) => "Stats storage is unavailable right now, try again later.".to_string(),
        }
    }
}

/// Result type for tracker operations.
pub type StatsResult<T> = Result<T, StatsError>;
