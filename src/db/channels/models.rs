//! Channel database models.

/// Enable flag for a channel. Rows are never deleted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelState {
    pub channel: String,
    pub enabled: bool,
    pub updated_at: i64,
}

/// A channel added to the allow-list by an administrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EligibleChannel {
    pub channel: String,
    pub added_by: Option<String>,
    pub updated_at: i64,
}
