//! Types and traits supplied by whatever hosts the tracker.

/// A message seen in a channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageEvent {
    pub channel: String,
    pub sender_nick: String,
    /// Unix seconds, UTC.
    pub timestamp: i64,
    /// Sent by the tracking bot itself.
    pub is_from_self: bool,
}

impl MessageEvent {
    pub fn new(channel: impl Into<String>, sender_nick: impl Into<String>, timestamp: i64) -> Self {
        Self {
            channel: channel.into(),
            sender_nick: sender_nick.into(),
            timestamp,
            is_from_self: false,
        }
    }

    pub fn from_self(mut self) -> Self {
        self.is_from_self = true;
        self
    }
}

/// Predicates answered by the hosting runtime.
pub trait HostContext: Send + Sync {
    /// Whether `nick` may run admin commands.
    fn is_admin(&self, nick: &str) -> bool;

    /// Whether the bot is currently joined to `channel`.
    fn is_present(&self, channel: &str) -> bool;
}
