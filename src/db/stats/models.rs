//! Counter database models.

/// Per-channel per-nick activity counter.
///
/// Timestamps are unix seconds (UTC).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserStat {
    pub channel: String,
    /// Nick as first seen, for display.
    pub nick: String,
    pub message_count: i64,
    pub first_seen: i64,
    pub last_seen: i64,
}
