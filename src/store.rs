//! Persistence seam for the tracker.
//!
//! The gate, ingestion path, query engine and admin control only see
//! [`StatsStore`]; [`Database`] is the SQLite implementation.

use crate::db::{ChannelState, Database, DbError, UserStat};
use async_trait::async_trait;

#[async_trait]
pub trait StatsStore: Send + Sync {
    /// Count one message. Atomic per call.
    async fn upsert_message(&self, channel: &str, nick: &str, ts: i64) -> Result<(), DbError>;

    /// All counters for a channel, unordered.
    async fn channel_stats(&self, channel: &str) -> Result<Vec<UserStat>, DbError>;

    /// One counter, matched case-insensitively.
    async fn user_stat(&self, channel: &str, nick: &str) -> Result<Option<UserStat>, DbError>;

    /// Set the enable flag, creating the state row if needed. Idempotent.
    async fn set_channel_enabled(&self, channel: &str, enabled: bool) -> Result<(), DbError>;

    /// Stored enable state, if any.
    async fn channel_state(&self, channel: &str) -> Result<Option<ChannelState>, DbError>;

    /// Channels whose stored enable flag is set.
    async fn list_enabled_channels(&self) -> Result<Vec<String>, DbError>;

    /// Add a channel to the runtime allow-list and enable it, atomically.
    async fn admit_channel(&self, channel: &str, added_by: &str) -> Result<(), DbError>;

    /// Channels added to the allow-list at runtime.
    async fn list_eligible_channels(&self) -> Result<Vec<String>, DbError>;

    /// Whether a channel was added to the allow-list at runtime.
    async fn is_eligible_channel(&self, channel: &str) -> Result<bool, DbError>;
}

#[async_trait]
impl StatsStore for Database {
    async fn upsert_message(&self, channel: &str, nick: &str, ts: i64) -> Result<(), DbError> {
        self.stats().upsert_message(channel, nick, ts).await
    }

    async fn channel_stats(&self, channel: &str) -> Result<Vec<UserStat>, DbError> {
        self.stats().for_channel(channel).await
    }

    async fn user_stat(&self, channel: &str, nick: &str) -> Result<Option<UserStat>, DbError> {
        self.stats().find(channel, nick).await
    }

    async fn set_channel_enabled(&self, channel: &str, enabled: bool) -> Result<(), DbError> {
        self.channels().set_enabled(channel, enabled).await
    }

    async fn channel_state(&self, channel: &str) -> Result<Option<ChannelState>, DbError> {
        self.channels().find(channel).await
    }

    async fn list_enabled_channels(&self) -> Result<Vec<String>, DbError> {
        self.channels().list_enabled().await
    }

    async fn admit_channel(&self, channel: &str, added_by: &str) -> Result<(), DbError> {
        self.channels().admit(channel, added_by).await
    }

    async fn list_eligible_channels(&self) -> Result<Vec<String>, DbError> {
        Ok(self
            .channels()
            .list_eligible()
            .await?
            .into_iter()
            .map(|c| c.channel)
            .collect())
    }

    async fn is_eligible_channel(&self, channel: &str) -> Result<bool, DbError> {
        self.channels().is_eligible(channel).await
    }
}
