//! Channel repository for database queries.

use super::models::{ChannelState, EligibleChannel};
use crate::casemap::fold_channel;
use crate::db::DbError;
use sqlx::SqlitePool;

/// Repository for channel operations.
pub struct ChannelRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ChannelRepository<'a> {
    /// Create a new channel repository.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Set the enable flag, creating the row if absent.
    pub async fn set_enabled(&self, channel: &str, enabled: bool) -> Result<(), DbError> {
        let now = chrono::Utc::now().timestamp();

        sqlx::query(
            r#"
            INSERT INTO channel_state (channel, enabled, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(channel) DO UPDATE SET
                enabled = excluded.enabled,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(fold_channel(channel))
        .bind(enabled)
        .bind(now)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Find the enable state of a channel.
    pub async fn find(&self, channel: &str) -> Result<Option<ChannelState>, DbError> {
        let row = sqlx::query_as::<_, (String, bool, i64)>(
            r#"
            SELECT channel, enabled, updated_at
            FROM channel_state
            WHERE channel = ?
            "#,
        )
        .bind(fold_channel(channel))
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(|(channel, enabled, updated_at)| ChannelState {
            channel,
            enabled,
            updated_at,
        }))
    }

    /// Channels whose enable flag is set.
    pub async fn list_enabled(&self) -> Result<Vec<String>, DbError> {
        let rows = sqlx::query_scalar::<_, String>(
            r#"
            SELECT channel
            FROM channel_state
            WHERE enabled = 1
            ORDER BY channel
            "#,
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    /// Add a channel to the runtime allow-list and enable it.
    ///
    /// Both rows are written in one transaction, so a failure leaves the
    /// channel neither eligible nor enabled.
    pub async fn admit(&self, channel: &str, added_by: &str) -> Result<(), DbError> {
        let key = fold_channel(channel);
        let now = chrono::Utc::now().timestamp();

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO eligible_channels (channel, added_by, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(channel) DO UPDATE SET
                added_by = excluded.added_by,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&key)
        .bind(added_by)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO channel_state (channel, enabled, updated_at)
            VALUES (?, 1, ?)
            ON CONFLICT(channel) DO UPDATE SET
                enabled = 1,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&key)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(())
    }

    /// Channels added to the allow-list at runtime.
    pub async fn list_eligible(&self) -> Result<Vec<EligibleChannel>, DbError> {
        let rows = sqlx::query_as::<_, (String, Option<String>, i64)>(
            r#"
            SELECT channel, added_by, updated_at
            FROM eligible_channels
            ORDER BY channel
            "#,
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(channel, added_by, updated_at)| EligibleChannel {
                channel,
                added_by,
                updated_at,
            })
            .collect())
    }

    /// Whether a channel was added to the allow-list at runtime.
    pub async fn is_eligible(&self, channel: &str) -> Result<bool, DbError> {
        let found = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM eligible_channels WHERE channel = ?",
        )
        .bind(fold_channel(channel))
        .fetch_one(self.pool)
        .await?;

        Ok(found > 0)
    }
}
