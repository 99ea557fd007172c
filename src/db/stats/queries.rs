//! Counter repository for database queries.

use super::models::UserStat;
use crate::casemap::{fold_channel, irc_to_lower};
use crate::db::DbError;
use sqlx::SqlitePool;

type UserStatRow = (String, String, i64, i64, i64);

fn row_to_stat((channel, nick, message_count, first_seen, last_seen): UserStatRow) -> UserStat {
    UserStat {
        channel,
        nick,
        message_count,
        first_seen,
        last_seen,
    }
}

/// Repository for counter operations.
pub struct StatsRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> StatsRepository<'a> {
    /// Create a new counter repository.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Count one message from `nick` in `channel` at unix time `ts`.
    ///
    /// A single conditional upsert: concurrent callers never lose an
    /// increment and never create duplicate rows. `first_seen` and the
    /// display nick are only written on insert; `last_seen` never moves
    /// backwards.
    pub async fn upsert_message(&self, channel: &str, nick: &str, ts: i64) -> Result<(), DbError> {
        sqlx::query(
            r#"
            INSERT INTO user_stats (channel, nick_key, nick, message_count, first_seen, last_seen)
            VALUES (?, ?, ?, 1, ?, ?)
            ON CONFLICT(channel, nick_key) DO UPDATE SET
                message_count = message_count + 1,
                last_seen = MAX(last_seen, excluded.last_seen)
            "#,
        )
        .bind(fold_channel(channel))
        .bind(irc_to_lower(nick))
        .bind(nick)
        .bind(ts)
        .bind(ts)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// All counters for a channel. Order is unspecified.
    pub async fn for_channel(&self, channel: &str) -> Result<Vec<UserStat>, DbError> {
        let rows = sqlx::query_as::<_, UserStatRow>(
            r#"
            SELECT channel, nick, message_count, first_seen, last_seen
            FROM user_stats
            WHERE channel = ?
            "#,
        )
        .bind(fold_channel(channel))
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(row_to_stat).collect())
    }

    /// Counter for one nick, matched case-insensitively.
    pub async fn find(&self, channel: &str, nick: &str) -> Result<Option<UserStat>, DbError> {
        let row = sqlx::query_as::<_, UserStatRow>(
            r#"
            SELECT channel, nick, message_count, first_seen, last_seen
            FROM user_stats
            WHERE channel = ? AND nick_key = ?
            "#,
        )
        .bind(fold_channel(channel))
        .bind(irc_to_lower(nick))
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(row_to_stat))
    }
}

#[cfg(test)]
mod tests {
    use crate::db::Database;
    use std::sync::Arc;

    #[tokio::test]
    async fn first_message_creates_row() {
        let db = Database::new(":memory:").await.unwrap();

        db.stats().upsert_message("#Rust", "Alice", 1_000).await.unwrap();

        let stat = db.stats().find("#rust", "alice").await.unwrap().unwrap();
        assert_eq!(stat.channel, "#rust");
        assert_eq!(stat.nick, "Alice");
        assert_eq!(stat.message_count, 1);
        assert_eq!(stat.first_seen, 1_000);
        assert_eq!(stat.last_seen, 1_000);
    }

    #[tokio::test]
    async fn repeated_messages_increment_and_advance_last_seen() {
        let db = Database::new(":memory:").await.unwrap();

        for ts in [100, 200, 300, 400] {
            db.stats().upsert_message("#rust", "alice", ts).await.unwrap();
        }

        let stat = db.stats().find("#rust", "alice").await.unwrap().unwrap();
        assert_eq!(stat.message_count, 4);
        assert_eq!(stat.first_seen, 100);
        assert_eq!(stat.last_seen, 400);
    }

    #[tokio::test]
    async fn out_of_order_timestamp_does_not_rewind_last_seen() {
        let db = Database::new(":memory:").await.unwrap();

        db.stats().upsert_message("#rust", "alice", 500).await.unwrap();
        db.stats().upsert_message("#rust", "alice", 300).await.unwrap();

        let stat = db.stats().find("#rust", "alice").await.unwrap().unwrap();
        assert_eq!(stat.message_count, 2);
        assert_eq!(stat.first_seen, 500);
        assert_eq!(stat.last_seen, 500);
        assert!(stat.first_seen <= stat.last_seen);
    }

    #[tokio::test]
    async fn nick_casing_is_folded_but_first_casing_kept() {
        let db = Database::new(":memory:").await.unwrap();

        db.stats().upsert_message("#rust", "Alice[m]", 1).await.unwrap();
        db.stats().upsert_message("#rust", "ALICE{M}", 2).await.unwrap();

        let stats = db.stats().for_channel("#rust").await.unwrap();
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].nick, "Alice[m]");
        assert_eq!(stats[0].message_count, 2);
    }

    #[tokio::test]
    async fn padded_channel_shares_the_canonical_row() {
        let db = Database::new(":memory:").await.unwrap();

        db.stats().upsert_message(" #Rust ", "alice", 1).await.unwrap();
        db.stats().upsert_message("#rust", "alice", 2).await.unwrap();

        let stats = db.stats().for_channel("#rust").await.unwrap();
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].channel, "#rust");
        assert_eq!(stats[0].message_count, 2);
    }

    #[tokio::test]
    async fn channels_are_counted_separately() {
        let db = Database::new(":memory:").await.unwrap();

        db.stats().upsert_message("#a", "alice", 1).await.unwrap();
        db.stats().upsert_message("#b", "alice", 2).await.unwrap();
        db.stats().upsert_message("#b", "bob", 3).await.unwrap();

        assert_eq!(db.stats().for_channel("#a").await.unwrap().len(), 1);
        assert_eq!(db.stats().for_channel("#b").await.unwrap().len(), 2);
        assert!(db.stats().for_channel("#c").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_nick_is_none_but_zero_row_is_found() {
        let db = Database::new(":memory:").await.unwrap();

        assert!(db.stats().find("#rust", "ghost").await.unwrap().is_none());

        // Rows are only ever created with a count of one; plant a zero row
        // directly to check the boundary.
        sqlx::query(
            "INSERT INTO user_stats (channel, nick_key, nick, message_count, first_seen, last_seen)
             VALUES ('#rust', 'zero', 'Zero', 0, 10, 10)",
        )
        .execute(db.pool())
        .await
        .unwrap();

        let stat = db.stats().find("#rust", "ZERO").await.unwrap().unwrap();
        assert_eq!(stat.message_count, 0);
    }

    #[tokio::test]
    async fn concurrent_upserts_lose_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("monitor.db");
        let db = Arc::new(Database::new(path.to_str().unwrap()).await.unwrap());

        const CALLERS: i64 = 64;
        let mut tasks = tokio::task::JoinSet::new();
        for i in 0..CALLERS {
            let db = Arc::clone(&db);
            tasks.spawn(async move { db.stats().upsert_message("#busy", "alice", 1_000 + i).await });
        }
        while let Some(result) = tasks.join_next().await {
            result.unwrap().unwrap();
        }

        let stats = db.stats().for_channel("#busy").await.unwrap();
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].message_count, CALLERS);
        assert_eq!(stats[0].last_seen, 1_000 + CALLERS - 1);
    }
}
