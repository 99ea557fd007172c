//! Query engine: leaderboards and per-user summaries.

use crate::casemap::irc_to_lower;
use crate::db::UserStat;
use crate::error::{StatsError, StatsResult};
use crate::store::StatsStore;
use std::cmp::Ordering;
use std::sync::Arc;

/// Entries in each leaderboard slice.
pub const LEADERBOARD_SIZE: usize = 10;

/// Markers for the first three places of the top slice.
pub const BADGES: [&str; 3] = ["🥇", "🥈", "🥉"];

/// One ranked line of a leaderboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedEntry {
    /// 1-based position in the full ordering.
    pub rank: usize,
    pub nick: String,
    pub message_count: i64,
    pub badge: Option<&'static str>,
}

impl RankedEntry {
    fn render(&self) -> String {
        match self.badge {
            Some(badge) => format!("{} {}({})", badge, self.nick, self.message_count),
            None => format!("{}({})", self.nick, self.message_count),
        }
    }
}

/// Most and least active users of a channel.
///
/// Both slices are in descending order. With fewer than twice
/// [`LEADERBOARD_SIZE`] users the slices overlap and are not de-duplicated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Leaderboard {
    pub top: Vec<RankedEntry>,
    pub bottom: Vec<RankedEntry>,
}

impl Leaderboard {
    pub fn is_empty(&self) -> bool {
        self.top.is_empty()
    }

    /// Reply lines for the caller.
    pub fn render(&self) -> Vec<String> {
        if self.is_empty() {
            return vec!["No stats yet for this channel.".to_string()];
        }

        let join = |entries: &[RankedEntry]| {
            entries
                .iter()
                .map(RankedEntry::render)
                .collect::<Vec<_>>()
                .join(", ")
        };

        vec![
            format!("Top {}: {}", LEADERBOARD_SIZE, join(&self.top)),
            format!("Bottom {}: {}", LEADERBOARD_SIZE, join(&self.bottom)),
        ]
    }
}

/// Descending by count, then by folded nick so ties are stable.
fn leaderboard_order(a: &UserStat, b: &UserStat) -> Ordering {
    b.message_count
        .cmp(&a.message_count)
        .then_with(|| irc_to_lower(&a.nick).cmp(&irc_to_lower(&b.nick)))
        .then_with(|| a.nick.cmp(&b.nick))
}

/// Rank an unordered set of counters into a leaderboard.
pub fn rank(mut stats: Vec<UserStat>) -> Leaderboard {
    stats.sort_by(leaderboard_order);

    let entry = |(idx, stat): (usize, &UserStat), badged: bool| RankedEntry {
        rank: idx + 1,
        nick: stat.nick.clone(),
        message_count: stat.message_count,
        badge: if badged { BADGES.get(idx).copied() } else { None },
    };

    let top = stats
        .iter()
        .enumerate()
        .take(LEADERBOARD_SIZE)
        .map(|e| entry(e, true))
        .collect();

    let bottom_start = stats.len().saturating_sub(LEADERBOARD_SIZE);
    let bottom = stats
        .iter()
        .enumerate()
        .skip(bottom_start)
        .map(|e| entry(e, false))
        .collect();

    Leaderboard {
        top,
        bottom,
    }
}

/// Format a unix timestamp as `YYYY-MM-DD HH:MM:SS UTC`.
pub fn format_ts(ts: i64) -> String {
    chrono::DateTime::from_timestamp(ts, 0)
        .unwrap_or_default()
        .format("%Y-%m-%d %H:%M:%S UTC")
        .to_string()
}

/// One-line summary of a user's activity in `channel`.
pub fn render_user_stat(channel: &str, stat: &UserStat) -> String {
    format!(
        "{} in {}: messages={}, first_seen={}, last_seen={}",
        stat.nick,
        channel,
        stat.message_count,
        format_ts(stat.first_seen),
        format_ts(stat.last_seen)
    )
}

/// Read side of the tracker.
#[derive(Clone)]
pub struct QueryEngine {
    store: Arc<dyn StatsStore>,
}

impl QueryEngine {
    pub fn new(store: Arc<dyn StatsStore>) -> Self {
        Self { store }
    }

    pub async fn channel_leaderboard(&self, channel: &str) -> StatsResult<Leaderboard> {
        let stats = self.store.channel_stats(channel).await?;
        Ok(rank(stats))
    }

    /// Look up one user. A nick never seen in the channel is [`StatsError::NotFound`].
    pub async fn user_stat(&self, channel: &str, nick: &str) -> StatsResult<UserStat> {
        self.store
            .user_stat(channel, nick)
            .await?
            .ok_or_else(|| StatsError::NotFound {
                nick: nick.to_string(),
                channel: channel.to_string(),
            })
    }
}
