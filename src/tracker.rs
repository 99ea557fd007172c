//! The tracker: wires the gate, ingestion, queries and admin control
//! together and answers chat commands with reply lines.

use crate::admin::AdminControl;
use crate::commands::{Command, MONITOR_USAGE, MonitorCommand};
use crate::config::Config;
use crate::error::StatsError;
use crate::gate::{EligibilityGate, EligibilityPolicy};
use crate::host::{HostContext, MessageEvent};
use crate::ingest::{IngestOutcome, Ingestor};
use crate::query::{QueryEngine, render_user_stat};
use crate::store::StatsStore;
use std::sync::Arc;
use tracing::{debug, error};

#[derive(Clone)]
pub struct Tracker {
    gate: EligibilityGate,
    ingestor: Ingestor,
    queries: QueryEngine,
    admin: AdminControl,
    command_prefix: String,
}

impl Tracker {
    pub fn new(policy: EligibilityPolicy, store: Arc<dyn StatsStore>, command_prefix: impl Into<String>) -> Self {
        let gate = EligibilityGate::new(policy, store.clone());
        Self {
            ingestor: Ingestor::new(gate.clone(), store.clone()),
            queries: QueryEngine::new(store.clone()),
            admin: AdminControl::new(gate.clone(), store),
            gate,
            command_prefix: command_prefix.into(),
        }
    }

    pub fn from_config(config: &Config, store: Arc<dyn StatsStore>) -> Self {
        Self::new(
            EligibilityPolicy::from_config(&config.channelstats),
            store,
            config.bot.command_prefix.clone(),
        )
    }

    pub fn gate(&self) -> &EligibilityGate {
        &self.gate
    }

    /// Count a channel message without looking at its text.
    pub async fn ingest(&self, event: &MessageEvent) -> IngestOutcome {
        self.ingestor.ingest(event).await
    }

    /// Handle a message sent to a channel: count it, then answer any
    /// channel command it carries.
    pub async fn on_channel_message(&self, event: &MessageEvent, text: &str) -> Vec<String> {
        self.ingestor.ingest(event).await;

        if event.is_from_self {
            return Vec::new();
        }

        let Some(cmd) = Command::parse(&self.command_prefix, text) else {
            return Vec::new();
        };
        if cmd.is_private_only() {
            debug!(channel = %event.channel, command = ?cmd, "Ignoring private-only command in channel");
            return Vec::new();
        }

        match cmd {
            Command::ChannelStats => self.channel_stats(&event.channel).await,
            Command::UserStats(nick) => {
                let nick = nick.as_deref().unwrap_or(&event.sender_nick);
                self.user_stats(&event.channel, nick).await
            }
            Command::Monitor(_) => Vec::new(),
        }
    }

    /// Handle a private message from `nick`.
    pub async fn on_private_message(&self, host: &dyn HostContext, nick: &str, text: &str) -> Vec<String> {
        match Command::parse(&self.command_prefix, text) {
            Some(Command::Monitor(sub)) => self.monitor(host, nick, sub).await,
            Some(cmd) => {
                debug!(nick = %nick, command = ?cmd, "Ignoring channel-only command in private");
                Vec::new()
            }
            None => Vec::new(),
        }
    }

    async fn channel_stats(&self, channel: &str) -> Vec<String> {
        if let Err(e) = self.require_tracked(channel).await {
            return self.error_reply("channelstats", e);
        }
        match self.queries.channel_leaderboard(channel).await {
            Ok(board) => board.render(),
            Err(e) => self.error_reply("channelstats", e),
        }
    }

    async fn user_stats(&self, channel: &str, nick: &str) -> Vec<String> {
        if let Err(e) = self.require_tracked(channel).await {
            return self.error_reply("userstats", e);
        }
        match self.queries.user_stat(channel, nick).await {
            Ok(stat) => vec![render_user_stat(channel, &stat)],
            Err(e) => self.error_reply("userstats", e),
        }
    }

    async fn monitor(&self, host: &dyn HostContext, nick: &str, sub: MonitorCommand) -> Vec<String> {
        let is_admin = host.is_admin(nick);

        let result = match sub {
            MonitorCommand::Usage if is_admin => return vec![MONITOR_USAGE.to_string()],
            MonitorCommand::Usage => Err(StatsError::PermissionDenied),
            MonitorCommand::List => self.admin.list(is_admin).await.map(|channels| {
                if channels.is_empty() {
                    "No channels enabled for monitoring.".to_string()
                } else {
                    format!("Monitoring enabled in: {}", channels.join(", "))
                }
            }),
            MonitorCommand::On(channel) => self
                .admin
                .enable(&channel, nick, is_admin, host.is_present(&channel))
                .await
                .map(|enabled| format!("Monitoring ENABLED for {}.", enabled.channel)),
            MonitorCommand::Off(channel) => self
                .admin
                .disable(&channel, nick, is_admin)
                .await
                .map(|channel| format!("Monitoring DISABLED for {}.", channel)),
        };

        match result {
            Ok(line) => vec![line],
            Err(e) => self.error_reply("monitor", e),
        }
    }

    async fn require_tracked(&self, channel: &str) -> Result<(), StatsError> {
        if self.gate.is_tracked(channel).await? {
            Ok(())
        } else {
            Err(StatsError::NotMonitored(channel.to_string()))
        }
    }

    fn error_reply(&self, command: &str, err: StatsError) -> Vec<String> {
        if err.is_expected() {
            debug!(command = %command, code = err.error_code(), "Command refused");
        } else {
            error!(command = %command, code = err.error_code(), error = %err, "Command failed");
        }
        vec![err.to_reply()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::casemap::{channel_key, irc_eq};
    use crate::db::Database;
    use std::collections::HashSet;

    struct FakeHost {
        admins: Vec<&'static str>,
        joined: HashSet<String>,
    }

    impl HostContext for FakeHost {
        fn is_admin(&self, nick: &str) -> bool {
            self.admins.iter().any(|a| irc_eq(a, nick))
        }

        fn is_present(&self, channel: &str) -> bool {
            channel_key(channel).is_some_and(|c| self.joined.contains(&c))
        }
    }

    fn host(joined: &[&str]) -> FakeHost {
        FakeHost {
            admins: vec!["alice"],
            joined: joined.iter().map(|c| c.to_string()).collect(),
        }
    }

    async fn tracker(channels: &[&str], default_enabled: bool, allow_admin_add: bool) -> Tracker {
        let db = Arc::new(Database::new(":memory:").await.unwrap());
        Tracker::new(EligibilityPolicy::new(channels, default_enabled, allow_admin_add), db, ".")
    }

    #[tokio::test]
    async fn stats_commands_refuse_untracked_channel() {
        let t = tracker(&["#rust"], false, false).await;
        let ev = MessageEvent::new("#rust", "bob", 1);

        assert_eq!(
            t.on_channel_message(&ev, ".channelstats").await,
            vec!["Monitoring is not enabled in this channel."]
        );
        assert_eq!(
            t.on_channel_message(&ev, ".userstats").await,
            vec!["Monitoring is not enabled in this channel."]
        );
    }

    #[tokio::test]
    async fn commands_are_counted_as_messages() {
        let t = tracker(&["#rust"], true, false).await;
        let ev = MessageEvent::new("#rust", "bob", 1_700_000_000);

        let reply = t.on_channel_message(&ev, ".userstats").await;
        assert_eq!(
            reply,
            vec!["bob in #rust: messages=1, first_seen=2023-11-14 22:13:20 UTC, last_seen=2023-11-14 22:13:20 UTC"]
        );
    }

    #[tokio::test]
    async fn userstats_for_unknown_nick() {
        let t = tracker(&["#rust"], true, false).await;
        let ev = MessageEvent::new("#rust", "bob", 1);

        assert_eq!(
            t.on_channel_message(&ev, ".userstats ghost").await,
            vec!["No stats for ghost in #rust yet."]
        );
    }

    #[tokio::test]
    async fn channelstats_renders_leaderboard() {
        let t = tracker(&["#rust"], true, false).await;
        for (nick, n) in [("A", 5), ("B", 4), ("C", 1)] {
            for ts in 0..n {
                t.ingest(&MessageEvent::new("#rust", nick, ts)).await;
            }
        }

        // The command itself counts for B, bringing A and B level.
        let reply = t.on_channel_message(&MessageEvent::new("#rust", "B", 10), ".channelstats").await;
        assert_eq!(
            reply,
            vec!["Top 10: 🥇 A(5), 🥈 B(5), 🥉 C(1)", "Bottom 10: A(5), B(5), C(1)"]
        );
    }

    #[tokio::test]
    async fn monitor_in_channel_is_ignored() {
        let t = tracker(&["#rust"], true, false).await;
        let ev = MessageEvent::new("#rust", "alice", 1);
        assert!(t.on_channel_message(&ev, ".monitor list").await.is_empty());
    }

    #[tokio::test]
    async fn stats_in_private_are_ignored() {
        let t = tracker(&["#rust"], true, false).await;
        assert!(t.on_private_message(&host(&[]), "alice", ".channelstats").await.is_empty());
        assert!(t.on_private_message(&host(&[]), "alice", "hi").await.is_empty());
    }

    #[tokio::test]
    async fn monitor_flow() {
        let t = tracker(&["#rust"], false, false).await;
        let h = host(&["#rust"]);

        assert_eq!(t.on_private_message(&h, "alice", ".monitor").await, vec![MONITOR_USAGE]);
        assert_eq!(
            t.on_private_message(&h, "alice", ".monitor list").await,
            vec!["No channels enabled for monitoring."]
        );
        assert_eq!(
            t.on_private_message(&h, "ALICE", ".monitor on #Rust").await,
            vec!["Monitoring ENABLED for #rust."]
        );
        assert_eq!(
            t.on_private_message(&h, "alice", ".monitor list").await,
            vec!["Monitoring enabled in: #rust"]
        );
        assert_eq!(
            t.on_private_message(&h, "alice", ".monitor off #rust").await,
            vec!["Monitoring DISABLED for #rust."]
        );
    }

    #[tokio::test]
    async fn monitor_refusals() {
        let t = tracker(&["#rust"], false, false).await;
        let h = host(&["#rust"]);

        assert_eq!(
            t.on_private_message(&h, "mallory", ".monitor on #rust").await,
            vec!["Only bot admins can do that."]
        );
        assert_eq!(
            t.on_private_message(&h, "mallory", ".monitor").await,
            vec!["Only bot admins can do that."]
        );
        assert_eq!(
            t.on_private_message(&host(&[]), "alice", ".monitor on #rust").await,
            vec!["I'm not currently in #rust."]
        );
        assert_eq!(
            t.on_private_message(&h, "alice", ".monitor on #other").await,
            vec!["#other is not in the eligible channel list in config. Eligible: #rust. Add it under [channelstats] channels."]
        );
        // Eligibility is reported even when the bot is not in the channel.
        assert_eq!(
            t.on_private_message(&host(&[]), "alice", ".monitor on #other").await,
            vec!["#other is not in the eligible channel list in config. Eligible: #rust. Add it under [channelstats] channels."]
        );
    }
}
