//! Line-oriented IRC host for the tracker.
//!
//! Reads raw IRC protocol lines (as a server would send them to the bot),
//! keeps track of which channels the bot has joined, feeds the tracker, and
//! emits `PRIVMSG` replies as protocol lines.

use crate::casemap::{channel_key, irc_eq};
use crate::config::Config;
use crate::host::{HostContext, MessageEvent};
use crate::tracker::Tracker;
use dashmap::DashSet;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, trace};

/// The pieces of an IRC line the shell cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IrcLine<'a> {
    pub tags: Option<&'a str>,
    pub source_nick: Option<&'a str>,
    pub command: &'a str,
    pub params: Vec<&'a str>,
}

impl<'a> IrcLine<'a> {
    /// Parse `[@tags] [:prefix] COMMAND [params...] [:trailing]`.
    pub fn parse(line: &'a str) -> Option<Self> {
        let mut rest = line.trim_end_matches(['\r', '\n']);

        let mut tags = None;
        if let Some(stripped) = rest.strip_prefix('@') {
            let (t, r) = stripped.split_once(' ')?;
            tags = Some(t);
            rest = r.trim_start();
        }

        let mut source_nick = None;
        if let Some(stripped) = rest.strip_prefix(':') {
            let (prefix, r) = stripped.split_once(' ')?;
            source_nick = Some(prefix.split(['!', '@']).next().unwrap_or(prefix));
            rest = r.trim_start();
        }

        let (head, trailing) = match rest.split_once(" :") {
            Some((head, trailing)) => (head, Some(trailing)),
            None => (rest, None),
        };

        let mut words = head.split_whitespace();
        let command = words.next()?;
        let mut params: Vec<&str> = words.collect();
        params.extend(trailing);

        Some(Self {
            tags,
            source_nick,
            command,
            params,
        })
    }

    /// Value of a message tag, unescaping is not needed for `time`.
    pub fn tag(&self, key: &str) -> Option<&'a str> {
        self.tags?.split(';').find_map(|kv| match kv.split_once('=') {
            Some((k, v)) if k == key => Some(v),
            _ => None,
        })
    }

    /// IRCv3 `server-time`, falling back to now.
    pub fn timestamp(&self) -> i64 {
        self.tag("time")
            .and_then(|t| chrono::DateTime::parse_from_rfc3339(t).ok())
            .map(|t| t.timestamp())
            .unwrap_or_else(|| chrono::Utc::now().timestamp())
    }
}

/// Host predicates backed by config and observed JOIN/PART traffic.
pub struct IrcHost {
    bot_nick: String,
    admins: Vec<String>,
    joined: DashSet<String>,
}

impl IrcHost {
    pub fn new(bot_nick: impl Into<String>, admins: Vec<String>) -> Self {
        Self {
            bot_nick: bot_nick.into(),
            admins,
            joined: DashSet::new(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.bot.nick.clone(), config.bot.admins.clone())
    }

    pub fn is_self(&self, nick: &str) -> bool {
        irc_eq(nick, &self.bot_nick)
    }

    fn mark_joined(&self, channel: &str) {
        if let Some(key) = channel_key(channel) {
            info!(channel = %key, "Joined channel");
            self.joined.insert(key);
        }
    }

    fn mark_left(&self, channel: &str) {
        if let Some(key) = channel_key(channel) {
            info!(channel = %key, "Left channel");
            self.joined.remove(&key);
        }
    }
}

impl HostContext for IrcHost {
    fn is_admin(&self, nick: &str) -> bool {
        self.admins.iter().any(|admin| irc_eq(admin, nick))
    }

    fn is_present(&self, channel: &str) -> bool {
        channel_key(channel).is_some_and(|key| self.joined.contains(&key))
    }
}

/// Drives a [`Tracker`] from IRC protocol lines.
pub struct Shell {
    tracker: Tracker,
    host: Arc<IrcHost>,
}

impl Shell {
    pub fn new(tracker: Tracker, host: Arc<IrcHost>) -> Self {
        Self { tracker, host }
    }

    pub fn host(&self) -> &IrcHost {
        &self.host
    }

    /// Process one inbound line, returning outbound lines.
    pub async fn handle_line(&self, line: &str) -> Vec<String> {
        let Some(msg) = IrcLine::parse(line) else {
            trace!(line = %line, "Skipping unparseable line");
            return Vec::new();
        };

        match msg.command.to_ascii_uppercase().as_str() {
            "PING" => {
                let token = msg.params.first().copied().unwrap_or_default();
                vec![format!("PONG :{}", token)]
            }
            "JOIN" => {
                if let (Some(nick), Some(channels)) = (msg.source_nick, msg.params.first())
                    && self.host.is_self(nick)
                {
                    channels.split(',').for_each(|c| self.host.mark_joined(c));
                }
                Vec::new()
            }
            "PART" => {
                if let (Some(nick), Some(channels)) = (msg.source_nick, msg.params.first())
                    && self.host.is_self(nick)
                {
                    channels.split(',').for_each(|c| self.host.mark_left(c));
                }
                Vec::new()
            }
            "KICK" => {
                if let (Some(channel), Some(target)) = (msg.params.first(), msg.params.get(1))
                    && self.host.is_self(target)
                {
                    self.host.mark_left(channel);
                }
                Vec::new()
            }
            "PRIVMSG" => self.handle_privmsg(&msg).await,
            other => {
                trace!(command = %other, "Ignoring command");
                Vec::new()
            }
        }
    }

    async fn handle_privmsg(&self, msg: &IrcLine<'_>) -> Vec<String> {
        let (Some(nick), Some(target), Some(text)) =
            (msg.source_nick, msg.params.first(), msg.params.get(1))
        else {
            return Vec::new();
        };

        if channel_key(target).is_some() {
            let mut event = MessageEvent::new(*target, nick, msg.timestamp());
            event.is_from_self = self.host.is_self(nick);
            return self
                .tracker
                .on_channel_message(&event, text)
                .await
                .into_iter()
                .map(|reply| privmsg(target, &reply))
                .collect();
        }

        if self.host.is_self(target) && !self.host.is_self(nick) {
            return self
                .tracker
                .on_private_message(self.host.as_ref(), nick, text)
                .await
                .into_iter()
                .map(|reply| privmsg(nick, &reply))
                .collect();
        }

        debug!(target = %target, "Ignoring PRIVMSG to unknown target");
        Vec::new()
    }

    /// Read lines until EOF, writing replies as they are produced.
    pub async fn run<R, W>(&self, reader: R, mut writer: W) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = reader.lines();
        while let Some(line) = lines.next_line().await? {
            for out in self.handle_line(&line).await {
                writer.write_all(out.as_bytes()).await?;
                writer.write_all(b"\r\n").await?;
            }
            writer.flush().await?;
        }
        Ok(())
    }
}

fn privmsg(target: &str, text: &str) -> String {
    format!("PRIVMSG {} :{}", target, text)
}
