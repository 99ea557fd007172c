//! Chat command parsing.
//!
//! Recognises `.monitor`, `.channelstats` and `.userstats` (with a
//! configurable prefix) and splits them into typed commands.

/// `.monitor` sub-commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonitorCommand {
    On(String),
    Off(String),
    List,
    /// Missing or malformed arguments.
    Usage,
}

/// A recognised chat command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Monitor(MonitorCommand),
    ChannelStats,
    /// Explicit nick, or `None` for the caller.
    UserStats(Option<String>),
}

pub const MONITOR_USAGE: &str = "Usage: .monitor on|off #channel  OR  .monitor list";

impl Command {
    /// Parse `text` as a command. Returns `None` for ordinary chat.
    pub fn parse(prefix: &str, text: &str) -> Option<Self> {
        let rest = text.trim_start().strip_prefix(prefix)?;
        let mut parts = rest.split_whitespace();
        let name = parts.next()?.to_lowercase();
        let args: Vec<&str> = parts.collect();

        match name.as_str() {
            "monitor" => Some(Self::Monitor(parse_monitor(&args))),
            "channelstats" => Some(Self::ChannelStats),
            "userstats" => Some(Self::UserStats(args.first().map(|s| s.to_string()))),
            _ => None,
        }
    }

    /// Whether this command is only accepted in private.
    pub fn is_private_only(&self) -> bool {
        matches!(self, Self::Monitor(_))
    }
}

fn parse_monitor(args: &[&str]) -> MonitorCommand {
    let Some(sub) = args.first() else {
        return MonitorCommand::Usage;
    };

    match (sub.to_lowercase().as_str(), args.get(1)) {
        ("list", _) => MonitorCommand::List,
        ("on", Some(channel)) => MonitorCommand::On(channel.to_string()),
        ("off", Some(channel)) => MonitorCommand::Off(channel.to_string()),
        _ => MonitorCommand::Usage,
    }
}
