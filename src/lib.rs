//! chanstats - channel activity tracker for IRC.
//!
//! Counts messages per channel and nick, gated by an allow-list and a
//! per-channel enable flag, and answers leaderboard and per-user queries.

pub mod admin;
pub mod casemap;
pub mod commands;
pub mod config;
pub mod db;
pub mod error;
pub mod gate;
pub mod host;
pub mod ingest;
pub mod query;
pub mod shell;
pub mod store;
pub mod tracker;

pub use admin::AdminControl;
pub use db::{Database, DbError};
pub use error::{StatsError, StatsResult};
pub use gate::{ChannelStatus, EligibilityGate, EligibilityPolicy};
pub use host::{HostContext, MessageEvent};
pub use ingest::{IngestOutcome, Ingestor};
pub use query::{Leaderboard, QueryEngine};
pub use store::StatsStore;
pub use tracker::Tracker;
