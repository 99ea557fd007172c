//! Ingestion path: turns channel messages into counter updates.

use crate::casemap::channel_key;
use crate::gate::EligibilityGate;
use crate::host::MessageEvent;
use crate::store::StatsStore;
use std::sync::Arc;
use tracing::{debug, warn};

/// What happened to an inbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    Counted,
    /// Sent by the bot itself.
    SkippedSelf,
    /// Channel is not eligible or not enabled.
    SkippedUntracked,
    /// The store failed; the message was logged and dropped.
    Dropped,
}

/// Feeds channel messages into the store.
///
/// Never retries and never returns an error: a failed write is logged and
/// the message is lost, so the stream of subsequent messages is not held up.
#[derive(Clone)]
pub struct Ingestor {
    gate: EligibilityGate,
    store: Arc<dyn StatsStore>,
}

impl Ingestor {
    pub fn new(gate: EligibilityGate, store: Arc<dyn StatsStore>) -> Self {
        Self { gate, store }
    }

    pub async fn ingest(&self, event: &MessageEvent) -> IngestOutcome {
        if event.is_from_self {
            return IngestOutcome::SkippedSelf;
        }

        match self.gate.is_tracked(&event.channel).await {
            Ok(true) => {}
            Ok(false) => return IngestOutcome::SkippedUntracked,
            Err(e) => {
                warn!(
                    channel = %event.channel,
                    nick = %event.sender_nick,
                    error = %e,
                    "Failed to check channel tracking state, dropping message"
                );
                return IngestOutcome::Dropped;
            }
        }

        // Tracked channels always have a key.
        let Some(channel) = channel_key(&event.channel) else {
            return IngestOutcome::SkippedUntracked;
        };

        match self
            .store
            .upsert_message(&channel, &event.sender_nick, event.timestamp)
            .await
        {
            Ok(()) => {
                debug!(channel = %channel, nick = %event.sender_nick, "Counted message");
                IngestOutcome::Counted
            }
            Err(e) => {
                warn!(
                    channel = %channel,
                    nick = %event.sender_nick,
                    error = %e,
                    "Failed to record message, dropping"
                );
                IngestOutcome::Dropped
            }
        }
    }
}
