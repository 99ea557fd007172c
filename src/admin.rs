//! Admin control: turning tracking on and off per channel.
//!
//! Callers must only invoke these from a private (non-channel) context.

use crate::casemap::channel_key;
use crate::error::{StatsError, StatsResult};
use crate::gate::EligibilityGate;
use crate::store::StatsStore;
use std::sync::Arc;
use tracing::info;

/// Result of a successful enable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enabled {
    /// Canonical channel key.
    pub channel: String,
    /// The channel was added to the allow-list by this call.
    pub newly_added: bool,
}

#[derive(Clone)]
pub struct AdminControl {
    gate: EligibilityGate,
    store: Arc<dyn StatsStore>,
}

impl AdminControl {
    pub fn new(gate: EligibilityGate, store: Arc<dyn StatsStore>) -> Self {
        Self { gate, store }
    }

    async fn not_eligible(&self, channel: &str) -> StatsError {
        match self.gate.eligible_channels().await {
            Ok(eligible) => StatsError::NotEligible {
                channel: channel.to_string(),
                eligible,
            },
            Err(e) => e.into(),
        }
    }

    /// Start tracking `channel`.
    ///
    /// Checks, in order: requester is admin, channel is eligible or may be
    /// added because `allow_admin_add` is set, bot is present. A channel the
    /// bot is not in is never added.
    pub async fn enable(
        &self,
        channel: &str,
        requester: &str,
        requester_is_admin: bool,
        bot_present: bool,
    ) -> StatsResult<Enabled> {
        if !requester_is_admin {
            return Err(StatsError::PermissionDenied);
        }
        let Some(key) = channel_key(channel) else {
            return Err(self.not_eligible(channel).await);
        };

        let newly_added = !self.gate.is_eligible(&key).await?;
        if newly_added && !self.gate.policy().allow_admin_add() {
            return Err(self.not_eligible(&key).await);
        }
        if !bot_present {
            return Err(StatsError::NotInChannel(channel.to_string()));
        }

        if newly_added {
            self.store.admit_channel(&key, requester).await?;
            info!(channel = %key, added_by = %requester, "Channel added to allow-list");
        } else {
            self.store.set_channel_enabled(&key, true).await?;
        }
        info!(channel = %key, by = %requester, "Monitoring enabled");

        Ok(Enabled {
            channel: key,
            newly_added,
        })
    }

    /// Stop tracking `channel`. Existing counters are kept. Idempotent.
    pub async fn disable(
        &self,
        channel: &str,
        requester: &str,
        requester_is_admin: bool,
    ) -> StatsResult<String> {
        if !requester_is_admin {
            return Err(StatsError::PermissionDenied);
        }
        let Some(key) = channel_key(channel) else {
            return Err(self.not_eligible(channel).await);
        };

        self.store.set_channel_enabled(&key, false).await?;
        info!(channel = %key, by = %requester, "Monitoring disabled");

        Ok(key)
    }

    /// Channels currently tracked, sorted.
    pub async fn list(&self, requester_is_admin: bool) -> StatsResult<Vec<String>> {
        if !requester_is_admin {
            return Err(StatsError::PermissionDenied);
        }
        Ok(self.gate.enabled_channels().await?)
    }
}
