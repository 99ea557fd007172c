//! Eligibility gate: which channels may be tracked, and which are.
//!
//! A channel is eligible when it is on the static allow-list from config or
//! was added at runtime by an admin (persisted in the store). An eligible
//! channel is enabled when its stored flag says so, falling back to
//! `default_enabled` when no flag has been stored yet.

use crate::casemap::channel_key;
use crate::config::ChannelStatsConfig;
use crate::db::DbError;
use crate::store::StatsStore;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Tracking state of a single channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelStatus {
    NotEligible,
    EligibleDisabled,
    EligibleEnabled,
}

impl ChannelStatus {
    pub fn is_eligible(self) -> bool {
        !matches!(self, Self::NotEligible)
    }
}

/// Immutable tracking policy built once from config.
#[derive(Debug, Clone, Default)]
pub struct EligibilityPolicy {
    allow_list: BTreeSet<String>,
    default_enabled: bool,
    allow_admin_add: bool,
}

impl EligibilityPolicy {
    /// Build a policy. Allow-list entries that are not channel names are dropped.
    pub fn new<I, S>(channels: I, default_enabled: bool, allow_admin_add: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let allow_list = channels
            .into_iter()
            .filter_map(|c| channel_key(c.as_ref()))
            .collect();

        Self {
            allow_list,
            default_enabled,
            allow_admin_add,
        }
    }

    pub fn from_config(config: &ChannelStatsConfig) -> Self {
        Self::new(&config.channels, config.default_enabled, config.allow_admin_add)
    }

    /// Whether `channel` (already case-folded) is on the static allow-list.
    pub fn is_listed(&self, channel: &str) -> bool {
        self.allow_list.contains(channel)
    }

    pub fn default_enabled(&self) -> bool {
        self.default_enabled
    }

    pub fn allow_admin_add(&self) -> bool {
        self.allow_admin_add
    }
}

/// Answers eligibility and enablement questions against the store.
#[derive(Clone)]
pub struct EligibilityGate {
    policy: Arc<EligibilityPolicy>,
    store: Arc<dyn StatsStore>,
}

impl EligibilityGate {
    pub fn new(policy: EligibilityPolicy, store: Arc<dyn StatsStore>) -> Self {
        Self {
            policy: Arc::new(policy),
            store,
        }
    }

    pub fn policy(&self) -> &EligibilityPolicy {
        &self.policy
    }

    /// Whether the channel is on the allow-list, static or runtime.
    pub async fn is_eligible(&self, channel: &str) -> Result<bool, DbError> {
        let Some(key) = channel_key(channel) else {
            return Ok(false);
        };
        if self.policy.is_listed(&key) {
            return Ok(true);
        }
        self.store.is_eligible_channel(&key).await
    }

    /// Stored enable flag, or `default_enabled` when none is stored.
    async fn is_enabled(&self, key: &str) -> Result<bool, DbError> {
        Ok(self
            .store
            .channel_state(key)
            .await?
            .map(|state| state.enabled)
            .unwrap_or(self.policy.default_enabled))
    }

    /// Current state of a channel.
    pub async fn status(&self, channel: &str) -> Result<ChannelStatus, DbError> {
        if !self.is_eligible(channel).await? {
            return Ok(ChannelStatus::NotEligible);
        }
        let Some(key) = channel_key(channel) else {
            return Ok(ChannelStatus::NotEligible);
        };
        if self.is_enabled(&key).await? {
            Ok(ChannelStatus::EligibleEnabled)
        } else {
            Ok(ChannelStatus::EligibleDisabled)
        }
    }

    /// The single predicate consulted before every counted message.
    pub async fn is_tracked(&self, channel: &str) -> Result<bool, DbError> {
        Ok(self.status(channel).await? == ChannelStatus::EligibleEnabled)
    }

    /// Every eligible channel, sorted.
    pub async fn eligible_channels(&self) -> Result<Vec<String>, DbError> {
        let mut channels: BTreeSet<String> = self.policy.allow_list.clone();
        channels.extend(self.store.list_eligible_channels().await?);
        Ok(channels.into_iter().collect())
    }

    /// Every channel currently being tracked, sorted.
    pub async fn enabled_channels(&self) -> Result<Vec<String>, DbError> {
        if !self.policy.default_enabled {
            // Without a default, only stored flags can enable a channel.
            let eligible: BTreeSet<String> = self.eligible_channels().await?.into_iter().collect();
            return Ok(self
                .store
                .list_enabled_channels()
                .await?
                .into_iter()
                .filter(|c| eligible.contains(c))
                .collect());
        }

        let mut enabled = Vec::new();
        for channel in self.eligible_channels().await? {
            if self.is_enabled(&channel).await? {
                enabled.push(channel);
            }
        }
        Ok(enabled)
    }
}
