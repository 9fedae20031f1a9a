//! Reconnect backoff policy.
//!
//! The policy is an ordered sequence of tiers consumed front-to-back exactly
//! once per disconnection episode. Tier N's delay becomes the active retry
//! delay `hold_ms` milliseconds after the episode begins; once the sequence
//! is exhausted the last delay repeats until a successful open resets it.
//! The channel never gives up: a page left open must ride out arbitrarily
//! long outages without user intervention.

use std::time::Duration;
use uplink_core::config::{ReconnectConfig, ReconnectTier};

/// Cursor over the configured backoff tiers. Owned exclusively by the
/// channel state machine.
#[derive(Debug, Clone)]
pub struct ReconnectPolicy {
    tiers: Vec<ReconnectTier>,
    cursor: usize,
}

impl ReconnectPolicy {
    /// Builds a policy from the given tiers; an empty list falls back to the
    /// default table.
    pub fn new(tiers: Vec<ReconnectTier>) -> Self {
        let tiers = if tiers.is_empty() {
            ReconnectConfig::default().tiers
        } else {
            tiers
        };
        Self { tiers, cursor: 0 }
    }

    pub fn from_config(cfg: &ReconnectConfig) -> Self {
        Self::new(cfg.tiers.clone())
    }

    /// Rewinds to the first tier. Called on every successful open.
    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    /// The retry delay of the currently active tier.
    pub fn current_delay(&self) -> Duration {
        Duration::from_millis(self.tiers[self.cursor].delay_ms)
    }

    /// Time from the current tier's activation until the next tier
    /// activates, or `None` on the final tier.
    pub fn next_hold(&self) -> Option<Duration> {
        let current = self.tiers[self.cursor];
        let next = self.tiers.get(self.cursor + 1)?;
        Some(Duration::from_millis(
            next.hold_ms.saturating_sub(current.hold_ms),
        ))
    }

    /// Advances to the next tier; a no-op once the final tier is active.
    pub fn escalate(&mut self) {
        if self.cursor + 1 < self.tiers.len() {
            self.cursor += 1;
        }
    }
}
