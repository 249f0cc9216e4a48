//! Self-Attack Ledger: the local player's own recent hits.
//!
//! Thorns-style effects hurt the attacker right after they strike. Without
//! this ledger, such a hit would be blamed on the entity we just struck.
//! One entry per target; a newer attack on the same target overwrites the
//! older timestamp. An entry explains at most one damage event.

use dashmap::DashMap;
use tracing::debug;

use crate::types::{EntityId, Timestamp};

/// Concurrent map of target id → time of our most recent attack on it.
#[derive(Debug, Default)]
pub struct SelfAttackLedger {
    attacks: DashMap<EntityId, Timestamp>,
}

impl SelfAttackLedger {
    /// Create an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember that the local entity attacked `target` at `timestamp`.
    pub fn record_self_attack(&self, target: EntityId, timestamp: Timestamp) {
        debug!(target_entity = %target, %timestamp, "Self attack recorded");
        self.attacks.insert(target, timestamp);
    }

    /// Consume the entry for `target` if it is younger than `window_ms`.
    ///
    /// Returns `true` exactly when an entry existed with
    /// `now - entry < window_ms`; that entry is removed atomically. In every
    /// other case nothing changes.
    pub fn consume_if_recent(&self, target: EntityId, now: Timestamp, window_ms: u64) -> bool {
        self.attacks
            .remove_if(&target, |_, attacked_at| now.millis_since(*attacked_at) < window_ms)
            .is_some()
    }

    /// Time of the last recorded attack on `target`.
    #[must_use]
    pub fn last_attack(&self, target: EntityId) -> Option<Timestamp> {
        self.attacks.get(&target).map(|entry| *entry)
    }

    /// Forget `target` entirely.
    pub fn clear(&self, target: EntityId) {
        self.attacks.remove(&target);
    }

    /// Drop every entry at least `window_ms` old. Returns how many went.
    pub fn prune(&self, now: Timestamp, window_ms: u64) -> usize {
        let before = self.attacks.len();
        self.attacks
            .retain(|_, attacked_at| now.millis_since(*attacked_at) < window_ms);
        before.saturating_sub(self.attacks.len())
    }

    /// Number of live entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.attacks.len()
    }

    /// Whether the ledger is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attacks.is_empty()
    }
}
