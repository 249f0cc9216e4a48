//! Swing History Store: bounded per-entity log of attack animations.
//!
//! Each entity gets a fixed-capacity ring buffer of [`SwingRecord`]s. Once
//! full, every append overwrites the oldest slot, so steady-state combat
//! allocates nothing. Records are kept in arrival order, which is also
//! non-decreasing timestamp order because every timestamp comes from the
//! engine's clock at ingestion.
//!
//! ```text
//!  capacity 4, after 6 appends (s0..s5):
//!  slots: [s4][s5][s2][s3]
//!                  ▲ head (oldest)
//!  oldest → newest: s2 s3 s4 s5
//! ```

use dashmap::DashMap;

use crate::types::{EntityId, Position, Rotation, Timestamp};

/// Snapshot of one attack animation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwingRecord {
    /// When the animation was observed.
    pub timestamp: Timestamp,
    /// Where the swinging entity stood.
    pub position: Position,
    /// Which way it faced, if known.
    pub rotation: Option<Rotation>,
}

/// Fixed-capacity FIFO of swings for one entity.
#[derive(Debug, Clone)]
pub struct SwingLog {
    slots: Vec<SwingRecord>,
    /// Index of the oldest record once the buffer has wrapped.
    head: usize,
    capacity: usize,
}

impl SwingLog {
    /// Create an empty log holding at most `capacity` swings.
    ///
    /// A zero capacity is raised to one.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            slots: Vec::with_capacity(capacity),
            head: 0,
            capacity,
        }
    }

    /// Append a swing, evicting the oldest when full.
    ///
    /// Returns the evicted record, if any.
    pub fn push(&mut self, swing: SwingRecord) -> Option<SwingRecord> {
        if self.slots.len() < self.capacity {
            self.slots.push(swing);
            return None;
        }
        let evicted = std::mem::replace(&mut self.slots[self.head], swing);
        self.head = (self.head + 1) % self.capacity;
        Some(evicted)
    }

    /// Number of stored swings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether no swing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Maximum number of swings kept.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Most recent swing.
    #[must_use]
    pub fn latest(&self) -> Option<&SwingRecord> {
        self.iter_newest_first().next()
    }

    /// Iterate oldest → newest.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &SwingRecord> + '_ {
        let (wrapped, start) = self.slots.split_at(self.head);
        start.iter().chain(wrapped.iter())
    }

    /// Iterate newest → oldest, the order the scorer scans in.
    pub fn iter_newest_first(&self) -> impl Iterator<Item = &SwingRecord> + '_ {
        self.iter().rev()
    }

    /// Copy out the log, most recent last.
    #[must_use]
    pub fn to_vec(&self) -> Vec<SwingRecord> {
        self.iter().copied().collect()
    }
}

/// Concurrent map of entity id → [`SwingLog`].
#[derive(Debug)]
pub struct SwingHistory {
    logs: DashMap<EntityId, SwingLog>,
    capacity: usize,
}

impl SwingHistory {
    /// Create an empty store with the given per-entity capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            logs: DashMap::new(),
            capacity: capacity.max(1),
        }
    }

    /// Append a swing to an entity's log.
    ///
    /// Returns the record evicted to make room, if any.
    pub fn record_swing(
        &self,
        id: EntityId,
        timestamp: Timestamp,
        position: Position,
        rotation: Option<Rotation>,
    ) -> Option<SwingRecord> {
        self.logs
            .entry(id)
            .or_insert_with(|| SwingLog::with_capacity(self.capacity))
            .push(SwingRecord {
                timestamp,
                position,
                rotation,
            })
    }

    /// Copy of an entity's swings, most recent last. Empty if none.
    #[must_use]
    pub fn recent_swings(&self, id: EntityId) -> Vec<SwingRecord> {
        self.logs.get(&id).map(|log| log.to_vec()).unwrap_or_default()
    }

    /// Drop an entity's log.
    pub fn clear(&self, id: EntityId) {
        self.logs.remove(&id);
    }

    /// Visit every non-empty log.
    ///
    /// Each shard is read-locked only while its entries are visited; the
    /// view across entities is therefore not atomic.
    pub fn for_each_log(&self, mut visit: impl FnMut(EntityId, &SwingLog)) {
        for entry in &self.logs {
            if !entry.value().is_empty() {
                visit(*entry.key(), entry.value());
            }
        }
    }

    /// Entities with at least one swing.
    #[must_use]
    pub fn tracked_entities(&self) -> usize {
        self.logs.iter().filter(|entry| !entry.value().is_empty()).count()
    }

    /// Total swings across all entities.
    #[must_use]
    pub fn total_swings(&self) -> usize {
        self.logs.iter().map(|entry| entry.value().len()).sum()
    }

    /// Per-entity capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn swing(ms: u64) -> SwingRecord {
        SwingRecord {
            timestamp: Timestamp(ms),
            position: Vec3::new(ms as f32, 0.0, 0.0),
            rotation: None,
        }
    }

    #[test]
    fn fills_before_evicting() {
        let mut log = SwingLog::with_capacity(3);
        assert!(log.push(swing(1)).is_none());
        assert!(log.push(swing(2)).is_none());
        assert!(log.push(swing(3)).is_none());
        assert_eq!(log.len(), 3);
        assert_eq!(log.push(swing(4)), Some(swing(1)));
        assert_eq!(log.len(), 3);
    }

    #[test]
    fn keeps_arrival_order_across_wraps() {
        let mut log = SwingLog::with_capacity(4);
        for ms in 0..10 {
            log.push(swing(ms));
        }
        let stamps: Vec<u64> = log.iter().map(|s| s.timestamp.0).collect();
        assert_eq!(stamps, vec![6, 7, 8, 9]);

        let newest_first: Vec<u64> = log.iter_newest_first().map(|s| s.timestamp.0).collect();
        assert_eq!(newest_first, vec![9, 8, 7, 6]);
        assert_eq!(log.latest(), Some(&swing(9)));
    }

    #[test]
    fn capacity_one_keeps_latest() {
        let mut log = SwingLog::with_capacity(0);
        assert_eq!(log.capacity(), 1);
        log.push(swing(1));
        log.push(swing(2));
        assert_eq!(log.to_vec(), vec![swing(2)]);
    }

    #[test]
    fn history_is_per_entity() {
        let history = SwingHistory::new(20);
        history.record_swing(EntityId(1), Timestamp(10), Vec3::ZERO, None);
        history.record_swing(EntityId(1), Timestamp(20), Vec3::ZERO, None);
        history.record_swing(EntityId(2), Timestamp(15), Vec3::ONE, None);

        assert_eq!(history.recent_swings(EntityId(1)).len(), 2);
        assert_eq!(history.recent_swings(EntityId(2)).len(), 1);
        assert_eq!(history.tracked_entities(), 2);
        assert_eq!(history.total_swings(), 3);
    }

    #[test]
    fn twenty_first_swing_evicts_the_first() {
        let history = SwingHistory::new(20);
        for ms in 0..21 {
            history.record_swing(EntityId(7), Timestamp(ms), Vec3::ZERO, None);
        }
        let swings = history.recent_swings(EntityId(7));
        assert_eq!(swings.len(), 20);
        assert_eq!(swings.first().map(|s| s.timestamp), Some(Timestamp(1)));
        assert_eq!(swings.last().map(|s| s.timestamp), Some(Timestamp(20)));
    }

    #[test]
    fn clear_drops_log() {
        let history = SwingHistory::new(5);
        history.record_swing(EntityId(3), Timestamp(1), Vec3::ZERO, None);
        history.clear(EntityId(3));
        assert!(history.recent_swings(EntityId(3)).is_empty());
        assert_eq!(history.tracked_entities(), 0);
    }

    #[test]
    fn for_each_log_visits_every_entity() {
        let history = SwingHistory::new(5);
        for raw in 1..=4 {
            history.record_swing(EntityId(raw), Timestamp(raw), Vec3::ZERO, None);
        }
        let mut seen = Vec::new();
        history.for_each_log(|id, log| {
            assert_eq!(log.len(), 1);
            seen.push(id.0);
        });
        seen.sort_unstable();
        assert_eq!(seen, vec![1, 2, 3, 4]);
    }
}
