//! Runtime counters for the attribution engine.
//!
//! Lock-free `AtomicU64` counters incremented on the hot path and read on
//! demand. A [`StatsSnapshot`] can be rendered as Prometheus text for a
//! proxy's diagnostics endpoint.

use std::sync::atomic::{AtomicU64, Ordering};

/// Atomic counters for one engine instance.
#[derive(Debug)]
pub struct EngineStats {
    /// Damage notifications concerning the local player.
    pub damage_events: AtomicU64,
    /// Hits resolved to an attacker and reported.
    pub attributed: AtomicU64,
    /// Hits recognised as reflected damage and suppressed.
    pub reflected: AtomicU64,
    /// Hits withheld by the plausibility gate.
    pub suppressed: AtomicU64,
    /// Deferred rechecks armed.
    pub rechecks_scheduled: AtomicU64,
    /// Deferred rechecks that found an attacker.
    pub rechecks_resolved: AtomicU64,
    /// Deferred rechecks that found nothing, or could not be armed.
    pub rechecks_dropped: AtomicU64,
    /// Channel sends that failed.
    pub notify_failures: AtomicU64,
    /// Attack animations stored in the swing history.
    pub swings_recorded: AtomicU64,
}

impl EngineStats {
    /// Create a zeroed set of counters.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            damage_events: AtomicU64::new(0),
            attributed: AtomicU64::new(0),
            reflected: AtomicU64::new(0),
            suppressed: AtomicU64::new(0),
            rechecks_scheduled: AtomicU64::new(0),
            rechecks_resolved: AtomicU64::new(0),
            rechecks_dropped: AtomicU64::new(0),
            notify_failures: AtomicU64::new(0),
            swings_recorded: AtomicU64::new(0),
        }
    }

    /// Increment a counter by one.
    pub fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Snapshot all counters.
    #[must_use]
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            damage_events: self.damage_events.load(Ordering::Relaxed),
            attributed: self.attributed.load(Ordering::Relaxed),
            reflected: self.reflected.load(Ordering::Relaxed),
            suppressed: self.suppressed.load(Ordering::Relaxed),
            rechecks_scheduled: self.rechecks_scheduled.load(Ordering::Relaxed),
            rechecks_resolved: self.rechecks_resolved.load(Ordering::Relaxed),
            rechecks_dropped: self.rechecks_dropped.load(Ordering::Relaxed),
            notify_failures: self.notify_failures.load(Ordering::Relaxed),
            swings_recorded: self.swings_recorded.load(Ordering::Relaxed),
        }
    }
}

impl Default for EngineStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Counter values at a point in time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// Damage notifications concerning the local player.
    pub damage_events: u64,
    /// Hits reported.
    pub attributed: u64,
    /// Reflected hits suppressed.
    pub reflected: u64,
    /// Hits withheld by the plausibility gate.
    pub suppressed: u64,
    /// Rechecks armed.
    pub rechecks_scheduled: u64,
    /// Rechecks that found an attacker.
    pub rechecks_resolved: u64,
    /// Rechecks dropped.
    pub rechecks_dropped: u64,
    /// Failed channel sends.
    pub notify_failures: u64,
    /// Swings stored.
    pub swings_recorded: u64,
}

impl StatsSnapshot {
    /// Format as Prometheus-compatible text.
    #[must_use]
    pub fn to_prometheus(&self) -> String {
        let rows: [(&str, &str, u64); 9] = [
            ("damage_events", "Damage notifications for the local player", self.damage_events),
            ("attributed", "Hits attributed and reported", self.attributed),
            ("reflected", "Reflected hits suppressed", self.reflected),
            ("suppressed", "Hits withheld as implausible", self.suppressed),
            ("rechecks_scheduled", "Deferred rechecks armed", self.rechecks_scheduled),
            ("rechecks_resolved", "Deferred rechecks that found an attacker", self.rechecks_resolved),
            ("rechecks_dropped", "Deferred rechecks dropped", self.rechecks_dropped),
            ("notify_failures", "Failed notification sends", self.notify_failures),
            ("swings_recorded", "Attack animations recorded", self.swings_recorded),
        ];
        let mut out = String::with_capacity(rows.len() * 128);
        for (name, help, value) in rows {
            out.push_str(&format!(
                "# HELP hitmark_{name}_total {help}\n\
                 # TYPE hitmark_{name}_total counter\n\
                 hitmark_{name}_total {value}\n"
            ));
        }
        out
    }
}
