//! The attribution engine: one instance per intercepted connection.
//!
//! ```text
//! ProtocolEvent ──▶ registry / swing history / ledger   (state only)
//!                       │
//! DamageNotification ──▶ scorer ──▶ reflected? ──▶ plausible? ──▶ emitter
//!                       │
//!                       └─ nothing found ──▶ recheck (delay) ──▶ scorer again
//! ```
//!
//! The engine is `Send + Sync`; clone it freely, every clone shares the same
//! state. Events from both directions of the connection may be handled
//! concurrently.

use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::attribution::{AttackerCandidate, Attributor};
use crate::clock::{Clock, MonotonicClock};
use crate::config::{HitmarkConfig, ReflectStrategy};
use crate::error::Result;
use crate::events::ProtocolEvent;
use crate::ledger::SelfAttackLedger;
use crate::metrics::{EngineStats, StatsSnapshot};
use crate::notify::{NotificationEmitter, Notifier};
use crate::recheck::{RecheckKey, RecheckScheduler};
use crate::registry::EntityRegistry;
use crate::swing::SwingHistory;
use crate::types::{EntityId, Timestamp};

/// What became of one damage notification.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributionOutcome {
    /// Not about the local player, no session yet, or attribution disabled.
    Ignored,
    /// The local player's position is not known yet.
    NoVictimPosition,
    /// An attacker was found and reported.
    Attributed(AttackerCandidate),
    /// The best candidate was struck by us moments ago: reflected damage.
    Reflected {
        /// The entity we had just attacked.
        attacker: EntityId,
    },
    /// An attacker was found but failed the plausibility limits.
    Suppressed(AttackerCandidate),
    /// Nothing found yet; a deferred recheck is armed.
    Pending,
    /// Nothing found and no recheck will follow.
    Unresolved,
}

impl AttributionOutcome {
    /// The resolved candidate, reported or not.
    #[must_use]
    pub fn candidate(&self) -> Option<&AttackerCandidate> {
        match self {
            Self::Attributed(c) | Self::Suppressed(c) => Some(c),
            _ => None,
        }
    }

    /// Whether a hit report went out.
    #[must_use]
    pub fn is_reported(&self) -> bool {
        matches!(self, Self::Attributed(_))
    }
}

struct EngineInner {
    config: HitmarkConfig,
    registry: Arc<EntityRegistry>,
    history: Arc<SwingHistory>,
    ledger: SelfAttackLedger,
    attributor: Attributor,
    emitter: NotificationEmitter,
    recheck: RecheckScheduler,
    clock: Arc<dyn Clock>,
    local: RwLock<Option<EntityId>>,
    stats: EngineStats,
}

/// Combat attribution for one connection.
#[derive(Clone)]
pub struct AttributionEngine {
    inner: Arc<EngineInner>,
}

impl AttributionEngine {
    /// Create an engine timed by the async runtime's clock.
    ///
    /// # Errors
    /// Returns `HitmarkError::Config` if `config` fails validation.
    pub fn new(config: HitmarkConfig, notifier: Arc<dyn Notifier>) -> Result<Self> {
        Self::with_clock(config, notifier, Arc::new(MonotonicClock::new()))
    }

    /// Create an engine with an explicit time source.
    ///
    /// # Errors
    /// Returns `HitmarkError::Config` if `config` fails validation.
    pub fn with_clock(
        config: HitmarkConfig,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        config.validate()?;
        let registry = Arc::new(EntityRegistry::new());
        let history = Arc::new(SwingHistory::new(config.history.swing_capacity));
        let attributor = Attributor::new(
            Arc::clone(&registry),
            Arc::clone(&history),
            config.scoring.clone(),
        );
        let emitter = NotificationEmitter::new(notifier, config.notify.clone());
        let recheck = RecheckScheduler::new(Duration::from_millis(config.recheck.delay_ms));

        Ok(Self {
            inner: Arc::new(EngineInner {
                config,
                registry,
                history,
                ledger: SelfAttackLedger::new(),
                attributor,
                emitter,
                recheck,
                clock,
                local: RwLock::new(None),
                stats: EngineStats::new(),
            }),
        })
    }

    /// Apply one inbound event.
    ///
    /// Returns the outcome for a damage notification, `None` for every
    /// other event.
    pub fn handle(&self, event: ProtocolEvent) -> Option<AttributionOutcome> {
        let inner = &self.inner;
        match event {
            ProtocolEvent::SessionStart {
                local,
                username,
                position,
            } => {
                info!(local = %local, username = %username, "Session started");
                *inner.local.write() = Some(local);
                inner.registry.upsert(local, username, position, None);
            }
            ProtocolEvent::EntitySighted {
                id,
                name,
                position,
                rotation,
            } => {
                debug!(entity = %id, name = %name, "Entity sighted");
                inner.registry.upsert(id, name, position, rotation);
            }
            ProtocolEvent::EntityMoved {
                id,
                position,
                rotation,
            } => {
                let known = match rotation {
                    Some(rotation) => {
                        inner.registry.update_position_and_rotation(id, position, rotation)
                    }
                    None => inner.registry.update_position(id, position),
                };
                if !known {
                    debug!(entity = %id, "Movement for untracked entity ignored");
                }
            }
            ProtocolEvent::AttackAnimation { id } => self.record_swing(id),
            ProtocolEvent::DamageNotification { id } => return Some(self.on_damage(id)),
            ProtocolEvent::EquipmentChanged { id, item } => {
                if !inner.registry.set_weapon(id, item) {
                    debug!(entity = %id, "Equipment held until entity is sighted");
                }
            }
            ProtocolEvent::OutboundAttack { target } => {
                let now = inner.clock.now();
                inner.ledger.prune(now, inner.config.reflect.window_ms);
                inner.ledger.record_self_attack(target, now);
            }
            ProtocolEvent::EntityLeft { id } => self.remove_entity(id),
        }
        None
    }

    /// Attribute a damage notification for `victim`.
    ///
    /// Only damage to the local player is attributed.
    pub fn on_damage(&self, victim: EntityId) -> AttributionOutcome {
        let inner = &self.inner;
        if self.local_entity() != Some(victim) || !inner.config.general.enabled {
            return AttributionOutcome::Ignored;
        }
        EngineStats::bump(&inner.stats.damage_events);

        let now = inner.clock.now();
        if !inner.registry.contains(victim) {
            warn!(victim = %victim, "Local player position unknown, hit not attributed");
            return AttributionOutcome::NoVictimPosition;
        }

        match inner.attributor.attribute(victim, now) {
            Some(candidate) => inner.resolve(candidate, now),
            None => self.defer(victim, now),
        }
    }

    /// Forget an entity everywhere.
    pub fn remove_entity(&self, id: EntityId) {
        let inner = &self.inner;
        if inner.registry.remove(id).is_some() {
            debug!(entity = %id, "Entity left");
        }
        inner.history.clear(id);
        inner.ledger.clear(id);
    }

    /// Runtime id of the local player, once the session has started.
    #[must_use]
    pub fn local_entity(&self) -> Option<EntityId> {
        *self.inner.local.read()
    }

    /// Current counter values.
    #[must_use]
    pub fn stats(&self) -> StatsSnapshot {
        self.inner.stats.snapshot()
    }

    /// Configuration in use.
    #[must_use]
    pub fn config(&self) -> &HitmarkConfig {
        &self.inner.config
    }

    /// Entity state.
    #[must_use]
    pub fn registry(&self) -> &EntityRegistry {
        &self.inner.registry
    }

    /// Swing history.
    #[must_use]
    pub fn history(&self) -> &SwingHistory {
        &self.inner.history
    }

    /// Self-attack ledger.
    #[must_use]
    pub fn ledger(&self) -> &SelfAttackLedger {
        &self.inner.ledger
    }

    /// Rechecks waiting to fire.
    #[must_use]
    pub fn pending_rechecks(&self) -> usize {
        self.inner.recheck.pending()
    }

    /// Cancel every pending recheck. Returns how many were cancelled.
    pub fn shutdown(&self) -> usize {
        let cancelled = self.inner.recheck.shutdown();
        info!(cancelled, "Attribution engine shut down");
        cancelled
    }

    fn record_swing(&self, id: EntityId) {
        let inner = &self.inner;
        let Some((position, rotation)) = inner.registry.pose(id) else {
            debug!(entity = %id, "Swing from entity with unknown position dropped");
            return;
        };
        let now = inner.clock.now();
        inner.history.record_swing(id, now, position, rotation);
        EngineStats::bump(&inner.stats.swings_recorded);
    }

    fn defer(&self, victim: EntityId, now: Timestamp) -> AttributionOutcome {
        let inner = &self.inner;
        if !inner.config.recheck.enabled {
            debug!(victim = %victim, "No attacker found, rechecks disabled");
            EngineStats::bump(&inner.stats.rechecks_dropped);
            return AttributionOutcome::Unresolved;
        }

        let key = RecheckKey {
            damage_at: now,
            victim,
        };
        let engine: Weak<EngineInner> = Arc::downgrade(&self.inner);
        let scheduled = inner.recheck.schedule(key, move || {
            if let Some(inner) = engine.upgrade() {
                inner.recheck(victim);
            }
        });
        match scheduled {
            Ok(_) => {
                EngineStats::bump(&inner.stats.rechecks_scheduled);
                AttributionOutcome::Pending
            }
            Err(e) => {
                warn!(victim = %victim, error = %e, "Recheck could not be scheduled");
                EngineStats::bump(&inner.stats.rechecks_dropped);
                AttributionOutcome::Unresolved
            }
        }
    }
}

impl EngineInner {
    /// Second attempt after the recheck delay.
    fn recheck(&self, victim: EntityId) {
        let now = self.clock.now();
        match self.attributor.attribute(victim, now) {
            Some(candidate) => {
                EngineStats::bump(&self.stats.rechecks_resolved);
                let outcome = self.resolve(candidate, now);
                debug!(victim = %victim, reported = outcome.is_reported(), "Recheck resolved");
            }
            None => {
                EngineStats::bump(&self.stats.rechecks_dropped);
                debug!(victim = %victim, "Recheck found no attacker, hit dropped");
            }
        }
    }

    /// Reflected-damage check, plausibility gate, then report.
    fn resolve(&self, candidate: AttackerCandidate, now: Timestamp) -> AttributionOutcome {
        let reflect = &self.config.reflect;
        if reflect.strategy == ReflectStrategy::Ledger
            && self
                .ledger
                .consume_if_recent(candidate.attacker, now, reflect.window_ms)
        {
            info!(
                attacker = %candidate.attacker,
                name = %candidate.attacker_name,
                "Reflected damage from our own attack, not reported"
            );
            EngineStats::bump(&self.stats.reflected);
            return AttributionOutcome::Reflected {
                attacker: candidate.attacker,
            };
        }

        if let Some(reason) = self.emitter.check_plausible(&candidate) {
            info!(
                attacker = %candidate.attacker,
                name = %candidate.attacker_name,
                ?reason,
                "Implausible hit withheld"
            );
            EngineStats::bump(&self.stats.suppressed);
            return AttributionOutcome::Suppressed(candidate);
        }

        let weapon = self.registry.weapon(candidate.attacker);
        let delivery = self.emitter.emit(&candidate, weapon.as_deref());
        if delivery.failed > 0 {
            self.stats
                .notify_failures
                .fetch_add(delivery.failed as u64, std::sync::atomic::Ordering::Relaxed);
        }
        EngineStats::bump(&self.stats.attributed);
        AttributionOutcome::Attributed(candidate)
    }
}
