//! Attribution Scorer: "which recent swing best explains this hit".
//!
//! Every entity other than the victim contributes the swings in its log.
//! Each swing is filtered on age and horizontal reach, then scored on three
//! factors (see [`scoring`]). The single best swing across all entities
//! wins; ties keep whichever was found first.
//!
//! A weak answer is returned rather than none: from the player's point of
//! view "nobody hit you" and "we could not tell" look the same, and under
//! lag or poor aim a low score is still usually the right attacker.

pub mod scoring;

use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::ScoringConfig;
use crate::registry::EntityRegistry;
use crate::swing::{SwingHistory, SwingRecord};
use crate::types::{EntityId, Position, Rotation, Timestamp};

pub use scoring::ScoreBreakdown;

/// The best-matching swing for one damage event.
#[derive(Debug, Clone, PartialEq)]
pub struct AttackerCandidate {
    /// Who swung.
    pub attacker: EntityId,
    /// Display name of the attacker, `"Unknown"` if never sighted.
    pub attacker_name: String,
    /// Where they stood when they swung.
    pub swing_position: Position,
    /// Which way they faced, if known.
    pub swing_rotation: Option<Rotation>,
    /// Milliseconds from the swing to the damage event.
    pub elapsed_ms: u64,
    /// Horizontal distance from swing position to the victim (blocks).
    pub distance: f64,
    /// Aim offset used for scoring (degrees). The configured default when
    /// the swing carried no rotation.
    pub aim_angle: f64,
    /// Weighted per-factor scores.
    pub breakdown: ScoreBreakdown,
    /// Composite score.
    pub score: f64,
}

impl AttackerCandidate {
    /// Aim offset, only if it was measured rather than assumed.
    #[must_use]
    pub fn measured_aim_angle(&self) -> Option<f64> {
        self.swing_rotation.map(|_| self.aim_angle)
    }
}

/// Read-only scorer over the registry and the swing history.
pub struct Attributor {
    registry: Arc<EntityRegistry>,
    history: Arc<SwingHistory>,
    config: ScoringConfig,
}

impl Attributor {
    /// Create a scorer over shared stores.
    #[must_use]
    pub fn new(
        registry: Arc<EntityRegistry>,
        history: Arc<SwingHistory>,
        config: ScoringConfig,
    ) -> Self {
        Self {
            registry,
            history,
            config,
        }
    }

    /// Scoring configuration in use.
    #[must_use]
    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Find the swing most likely to have hurt `victim` at `now`.
    ///
    /// Returns `None` when the victim's position is unknown or no swing
    /// survives the age and reach filters.
    #[must_use]
    pub fn attribute(&self, victim: EntityId, now: Timestamp) -> Option<AttackerCandidate> {
        let Some(victim_position) = self.registry.position(victim) else {
            warn!(victim = %victim, "Victim position not tracked yet, cannot attribute");
            return None;
        };

        let mut best: Option<AttackerCandidate> = None;
        let mut considered = 0_usize;

        self.history.for_each_log(|attacker, log| {
            if attacker == victim {
                return;
            }
            for swing in log.iter_newest_first() {
                let elapsed_ms = now.millis_since(swing.timestamp);
                if elapsed_ms > self.config.max_time_window_ms {
                    // The log is in arrival order: everything older is older still.
                    debug!(attacker = %attacker, elapsed_ms, "Swing too old, skipping rest of log");
                    break;
                }
                let Some(candidate) = self.score_swing(attacker, swing, victim_position, elapsed_ms)
                else {
                    continue;
                };
                considered += 1;
                debug!(
                    attacker = %attacker,
                    elapsed_ms,
                    distance = candidate.distance,
                    angle = candidate.aim_angle,
                    time_score = candidate.breakdown.time,
                    distance_score = candidate.breakdown.distance,
                    angle_score = candidate.breakdown.angle,
                    total = candidate.score,
                    "Scored swing"
                );
                if best.as_ref().is_none_or(|b| candidate.score > b.score) {
                    best = Some(candidate);
                }
            }
        });

        debug!(
            victim = %victim,
            considered,
            found = best.is_some(),
            "Attribution pass complete"
        );
        best.map(|mut candidate| {
            candidate.attacker_name = self.registry.username(candidate.attacker);
            candidate
        })
    }

    /// Score one swing, or `None` if it is out of reach.
    fn score_swing(
        &self,
        attacker: EntityId,
        swing: &SwingRecord,
        victim_position: Position,
        elapsed_ms: u64,
    ) -> Option<AttackerCandidate> {
        let distance = scoring::horizontal_distance(swing.position, victim_position);
        if distance > self.config.max_distance {
            debug!(
                attacker = %attacker,
                distance,
                "Swing too far away"
            );
            return None;
        }

        let aim_angle = swing.rotation.map_or(self.config.default_angle_deg, |rotation| {
            scoring::aim_angle(swing.position, &rotation, victim_position)
        });

        let breakdown = scoring::compute_breakdown(elapsed_ms, distance, aim_angle, &self.config);
        Some(AttackerCandidate {
            attacker,
            attacker_name: String::new(),
            swing_position: swing.position,
            swing_rotation: swing.rotation,
            elapsed_ms,
            distance,
            aim_angle,
            breakdown,
            score: breakdown.total(),
        })
    }
}
