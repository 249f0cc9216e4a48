//! Notification Emitter: turns a resolved attribution into player-facing text.
//!
//! The same line goes out on two channels, the durable transcript (chat)
//! and the transient overlay. Delivery belongs to a [`Notifier`]
//! implementation supplied by the integration layer. Sends are never
//! retried; a failed send is logged, counted by the caller and forgotten.

use std::fmt;
use std::fmt::Write as _;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::attribution::AttackerCandidate;
use crate::config::NotifyConfig;
use crate::error::Result;

/// Where a notification is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Durable, scrollable history (chat).
    Transcript,
    /// Short-lived on-screen text.
    Overlay,
}

impl Channel {
    /// Both channels, transcript first.
    pub const ALL: [Self; 2] = [Self::Transcript, Self::Overlay];
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transcript => write!(f, "transcript"),
            Self::Overlay => write!(f, "overlay"),
        }
    }
}

/// Outbound collaborator that actually delivers text to the player.
pub trait Notifier: Send + Sync {
    /// Deliver `text` on `channel`.
    ///
    /// # Errors
    /// Implementations return [`HitmarkError::Notify`](crate::HitmarkError::Notify)
    /// when the text could not be handed off.
    fn send(&self, channel: Channel, text: &str) -> Result<()>;
}

/// Notifier that keeps everything it is given. Useful in tests and for
/// dry runs.
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    sent: Mutex<Vec<(Channel, String)>>,
}

impl MemoryNotifier {
    /// Create an empty notifier.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything sent so far, in order.
    #[must_use]
    pub fn sent(&self) -> Vec<(Channel, String)> {
        self.sent.lock().clone()
    }

    /// Texts sent on one channel.
    #[must_use]
    pub fn sent_on(&self, channel: Channel) -> Vec<String> {
        self.sent
            .lock()
            .iter()
            .filter(|(c, _)| *c == channel)
            .map(|(_, text)| text.clone())
            .collect()
    }
}

impl Notifier for MemoryNotifier {
    fn send(&self, channel: Channel, text: &str) -> Result<()> {
        self.sent.lock().push((channel, text.to_owned()));
        Ok(())
    }
}

/// Why a candidate was not reported.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Withheld {
    /// Farther away than `max_report_distance`.
    TooFar {
        /// Measured horizontal distance.
        distance: f64,
        /// Configured limit.
        limit: f64,
    },
    /// Aim offset larger than `max_report_angle`.
    WideAngle {
        /// Measured aim offset.
        angle: f64,
        /// Configured limit.
        limit: f64,
    },
}

/// Result of one emission.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Delivery {
    /// Channels the text was handed to.
    pub delivered: usize,
    /// Channels whose send failed.
    pub failed: usize,
}

/// Formats hit reports and fans them out to the enabled channels.
pub struct NotificationEmitter {
    notifier: Arc<dyn Notifier>,
    config: NotifyConfig,
}

impl NotificationEmitter {
    /// Create an emitter over an outbound collaborator.
    #[must_use]
    pub fn new(notifier: Arc<dyn Notifier>, config: NotifyConfig) -> Self {
        Self { notifier, config }
    }

    /// Formatting and gate settings in use.
    #[must_use]
    pub fn config(&self) -> &NotifyConfig {
        &self.config
    }

    /// Apply the optional plausibility limits.
    ///
    /// The angle limit only applies to a measured aim offset; a swing
    /// without rotation is never withheld for its angle.
    #[must_use]
    pub fn check_plausible(&self, candidate: &AttackerCandidate) -> Option<Withheld> {
        if let Some(limit) = self.config.max_report_distance
            && candidate.distance > limit
        {
            return Some(Withheld::TooFar {
                distance: candidate.distance,
                limit,
            });
        }
        if let (Some(limit), Some(angle)) =
            (self.config.max_report_angle, candidate.measured_aim_angle())
            && angle > limit
        {
            return Some(Withheld::WideAngle { angle, limit });
        }
        None
    }

    /// Format and send a report for `candidate` holding `weapon`.
    pub fn emit(&self, candidate: &AttackerCandidate, weapon: Option<&str>) -> Delivery {
        let message = format_report(candidate, weapon, &self.config);
        info!(
            attacker = %candidate.attacker,
            name = %candidate.attacker_name,
            distance = candidate.distance,
            elapsed_ms = candidate.elapsed_ms,
            score = candidate.score,
            "Hit attributed"
        );

        let mut delivery = Delivery::default();
        for channel in Channel::ALL {
            if !self.channel_enabled(channel) {
                continue;
            }
            match self.notifier.send(channel, &message) {
                Ok(()) => {
                    debug!(%channel, "Hit report sent");
                    delivery.delivered += 1;
                }
                Err(e) => {
                    warn!(%channel, error = %e, "Hit report could not be delivered");
                    delivery.failed += 1;
                }
            }
        }
        delivery
    }

    fn channel_enabled(&self, channel: Channel) -> bool {
        match channel {
            Channel::Transcript => self.config.transcript,
            Channel::Overlay => self.config.overlay,
        }
    }
}

/// Readable weapon label, or `None` for the empty hand.
///
/// `minecraft:diamond_sword` becomes `diamond sword`.
#[must_use]
pub fn weapon_label(item: &str, config: &NotifyConfig) -> Option<String> {
    if item.is_empty() || item == config.empty_hand_item {
        return None;
    }
    let bare = item.strip_prefix(config.item_namespace.as_str()).unwrap_or(item);
    Some(bare.replace('_', " "))
}

/// Build the report line.
///
/// With colour codes:
/// `§c[HIT] §f{name}§7 hit you from §e{dist}§7 blocks §8[§e{weapon}§8] §8[§6{angle}°§8]`
/// where the weapon and angle tags are only present when known.
#[must_use]
pub fn format_report(
    candidate: &AttackerCandidate,
    weapon: Option<&str>,
    config: &NotifyConfig,
) -> String {
    let weapon = weapon.and_then(|item| weapon_label(item, config));
    let angle = candidate.measured_aim_angle();
    let name = &candidate.attacker_name;
    let distance = candidate.distance;

    let mut out = String::with_capacity(96);
    // Writing into a String cannot fail.
    if config.color_codes {
        let _ = write!(out, "§c[HIT] §f{name}§7 hit you from §e{distance:.2}§7 blocks");
        if let Some(weapon) = weapon {
            let _ = write!(out, " §8[§e{weapon}§8]");
        }
        if let Some(angle) = angle {
            let _ = write!(out, " §8[§6{angle:.1}°§8]");
        }
    } else {
        let _ = write!(out, "[HIT] {name} hit you from {distance:.2} blocks");
        if let Some(weapon) = weapon {
            let _ = write!(out, " [{weapon}]");
        }
        if let Some(angle) = angle {
            let _ = write!(out, " [{angle:.1}°]");
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribution::ScoreBreakdown;
    use crate::error::HitmarkError;
    use crate::types::{EntityId, Rotation};
    use glam::Vec3;

    fn candidate(distance: f64, rotation: Option<Rotation>, angle: f64) -> AttackerCandidate {
        AttackerCandidate {
            attacker: EntityId(2),
            attacker_name: "Alex".into(),
            swing_position: Vec3::ZERO,
            swing_rotation: rotation,
            elapsed_ms: 80,
            distance,
            aim_angle: angle,
            breakdown: ScoreBreakdown::default(),
            score: 0.5,
        }
    }

    struct FailingNotifier;

    impl Notifier for FailingNotifier {
        fn send(&self, channel: Channel, _text: &str) -> Result<()> {
            Err(HitmarkError::Notify {
                channel,
                reason: "connection closed".into(),
            })
        }
    }

    #[test]
    fn full_report_with_weapon_and_angle() {
        let c = candidate(3.14159, Some(Rotation::default()), 12.34);
        let text = format_report(&c, Some("minecraft:diamond_sword"), &NotifyConfig::default());
        assert_eq!(
            text,
            "§c[HIT] §fAlex§7 hit you from §e3.14§7 blocks §8[§ediamond sword§8] §8[§612.3°§8]"
        );
    }

    #[test]
    fn empty_hand_and_missing_rotation_drop_their_tags() {
        let c = candidate(5.0, None, 90.0);
        let text = format_report(&c, Some("minecraft:air"), &NotifyConfig::default());
        assert_eq!(text, "§c[HIT] §fAlex§7 hit you from §e5.00§7 blocks");
    }

    #[test]
    fn plain_text_without_colour_codes() {
        let config = NotifyConfig {
            color_codes: false,
            ..NotifyConfig::default()
        };
        let c = candidate(2.0, Some(Rotation::default()), 7.0);
        let text = format_report(&c, Some("minecraft:stone_axe"), &config);
        assert_eq!(text, "[HIT] Alex hit you from 2.00 blocks [stone axe] [7.0°]");
    }

    #[test]
    fn weapon_label_only_strips_the_configured_namespace() {
        let config = NotifyConfig::default();
        assert_eq!(weapon_label("minecraft:iron_sword", &config).as_deref(), Some("iron sword"));
        assert_eq!(weapon_label("custom:blade", &config).as_deref(), Some("custom:blade"));
        assert_eq!(weapon_label("minecraft:air", &config), None);
        assert_eq!(weapon_label("", &config), None);
    }

    #[test]
    fn emits_on_both_channels_by_default() {
        let sink = Arc::new(MemoryNotifier::new());
        let emitter = NotificationEmitter::new(sink.clone(), NotifyConfig::default());
        let delivery = emitter.emit(&candidate(1.0, None, 90.0), None);

        assert_eq!(delivery, Delivery { delivered: 2, failed: 0 });
        let sent = sink.sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].0, Channel::Transcript);
        assert_eq!(sent[1].0, Channel::Overlay);
        assert_eq!(sent[0].1, sent[1].1);
    }

    #[test]
    fn disabled_channel_is_skipped() {
        let sink = Arc::new(MemoryNotifier::new());
        let config = NotifyConfig {
            overlay: false,
            ..NotifyConfig::default()
        };
        let emitter = NotificationEmitter::new(sink.clone(), config);
        emitter.emit(&candidate(1.0, None, 90.0), None);
        assert!(sink.sent_on(Channel::Overlay).is_empty());
        assert_eq!(sink.sent_on(Channel::Transcript).len(), 1);
    }

    #[test]
    fn send_failures_are_counted_not_raised() {
        let emitter = NotificationEmitter::new(Arc::new(FailingNotifier), NotifyConfig::default());
        let delivery = emitter.emit(&candidate(1.0, None, 90.0), None);
        assert_eq!(delivery, Delivery { delivered: 0, failed: 2 });
    }

    #[test]
    fn gate_is_open_by_default() {
        let emitter =
            NotificationEmitter::new(Arc::new(MemoryNotifier::new()), NotifyConfig::default());
        let far = candidate(14.9, Some(Rotation::default()), 89.0);
        assert!(emitter.check_plausible(&far).is_none());
    }

    #[test]
    fn gate_withholds_far_and_wide_hits() {
        let config = NotifyConfig {
            max_report_distance: Some(10.0),
            max_report_angle: Some(45.0),
            ..NotifyConfig::default()
        };
        let emitter = NotificationEmitter::new(Arc::new(MemoryNotifier::new()), config);

        assert!(matches!(
            emitter.check_plausible(&candidate(12.0, None, 90.0)),
            Some(Withheld::TooFar { .. })
        ));
        assert!(matches!(
            emitter.check_plausible(&candidate(3.0, Some(Rotation::default()), 60.0)),
            Some(Withheld::WideAngle { .. })
        ));
        // Assumed angle is not a measurement.
        assert!(emitter.check_plausible(&candidate(3.0, None, 90.0)).is_none());
    }
}
