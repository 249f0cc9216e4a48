//! Configuration for the attribution engine.
//!
//! Maps directly to `hitmark.toml`. Every tuning constant the scorer, the
//! recheck timer and the reflected-damage check use lives here; the defaults
//! are the most recent values observed in production.

use serde::{Deserialize, Serialize};

use crate::error::{HitmarkError, Result};

/// Top-level hitmark configuration, loadable from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HitmarkConfig {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,
    /// Candidate scoring.
    #[serde(default)]
    pub scoring: ScoringConfig,
    /// Swing history bounds.
    #[serde(default)]
    pub history: HistoryConfig,
    /// Reflected (thorns) damage handling.
    #[serde(default)]
    pub reflect: ReflectConfig,
    /// Deferred recheck timing.
    #[serde(default)]
    pub recheck: RecheckConfig,
    /// Outbound message formatting and channels.
    #[serde(default)]
    pub notify: NotifyConfig,
}

impl HitmarkConfig {
    /// Load configuration from a TOML string.
    ///
    /// # Errors
    /// Returns `HitmarkError::Config` if the TOML is invalid or fails
    /// [`validate`](Self::validate).
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(toml_str).map_err(|e| HitmarkError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Reject values the engine cannot work with.
    ///
    /// # Errors
    /// Returns `HitmarkError::Config` naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        let s = &self.scoring;
        if self.history.swing_capacity == 0 {
            return Err(HitmarkError::Config(
                "history.swing_capacity must be at least 1".into(),
            ));
        }
        if !(s.max_distance.is_finite() && s.max_distance > 0.0) {
            return Err(HitmarkError::Config(
                "scoring.max_distance must be positive".into(),
            ));
        }
        if !(s.max_angle_deg.is_finite() && s.max_angle_deg > 0.0) {
            return Err(HitmarkError::Config(
                "scoring.max_angle_deg must be positive".into(),
            ));
        }
        if !(s.time_sigma_ms.is_finite() && s.time_sigma_ms > 0.0) {
            return Err(HitmarkError::Config(
                "scoring.time_sigma_ms must be positive".into(),
            ));
        }
        let w = &s.weights;
        for (name, value) in [("time", w.time), ("distance", w.distance), ("angle", w.angle)] {
            if !value.is_finite() || value < 0.0 {
                return Err(HitmarkError::Config(format!(
                    "scoring.weights.{name} must be a non-negative number"
                )));
            }
        }
        if (w.sum() - 1.0).abs() > 0.01 {
            return Err(HitmarkError::Config(format!(
                "scoring.weights must sum to 1.0 (got {:.3})",
                w.sum()
            )));
        }
        if self.reflect.window_ms == 0 && self.reflect.strategy == ReflectStrategy::Ledger {
            return Err(HitmarkError::Config(
                "reflect.window_ms must be positive with the ledger strategy".into(),
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// General system settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Whether attribution runs at all. When false, state is still tracked.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Log level: trace, debug, info, warn, error.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            log_level: "info".to_string(),
        }
    }
}

/// Candidate filtering and scoring constants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Swings older than this are never candidates (ms).
    #[serde(default = "default_2500")]
    pub max_time_window_ms: u64,
    /// Horizontal distance beyond which a swing is skipped (blocks).
    #[serde(default = "default_15_0")]
    pub max_distance: f64,
    /// Elapsed time at which the time score peaks (ms).
    #[serde(default = "default_100_0")]
    pub optimal_elapsed_ms: f64,
    /// Spread of the time-score Gaussian (ms).
    #[serde(default = "default_150_0")]
    pub time_sigma_ms: f64,
    /// Aim offset at which the angle score reaches zero (degrees).
    #[serde(default = "default_90_0")]
    pub max_angle_deg: f64,
    /// Aim offset assumed when the swing carried no rotation (degrees).
    #[serde(default = "default_90_0")]
    pub default_angle_deg: f64,
    /// Weighted-sum coefficients.
    #[serde(default)]
    pub weights: ScoringWeights,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            max_time_window_ms: 2500,
            max_distance: 15.0,
            optimal_elapsed_ms: 100.0,
            time_sigma_ms: 150.0,
            max_angle_deg: 90.0,
            default_angle_deg: 90.0,
            weights: ScoringWeights::default(),
        }
    }
}

/// Scoring weights. Must sum to ~1.0.
///
/// Earlier tunings used 0.45 / 0.40 / 0.15.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ScoringWeights {
    /// Weight of the time factor.
    #[serde(default = "default_0_3")]
    pub time: f64,
    /// Weight of the distance factor.
    #[serde(default = "default_0_5")]
    pub distance: f64,
    /// Weight of the aim-angle factor.
    #[serde(default = "default_0_2")]
    pub angle: f64,
}

impl ScoringWeights {
    /// Sum of all weights.
    #[must_use]
    pub fn sum(&self) -> f64 {
        self.time + self.distance + self.angle
    }
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            time: 0.30,
            distance: 0.50,
            angle: 0.20,
        }
    }
}

/// Swing history bounds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Swings kept per entity; the oldest is evicted first.
    #[serde(default = "default_20_usize")]
    pub swing_capacity: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self { swing_capacity: 20 }
    }
}

/// How reflected damage is told apart from a real attack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReflectStrategy {
    /// Suppress a hit whose attacker we struck within the window.
    Ledger,
    /// Ignore the ledger and let the scoring filters decide.
    Implicit,
}

/// Reflected damage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReflectConfig {
    /// Which strategy to apply.
    #[serde(default = "default_ledger")]
    pub strategy: ReflectStrategy,
    /// A self attack this recent explains a hit from its target (ms).
    /// Earlier tunings used 100.
    #[serde(default = "default_300")]
    pub window_ms: u64,
}

impl Default for ReflectConfig {
    fn default() -> Self {
        Self {
            strategy: ReflectStrategy::Ledger,
            window_ms: 300,
        }
    }
}

/// Deferred recheck timing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecheckConfig {
    /// Whether an unresolved hit gets a second attempt.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Delay before the second attempt (ms).
    #[serde(default = "default_300")]
    pub delay_ms: u64,
}

impl Default for RecheckConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            delay_ms: 300,
        }
    }
}

/// Outbound message formatting and channel selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyConfig {
    /// Send to the durable transcript (chat) channel.
    #[serde(default = "default_true")]
    pub transcript: bool,
    /// Send to the transient overlay channel.
    #[serde(default = "default_true")]
    pub overlay: bool,
    /// Emit `§` colour codes.
    #[serde(default = "default_true")]
    pub color_codes: bool,
    /// Item identifier meaning "nothing in hand"; never shown as a weapon.
    #[serde(default = "default_empty_hand")]
    pub empty_hand_item: String,
    /// Namespace prefix stripped from item identifiers before display.
    #[serde(default = "default_item_namespace")]
    pub item_namespace: String,
    /// If set, hits reported from farther than this are withheld (blocks).
    #[serde(default)]
    pub max_report_distance: Option<f64>,
    /// If set, hits with a larger aim offset are withheld (degrees).
    #[serde(default)]
    pub max_report_angle: Option<f64>,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            transcript: true,
            overlay: true,
            color_codes: true,
            empty_hand_item: "minecraft:air".to_string(),
            item_namespace: "minecraft:".to_string(),
            max_report_distance: None,
            max_report_angle: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Serde default helpers
// ---------------------------------------------------------------------------

fn default_true() -> bool { true }
fn default_log_level() -> String { "info".to_string() }
fn default_empty_hand() -> String { "minecraft:air".to_string() }
fn default_item_namespace() -> String { "minecraft:".to_string() }
fn default_ledger() -> ReflectStrategy { ReflectStrategy::Ledger }
fn default_0_2() -> f64 { 0.2 }
fn default_0_3() -> f64 { 0.3 }
fn default_0_5() -> f64 { 0.5 }
fn default_15_0() -> f64 { 15.0 }
fn default_90_0() -> f64 { 90.0 }
fn default_100_0() -> f64 { 100.0 }
fn default_150_0() -> f64 { 150.0 }
fn default_20_usize() -> usize { 20 }
fn default_300() -> u64 { 300 }
fn default_2500() -> u64 { 2500 }
