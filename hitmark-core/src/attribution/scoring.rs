//! Per-factor scoring functions for attacker candidates.
//!
//! Score = w₁·Time(s) + w₂·Distance(s) + w₃·Angle(s)
//!
//! Where:
//!   Time(s)     = exp(-(Δt - t₀)² / 2σ²)     (peaks at the typical packet lag)
//!   Distance(s) = max(0, 1 - d / d_max)      (d measured in the X/Z plane)
//!   Angle(s)    = max(0, 1 - θ / θ_max)      (θ = aim offset toward the victim)

use glam::DVec3;

use crate::config::ScoringConfig;
use crate::types::{Position, Rotation};

/// Direction vectors shorter than this are treated as "standing on the victim".
const MIN_AIM_DISTANCE: f64 = 0.001;

/// Breakdown of a candidate score into its weighted factors.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScoreBreakdown {
    /// Weighted time contribution.
    pub time: f64,
    /// Weighted distance contribution.
    pub distance: f64,
    /// Weighted aim-angle contribution.
    pub angle: f64,
}

impl ScoreBreakdown {
    /// Composite score.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.time + self.distance + self.angle
    }
}

/// Compute the weighted breakdown for one swing.
#[must_use]
pub fn compute_breakdown(
    elapsed_ms: u64,
    distance: f64,
    angle_deg: f64,
    config: &ScoringConfig,
) -> ScoreBreakdown {
    let w = &config.weights;
    ScoreBreakdown {
        time: w.time * time_score(elapsed_ms, config),
        distance: w.distance * distance_score(distance, config),
        angle: w.angle * angle_score(angle_deg, config),
    }
}

/// Gaussian time score centred on `optimal_elapsed_ms`.
#[must_use]
pub fn time_score(elapsed_ms: u64, config: &ScoringConfig) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let deviation = elapsed_ms as f64 - config.optimal_elapsed_ms;
    let sigma = config.time_sigma_ms;
    (-(deviation * deviation) / (2.0 * sigma * sigma)).exp()
}

/// Linear distance score: 1 at zero blocks, 0 at `max_distance`.
#[must_use]
pub fn distance_score(distance: f64, config: &ScoringConfig) -> f64 {
    (1.0 - distance / config.max_distance).max(0.0)
}

/// Linear angle score: 1 at perfect aim, 0 at `max_angle_deg`.
#[must_use]
pub fn angle_score(angle_deg: f64, config: &ScoringConfig) -> f64 {
    (1.0 - angle_deg / config.max_angle_deg).max(0.0)
}

/// Distance in the X/Z plane. Height is deliberately ignored.
#[must_use]
pub fn horizontal_distance(a: Position, b: Position) -> f64 {
    let dx = f64::from(a.x) - f64::from(b.x);
    let dz = f64::from(a.z) - f64::from(b.z);
    (dx * dx + dz * dz).sqrt()
}

/// Angle in degrees between where `rotation` looks from `from` and the
/// straight line to `target`. Zero when the two points coincide.
#[must_use]
pub fn aim_angle(from: Position, rotation: &Rotation, target: Position) -> f64 {
    let to_target: DVec3 = (target - from).as_dvec3();
    let length = to_target.length();
    if length < MIN_AIM_DISTANCE {
        return 0.0;
    }
    let dot = rotation.look_vector().dot(to_target / length);
    dot.clamp(-1.0, 1.0).acos().to_degrees()
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn config() -> ScoringConfig {
        ScoringConfig::default()
    }

    #[test]
    fn time_score_peaks_at_optimal_lag() {
        let c = config();
        assert!((time_score(100, &c) - 1.0).abs() < 1e-12);
        assert!(time_score(80, &c) > time_score(0, &c));
        assert!(time_score(250, &c) > time_score(2_000, &c));
        assert!(time_score(2_500, &c) < 1e-6);
    }

    #[test]
    fn distance_score_is_linear_and_floored() {
        let c = config();
        assert!((distance_score(0.0, &c) - 1.0).abs() < 1e-12);
        assert!((distance_score(7.5, &c) - 0.5).abs() < 1e-12);
        assert!(distance_score(15.0, &c).abs() < 1e-12);
        assert!(distance_score(40.0, &c).abs() < 1e-12);
    }

    #[test]
    fn angle_score_is_linear_and_floored() {
        let c = config();
        assert!((angle_score(0.0, &c) - 1.0).abs() < 1e-12);
        assert!((angle_score(45.0, &c) - 0.5).abs() < 1e-12);
        assert!(angle_score(180.0, &c).abs() < 1e-12);
    }

    #[test]
    fn horizontal_distance_ignores_height() {
        let a = Vec3::new(0.0, 0.0, 0.0);
        let b = Vec3::new(3.0, 50.0, 4.0);
        assert!((horizontal_distance(a, b) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn aim_angle_zero_when_looking_straight_at_target() {
        // Yaw 0 looks toward +Z.
        let angle = aim_angle(Vec3::ZERO, &Rotation::new(0.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 5.0));
        assert!(angle.abs() < 1e-6);
    }

    #[test]
    fn aim_angle_right_angle_and_behind() {
        let facing_z = Rotation::new(0.0, 0.0, 0.0);
        let side = aim_angle(Vec3::ZERO, &facing_z, Vec3::new(5.0, 0.0, 0.0));
        assert!((side - 90.0).abs() < 1e-4);
        let behind = aim_angle(Vec3::ZERO, &facing_z, Vec3::new(0.0, 0.0, -5.0));
        assert!((behind - 180.0).abs() < 1e-4);
    }

    #[test]
    fn aim_angle_zero_on_coincident_points() {
        let p = Vec3::new(1.0, 2.0, 3.0);
        assert!(aim_angle(p, &Rotation::new(30.0, 120.0, 0.0), p).abs() < f64::EPSILON);
    }

    #[test]
    fn breakdown_applies_weights() {
        let c = config();
        let b = compute_breakdown(100, 0.0, 0.0, &c);
        assert!((b.time - 0.30).abs() < 1e-12);
        assert!((b.distance - 0.50).abs() < 1e-12);
        assert!((b.angle - 0.20).abs() < 1e-12);
        assert!((b.total() - 1.0).abs() < 1e-12);
    }
}
