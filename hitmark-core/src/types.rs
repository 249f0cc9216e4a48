//! Core type definitions for the attribution engine.
//!
//! Positions are [`glam::Vec3`] in protocol world space (Y is up). Rotations
//! keep the protocol's own layout (pitch, yaw, head-yaw in degrees) because
//! the scorer only ever needs the look vector derived from them.

use glam::{DVec3, Vec3};
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Identity Types
// ---------------------------------------------------------------------------

/// Runtime identifier of an entity within one intercepted session.
///
/// Opaque to the engine: it is only ever compared and hashed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u64);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for EntityId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// Monotonic timestamp in milliseconds, relative to an engine-chosen origin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(pub u64);

impl Timestamp {
    /// Milliseconds elapsed from `earlier` to `self`.
    ///
    /// Saturates at zero: a swing stamped after the damage event it is
    /// compared against counts as simultaneous.
    #[must_use]
    pub fn millis_since(self, earlier: Self) -> u64 {
        self.0.saturating_sub(earlier.0)
    }

    /// This timestamp shifted forward by `millis`.
    #[must_use]
    pub fn plus_millis(self, millis: u64) -> Self {
        Self(self.0.saturating_add(millis))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

// ---------------------------------------------------------------------------
// Spatial
// ---------------------------------------------------------------------------

/// A 3D world position.
pub type Position = Vec3;

/// Entity orientation as carried by the protocol: pitch, yaw, head-yaw in degrees.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rotation {
    /// Vertical look angle. Positive looks down.
    pub pitch: f32,
    /// Body yaw. 0 faces +Z, 90 faces -X.
    pub yaw: f32,
    /// Head yaw; carried through but not used for aim.
    pub head_yaw: f32,
}

impl Rotation {
    /// Create a rotation from its three protocol components.
    #[must_use]
    pub fn new(pitch: f32, yaw: f32, head_yaw: f32) -> Self {
        Self {
            pitch,
            yaw,
            head_yaw,
        }
    }

    /// Build from the protocol's packed `(pitch, yaw, head_yaw)` vector.
    #[must_use]
    pub fn from_vec3(packed: Vec3) -> Self {
        Self::new(packed.x, packed.y, packed.z)
    }

    /// Unit look vector for this pitch/yaw (spherical → Cartesian).
    #[must_use]
    pub fn look_vector(&self) -> DVec3 {
        let pitch = f64::from(self.pitch).to_radians();
        let yaw = f64::from(self.yaw).to_radians();
        DVec3::new(
            -yaw.sin() * pitch.cos(),
            -pitch.sin(),
            yaw.cos() * pitch.cos(),
        )
    }
}

impl fmt::Display for Rotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(pitch {:.1}, yaw {:.1}, head {:.1})",
            self.pitch, self.yaw, self.head_yaw
        )
    }
}
