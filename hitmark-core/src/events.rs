//! Inbound protocol events the engine understands.
//!
//! These are game-agnostic: an integration layer decodes its own wire
//! packets and hands the engine one of these per meaningful packet.

use crate::types::{EntityId, Position, Rotation};

/// A protocol-level occurrence relevant to combat attribution.
#[derive(Debug, Clone, PartialEq)]
pub enum ProtocolEvent {
    /// The connection has been established; `local` is the intercepted player.
    SessionStart {
        /// Runtime id of the local player.
        local: EntityId,
        /// Local player's name.
        username: String,
        /// Spawn position.
        position: Position,
    },

    /// A remote entity came into view.
    EntitySighted {
        /// Runtime id.
        id: EntityId,
        /// Display name.
        name: String,
        /// Where it appeared.
        position: Position,
        /// Initial facing, if sent.
        rotation: Option<Rotation>,
    },

    /// An entity moved or turned.
    EntityMoved {
        /// Runtime id.
        id: EntityId,
        /// New position.
        position: Position,
        /// New facing; `None` keeps the previous one.
        rotation: Option<Rotation>,
    },

    /// An entity played its melee gesture. Carries no target.
    AttackAnimation {
        /// Who swung.
        id: EntityId,
    },

    /// An entity lost health; the cause is not given.
    DamageNotification {
        /// Who was hurt.
        id: EntityId,
    },

    /// An entity's held item changed.
    EquipmentChanged {
        /// Holder.
        id: EntityId,
        /// Namespaced item identifier.
        item: String,
    },

    /// The local player attacked `target`.
    OutboundAttack {
        /// Who was struck.
        target: EntityId,
    },

    /// An entity despawned or disconnected.
    EntityLeft {
        /// Runtime id.
        id: EntityId,
    },
}

impl ProtocolEvent {
    /// Short label for logs.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SessionStart { .. } => "session_start",
            Self::EntitySighted { .. } => "entity_sighted",
            Self::EntityMoved { .. } => "entity_moved",
            Self::AttackAnimation { .. } => "attack_animation",
            Self::DamageNotification { .. } => "damage_notification",
            Self::EquipmentChanged { .. } => "equipment_changed",
            Self::OutboundAttack { .. } => "outbound_attack",
            Self::EntityLeft { .. } => "entity_left",
        }
    }

    /// The entity the event is about.
    #[must_use]
    pub fn subject(&self) -> EntityId {
        match self {
            Self::SessionStart { local, .. } => *local,
            Self::EntitySighted { id, .. }
            | Self::EntityMoved { id, .. }
            | Self::AttackAnimation { id }
            | Self::DamageNotification { id }
            | Self::EquipmentChanged { id, .. }
            | Self::EntityLeft { id } => *id,
            Self::OutboundAttack { target } => *target,
        }
    }
}
