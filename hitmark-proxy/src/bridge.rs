//! Bridge module: maps decoded Bedrock packets to hitmark events.
//!
//! Bedrock has no "who hit me" packet, so the proxy listens to the pieces
//! that let the engine work it out:
//!
//! | packet                                   | direction  | event                |
//! |------------------------------------------|------------|----------------------|
//! | `StartGame`                              | downstream | `SessionStart`       |
//! | `AddPlayer`                              | downstream | `EntitySighted`      |
//! | `MovePlayer`                             | both       | `EntityMoved`        |
//! | `MoveEntityAbsolute`                     | downstream | `EntityMoved`        |
//! | `Animate` (`SwingArm`)                   | downstream | `AttackAnimation`    |
//! | `EntityEvent` (`Hurt`)                   | downstream | `DamageNotification` |
//! | `MobEquipment`                           | downstream | `EquipmentChanged`   |
//! | `RemoveEntity` (known unique id)         | downstream | `EntityLeft`         |
//! | `InventoryTransaction` (entity `Attack`) | upstream   | `OutboundAttack`     |
//! | `Interact` (`Damage`)                    | upstream   | `OutboundAttack`     |
//!
//! Everything else, and any packet seen in the wrong direction, maps to
//! nothing.
//!
//! `RemoveEntity` only carries the unique id while every other packet uses
//! the runtime id, so the bridge remembers the pairing from `StartGame` and
//! `AddPlayer`. A removal for a unique id it never paired is dropped.

use dashmap::DashMap;
use hitmark_core::events::ProtocolEvent;
use hitmark_core::types::{EntityId, Rotation};

use crate::packets::{
    AnimateAction, BedrockPacket, Direction, EntityEventKind, InteractAction, TransactionData,
    UseItemOnEntityAction,
};

/// Packet → event translator for one connection.
#[derive(Debug)]
pub struct PacketBridge {
    /// Name of the local player, from the login identity.
    local_username: String,
    /// Unique id → runtime id for every entity added this session.
    runtime_ids: DashMap<i64, u64>,
}

impl PacketBridge {
    /// Create a bridge for a client logged in as `local_username`.
    #[must_use]
    pub fn new(local_username: impl Into<String>) -> Self {
        Self {
            local_username: local_username.into(),
            runtime_ids: DashMap::new(),
        }
    }

    /// Runtime id paired with a unique id, if the entity was added.
    #[must_use]
    pub fn runtime_id(&self, unique_entity_id: i64) -> Option<u64> {
        self.runtime_ids.get(&unique_entity_id).map(|id| *id)
    }

    /// Local player's display name.
    #[must_use]
    pub fn local_username(&self) -> &str {
        &self.local_username
    }

    /// Translate one packet, or `None` if it carries nothing of interest.
    #[must_use]
    pub fn translate(&self, direction: Direction, packet: &BedrockPacket) -> Option<ProtocolEvent> {
        match direction {
            Direction::Downstream => self.downstream(packet),
            Direction::Upstream => upstream(packet),
        }
    }

    fn downstream(&self, packet: &BedrockPacket) -> Option<ProtocolEvent> {
        let event = match packet {
            BedrockPacket::StartGame {
                unique_entity_id,
                runtime_entity_id,
                player_position,
            } => {
                self.runtime_ids.insert(*unique_entity_id, *runtime_entity_id);
                ProtocolEvent::SessionStart {
                    local: EntityId(*runtime_entity_id),
                    username: self.local_username.clone(),
                    position: *player_position,
                }
            }
            BedrockPacket::AddPlayer {
                unique_entity_id,
                runtime_entity_id,
                username,
                position,
                rotation,
            } => {
                self.runtime_ids.insert(*unique_entity_id, *runtime_entity_id);
                ProtocolEvent::EntitySighted {
                    id: EntityId(*runtime_entity_id),
                    name: username.clone(),
                    position: *position,
                    rotation: Some(Rotation::from_vec3(*rotation)),
                }
            }
            BedrockPacket::MovePlayer {
                runtime_entity_id,
                position,
                rotation,
            }
            | BedrockPacket::MoveEntityAbsolute {
                runtime_entity_id,
                position,
                rotation,
            } => moved(*runtime_entity_id, *position, *rotation),
            BedrockPacket::Animate {
                runtime_entity_id,
                action: AnimateAction::SwingArm,
            } => ProtocolEvent::AttackAnimation {
                id: EntityId(*runtime_entity_id),
            },
            BedrockPacket::EntityEvent {
                runtime_entity_id,
                kind: EntityEventKind::Hurt,
                ..
            } => ProtocolEvent::DamageNotification {
                id: EntityId(*runtime_entity_id),
            },
            BedrockPacket::MobEquipment {
                runtime_entity_id,
                item: Some(item),
                ..
            } => ProtocolEvent::EquipmentChanged {
                id: EntityId(*runtime_entity_id),
                item: item.clone(),
            },
            BedrockPacket::RemoveEntity { unique_entity_id } => {
                let (_, runtime_id) = self.runtime_ids.remove(unique_entity_id)?;
                ProtocolEvent::EntityLeft {
                    id: EntityId(runtime_id),
                }
            }
            _ => return None,
        };
        Some(event)
    }
}

fn upstream(packet: &BedrockPacket) -> Option<ProtocolEvent> {
    match packet {
        // The client reports its own movement too; it is fresher than the echo.
        BedrockPacket::MovePlayer {
            runtime_entity_id,
            position,
            rotation,
        } => Some(moved(*runtime_entity_id, *position, *rotation)),
        BedrockPacket::InventoryTransaction {
            data:
                TransactionData::UseItemOnEntity {
                    runtime_entity_id,
                    action: UseItemOnEntityAction::Attack,
                },
        }
        | BedrockPacket::Interact {
            runtime_entity_id,
            action: InteractAction::Damage,
        } => Some(ProtocolEvent::OutboundAttack {
            target: EntityId(*runtime_entity_id),
        }),
        _ => None,
    }
}

fn moved(runtime_entity_id: u64, position: glam::Vec3, rotation: glam::Vec3) -> ProtocolEvent {
    ProtocolEvent::EntityMoved {
        id: EntityId(runtime_entity_id),
        position,
        rotation: Some(Rotation::from_vec3(rotation)),
    }
}
