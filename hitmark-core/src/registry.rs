//! Entity State Registry: "who is where, facing which way, holding what".
//!
//! One [`EntityRecord`] per entity the session has sighted. Records are
//! overwritten in place by movement and equipment events and read by the
//! scorer. The map is sharded, so updates to unrelated entities never
//! contend; updates to one entity are serialised on its shard.
//!
//! References to ids that were never sighted are tolerated: the protocol
//! routinely moves entities the proxy has not been told about yet. Equipment
//! is the exception: it is held until the entity is sighted, since servers
//! may send it first.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::debug;

use crate::types::{EntityId, Position, Rotation};

/// Username reported for entities the registry has never seen.
pub const UNKNOWN_USERNAME: &str = "Unknown";

/// Most weapons held for entities not sighted yet.
pub const MAX_PENDING_WEAPONS: usize = 256;

/// Last-known state of one entity.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityRecord {
    /// Runtime id of the entity.
    pub id: EntityId,
    /// Display name at sighting time.
    pub username: String,
    /// Last known position.
    pub position: Position,
    /// Last known rotation, if any update carried one.
    pub rotation: Option<Rotation>,
    /// Identifier of the item last seen in hand.
    pub weapon: Option<String>,
}

/// Concurrent map of entity id → [`EntityRecord`].
#[derive(Debug, Default)]
pub struct EntityRegistry {
    entities: DashMap<EntityId, EntityRecord>,
    /// Equipment seen before its entity. Lock order: `entities` shard first.
    pending_weapons: DashMap<EntityId, String>,
}

impl EntityRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create or overwrite an entity.
    ///
    /// An omitted rotation keeps the previous one; an existing weapon label
    /// always survives re-sighting. A new entity picks up any weapon that
    /// arrived before it.
    pub fn upsert(
        &self,
        id: EntityId,
        username: impl Into<String>,
        position: Position,
        rotation: Option<Rotation>,
    ) {
        let username = username.into();
        debug!(entity = %id, %username, ?position, ?rotation, "Entity tracked");
        self.entities
            .entry(id)
            .and_modify(|record| {
                record.username.clone_from(&username);
                record.position = position;
                if rotation.is_some() {
                    record.rotation = rotation;
                }
            })
            .or_insert_with(|| EntityRecord {
                id,
                username: username.clone(),
                position,
                rotation,
                weapon: self.pending_weapons.remove(&id).map(|(_, item)| item),
            });
    }

    /// Move a known entity. Returns `false` if the id is unknown.
    pub fn update_position(&self, id: EntityId, position: Position) -> bool {
        match self.entities.get_mut(&id) {
            Some(mut record) => {
                record.position = position;
                true
            }
            None => false,
        }
    }

    /// Move and turn a known entity. Returns `false` if the id is unknown.
    pub fn update_position_and_rotation(
        &self,
        id: EntityId,
        position: Position,
        rotation: Rotation,
    ) -> bool {
        match self.entities.get_mut(&id) {
            Some(mut record) => {
                record.position = position;
                record.rotation = Some(rotation);
                true
            }
            None => false,
        }
    }

    /// Record the item an entity is holding.
    ///
    /// Returns `false` if the entity is not tracked yet; the item is then
    /// held for it, up to [`MAX_PENDING_WEAPONS`] entities.
    pub fn set_weapon(&self, id: EntityId, item: impl Into<String>) -> bool {
        let item = item.into();
        match self.entities.entry(id) {
            Entry::Occupied(mut record) => {
                debug!(entity = %id, weapon = %item, "Weapon updated");
                record.get_mut().weapon = Some(item);
                true
            }
            Entry::Vacant(_) => {
                if self.pending_weapons.len() < MAX_PENDING_WEAPONS
                    || self.pending_weapons.contains_key(&id)
                {
                    self.pending_weapons.insert(id, item);
                } else {
                    debug!(entity = %id, "Pending weapon table full, item dropped");
                }
                false
            }
        }
    }

    /// Item held for an entity that has not been sighted yet.
    #[must_use]
    pub fn pending_weapon(&self, id: EntityId) -> Option<String> {
        self.pending_weapons.get(&id).map(|item| item.clone())
    }

    /// Deregister an entity, returning its last record.
    ///
    /// Swing history and self-attack entries are cleaned up by the engine,
    /// which owns those stores alongside this one.
    pub fn remove(&self, id: EntityId) -> Option<EntityRecord> {
        self.pending_weapons.remove(&id);
        self.entities.remove(&id).map(|(_, record)| record)
    }

    /// Snapshot of one entity.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<EntityRecord> {
        self.entities.get(&id).map(|record| record.clone())
    }

    /// Last known position of an entity.
    #[must_use]
    pub fn position(&self, id: EntityId) -> Option<Position> {
        self.entities.get(&id).map(|record| record.position)
    }

    /// Last known rotation of an entity.
    #[must_use]
    pub fn rotation(&self, id: EntityId) -> Option<Rotation> {
        self.entities.get(&id).and_then(|record| record.rotation)
    }

    /// Position and rotation read under one shard lock.
    #[must_use]
    pub fn pose(&self, id: EntityId) -> Option<(Position, Option<Rotation>)> {
        self.entities
            .get(&id)
            .map(|record| (record.position, record.rotation))
    }

    /// Display name of an entity, or [`UNKNOWN_USERNAME`].
    #[must_use]
    pub fn username(&self, id: EntityId) -> String {
        self.entities
            .get(&id)
            .map_or_else(|| UNKNOWN_USERNAME.to_string(), |record| record.username.clone())
    }

    /// Item identifier an entity was last seen holding.
    #[must_use]
    pub fn weapon(&self, id: EntityId) -> Option<String> {
        self.entities.get(&id).and_then(|record| record.weapon.clone())
    }

    /// Whether the id is registered.
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    /// Number of tracked entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether no entity is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}
