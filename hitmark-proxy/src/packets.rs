//! Decoded Bedrock packet shapes the proxy cares about.
//!
//! The binary codec lives outside this crate. It decodes each frame and
//! hands over one of these values; everything else is passed through as
//! [`BedrockPacket::Other`]. Field names follow the protocol's own naming.

use glam::Vec3;

/// Which way a packet is travelling through the proxy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Server → client.
    Downstream,
    /// Client → server.
    Upstream,
}

/// `AnimatePacket` action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimateAction {
    /// No animation.
    NoAction,
    /// Melee swing; the only action that counts as an attack.
    SwingArm,
    /// Leaving a bed.
    WakeUp,
    /// Critical hit particles.
    CriticalHit,
    /// Enchanted critical hit particles.
    MagicCriticalHit,
    /// Rowing, right paddle.
    RowRight,
    /// Rowing, left paddle.
    RowLeft,
}

impl AnimateAction {
    /// Decode the protocol action id.
    #[must_use]
    pub fn from_id(id: i32) -> Option<Self> {
        Some(match id {
            0 => Self::NoAction,
            1 => Self::SwingArm,
            3 => Self::WakeUp,
            4 => Self::CriticalHit,
            5 => Self::MagicCriticalHit,
            128 => Self::RowRight,
            129 => Self::RowLeft,
            _ => return None,
        })
    }
}

/// `EntityEventPacket` type, reduced to what matters here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityEventKind {
    /// Health went down.
    Hurt,
    /// Entity died.
    Death,
    /// Any other event id.
    Other(u8),
}

impl EntityEventKind {
    /// Decode the protocol event id.
    #[must_use]
    pub fn from_id(id: u8) -> Self {
        match id {
            2 => Self::Hurt,
            3 => Self::Death,
            other => Self::Other(other),
        }
    }
}

/// `InteractPacket` action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractAction {
    /// Right-click style interaction.
    Interact,
    /// Legacy melee attack.
    Damage,
    /// Dismount.
    LeaveVehicle,
    /// Crosshair moved over an entity.
    Mouseover,
    /// Inventory screen opened.
    OpenInventory,
    /// Any other action id.
    Other(u8),
}

impl InteractAction {
    /// Decode the protocol action id.
    #[must_use]
    pub fn from_id(id: u8) -> Self {
        match id {
            1 => Self::Interact,
            2 => Self::Damage,
            3 => Self::LeaveVehicle,
            4 => Self::Mouseover,
            6 => Self::OpenInventory,
            other => Self::Other(other),
        }
    }
}

/// Action of a `UseItemOnEntity` inventory transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UseItemOnEntityAction {
    /// Right click.
    Interact,
    /// Left click: a melee attack.
    Attack,
    /// Item-specific interaction.
    ItemInteract,
}

/// Payload of an `InventoryTransactionPacket`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionData {
    /// Ordinary inventory move.
    Normal,
    /// Client/server inventory mismatch.
    Mismatch,
    /// Item used on a block or in the air.
    UseItem,
    /// Item used on an entity.
    UseItemOnEntity {
        /// Entity the item was used on.
        runtime_entity_id: u64,
        /// What kind of use.
        action: UseItemOnEntityAction,
    },
    /// Held use released (bow, trident).
    ReleaseItem,
}

/// `TextPacket` type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextKind {
    /// Untranslated text shown in chat.
    Raw,
    /// Player chat with a source name.
    Chat,
    /// Translation key with parameters.
    Translation,
    /// Line above the hotbar.
    Popup,
    /// Jukebox "now playing" line.
    JukeboxPopup,
    /// Short tip above the hotbar.
    Tip,
    /// System message.
    System,
    /// Private message.
    Whisper,
    /// Server announcement.
    Announcement,
}

impl TextKind {
    /// Protocol type id.
    #[must_use]
    pub fn id(self) -> u8 {
        match self {
            Self::Raw => 0,
            Self::Chat => 1,
            Self::Translation => 2,
            Self::Popup => 3,
            Self::JukeboxPopup => 4,
            Self::Tip => 5,
            Self::System => 6,
            Self::Whisper => 7,
            Self::Announcement => 8,
        }
    }
}

/// Outbound `TextPacket`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextPacket {
    /// Where the client shows it.
    pub kind: TextKind,
    /// Whether `message` is a translation key.
    pub needs_translation: bool,
    /// Sender name for chat-like kinds.
    pub source_name: String,
    /// Message body.
    pub message: String,
    /// Translation parameters.
    pub parameters: Vec<String>,
    /// Sender XUID.
    pub xuid: String,
    /// Sender platform chat id.
    pub platform_chat_id: String,
}

impl TextPacket {
    /// Untranslated text of the given kind, with no sender.
    #[must_use]
    pub fn plain(kind: TextKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            needs_translation: false,
            source_name: String::new(),
            message: message.into(),
            parameters: Vec::new(),
            xuid: String::new(),
            platform_chat_id: String::new(),
        }
    }
}

/// A decoded packet.
#[derive(Debug, Clone, PartialEq)]
pub enum BedrockPacket {
    /// World join; identifies the local player.
    StartGame {
        /// Local player's unique id.
        unique_entity_id: i64,
        /// Local player's runtime id.
        runtime_entity_id: u64,
        /// Spawn position.
        player_position: Vec3,
    },
    /// Another player became visible.
    AddPlayer {
        /// Unique id; the only id `RemoveEntity` carries.
        unique_entity_id: i64,
        /// Runtime id.
        runtime_entity_id: u64,
        /// Display name.
        username: String,
        /// Position.
        position: Vec3,
        /// `(pitch, yaw, head_yaw)`.
        rotation: Vec3,
    },
    /// Player movement.
    MovePlayer {
        /// Runtime id.
        runtime_entity_id: u64,
        /// Position.
        position: Vec3,
        /// `(pitch, yaw, head_yaw)`.
        rotation: Vec3,
    },
    /// Non-player entity movement.
    MoveEntityAbsolute {
        /// Runtime id.
        runtime_entity_id: u64,
        /// Position.
        position: Vec3,
        /// `(pitch, yaw, head_yaw)`.
        rotation: Vec3,
    },
    /// Animation played by an entity.
    Animate {
        /// Runtime id.
        runtime_entity_id: u64,
        /// Which animation.
        action: AnimateAction,
    },
    /// Entity status event.
    EntityEvent {
        /// Runtime id.
        runtime_entity_id: u64,
        /// Event type.
        kind: EntityEventKind,
        /// Event-specific payload.
        data: i32,
    },
    /// Held item changed.
    MobEquipment {
        /// Runtime id.
        runtime_entity_id: u64,
        /// Resolved item identifier; `None` if the codec had no definition.
        item: Option<String>,
        /// Hotbar slot.
        hotbar_slot: u8,
    },
    /// Entity despawned.
    RemoveEntity {
        /// Unique entity id, not the runtime id.
        unique_entity_id: i64,
    },
    /// Inventory transaction.
    InventoryTransaction {
        /// Transaction payload.
        data: TransactionData,
    },
    /// Legacy entity interaction.
    Interact {
        /// Target runtime id.
        runtime_entity_id: u64,
        /// Interaction kind.
        action: InteractAction,
    },
    /// Text message.
    Text(TextPacket),
    /// Anything the proxy does not inspect.
    Other {
        /// Protocol packet id.
        id: u32,
    },
}

impl BedrockPacket {
    /// Protocol name, for logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::StartGame { .. } => "StartGame",
            Self::AddPlayer { .. } => "AddPlayer",
            Self::MovePlayer { .. } => "MovePlayer",
            Self::MoveEntityAbsolute { .. } => "MoveEntityAbsolute",
            Self::Animate { .. } => "Animate",
            Self::EntityEvent { .. } => "EntityEvent",
            Self::MobEquipment { .. } => "MobEquipment",
            Self::RemoveEntity { .. } => "RemoveEntity",
            Self::InventoryTransaction { .. } => "InventoryTransaction",
            Self::Interact { .. } => "Interact",
            Self::Text(_) => "Text",
            Self::Other { .. } => "Other",
        }
    }
}
