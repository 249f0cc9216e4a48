//! End-to-end: decoded packets in, text packets out.

use std::time::Duration;

use glam::Vec3;
use hitmark_core::engine::AttributionOutcome;
use hitmark_core::EntityId;
use hitmark_proxy::config::OverlayKind;
use hitmark_proxy::packets::{
    AnimateAction, BedrockPacket, Direction, EntityEventKind, TextKind, TextPacket,
    TransactionData, UseItemOnEntityAction,
};
use hitmark_proxy::{ProxyConfig, ProxySession};
use tokio::sync::mpsc::Receiver;

const LOCAL: u64 = 100;
const LOCAL_UNIQUE: i64 = -4_294_967_196;

/// Unique ids in BDS are unrelated to runtime ids; keep them apart here too.
fn unique_of(runtime: u64) -> i64 {
    -12_884_901_888 - i64::try_from(runtime).expect("small test id")
}

fn open(config: &ProxyConfig) -> (ProxySession, Receiver<TextPacket>) {
    let (session, rx) = ProxySession::open("Steve", config).expect("session opens");
    session.on_packet(
        Direction::Downstream,
        &BedrockPacket::StartGame {
            unique_entity_id: LOCAL_UNIQUE,
            runtime_entity_id: LOCAL,
            player_position: Vec3::new(0.0, 64.0, 0.0),
        },
    );
    (session, rx)
}

fn add_player(session: &ProxySession, id: u64, name: &str, position: Vec3, yaw: f32) {
    session.on_packet(
        Direction::Downstream,
        &BedrockPacket::AddPlayer {
            unique_entity_id: unique_of(id),
            runtime_entity_id: id,
            username: name.into(),
            position,
            rotation: Vec3::new(0.0, yaw, yaw),
        },
    );
}

fn swing(session: &ProxySession, id: u64) {
    session.on_packet(
        Direction::Downstream,
        &BedrockPacket::Animate {
            runtime_entity_id: id,
            action: AnimateAction::SwingArm,
        },
    );
}

fn hurt(session: &ProxySession) -> Option<AttributionOutcome> {
    session.on_packet(
        Direction::Downstream,
        &BedrockPacket::EntityEvent {
            runtime_entity_id: LOCAL,
            kind: EntityEventKind::Hurt,
            data: 0,
        },
    )
}

#[tokio::test(start_paused = true)]
async fn hit_is_reported_in_chat_and_tip() {
    let (session, mut rx) = open(&ProxyConfig::default());
    // Yaw 90 faces -X: looking from +X straight at the local player.
    add_player(&session, 7, "Alex", Vec3::new(3.0, 64.0, 0.0), 90.0);
    session.on_packet(
        Direction::Downstream,
        &BedrockPacket::MobEquipment {
            runtime_entity_id: 7,
            item: Some("minecraft:diamond_sword".into()),
            hotbar_slot: 0,
        },
    );
    swing(&session, 7);
    tokio::time::sleep(Duration::from_millis(100)).await;

    let outcome = hurt(&session).expect("damage outcome");
    assert_eq!(outcome.candidate().map(|c| c.attacker), Some(EntityId(7)));

    let chat = rx.recv().await.expect("chat packet");
    assert_eq!(chat.kind, TextKind::Raw);
    assert_eq!(
        chat.message,
        "§c[HIT] §fAlex§7 hit you from §e3.00§7 blocks §8[§ediamond sword§8] §8[§60.0°§8]"
    );
    let tip = rx.recv().await.expect("tip packet");
    assert_eq!(tip.kind, TextKind::Tip);
    assert_eq!(tip.message, chat.message);

    let stats = session.close();
    assert_eq!(stats.attributed, 1);
}

#[tokio::test(start_paused = true)]
async fn thorns_after_our_attack_stays_silent() {
    let (session, mut rx) = open(&ProxyConfig::default());
    add_player(&session, 8, "Thorny", Vec3::new(0.0, 64.0, 2.0), 180.0);
    swing(&session, 8);
    session.on_packet(
        Direction::Upstream,
        &BedrockPacket::InventoryTransaction {
            data: TransactionData::UseItemOnEntity {
                runtime_entity_id: 8,
                action: UseItemOnEntityAction::Attack,
            },
        },
    );
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(
        hurt(&session),
        Some(AttributionOutcome::Reflected { attacker: EntityId(8) })
    );
    assert!(rx.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn late_swing_is_reported_after_recheck() {
    let mut config = ProxyConfig::default();
    config.proxy.overlay_kind = OverlayKind::Popup;
    let (session, mut rx) = open(&config);
    add_player(&session, 9, "Laggy", Vec3::new(-2.0, 64.0, 0.0), -90.0);

    assert_eq!(hurt(&session), Some(AttributionOutcome::Pending));
    tokio::time::sleep(Duration::from_millis(120)).await;
    swing(&session, 9);

    let chat = tokio::time::timeout(Duration::from_secs(1), rx.recv())
        .await
        .expect("report within a second")
        .expect("chat packet");
    assert!(chat.message.contains("Laggy"));
    let popup = rx.recv().await.expect("popup packet");
    assert_eq!(popup.kind, TextKind::Popup);
}

#[tokio::test(start_paused = true)]
async fn hurt_for_other_entities_is_ignored() {
    let (session, _rx) = open(&ProxyConfig::default());
    let outcome = session.on_packet(
        Direction::Downstream,
        &BedrockPacket::EntityEvent {
            runtime_entity_id: 55,
            kind: EntityEventKind::Hurt,
            data: 0,
        },
    );
    assert_eq!(outcome, Some(AttributionOutcome::Ignored));
}

#[tokio::test(start_paused = true)]
async fn disabled_notifications_still_attribute() {
    let mut config = ProxyConfig::default();
    config.proxy.notifications = false;
    let (session, mut rx) = open(&config);
    add_player(&session, 7, "Alex", Vec3::new(1.0, 64.0, 0.0), 90.0);
    swing(&session, 7);
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert!(hurt(&session).is_some_and(|o| o.is_reported()));
    assert!(rx.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn close_cancels_pending_recheck() {
    let (session, mut rx) = open(&ProxyConfig::default());
    assert_eq!(hurt(&session), Some(AttributionOutcome::Pending));
    assert_eq!(session.engine().pending_rechecks(), 1);

    session.close();
    add_player(&session, 9, "Late", Vec3::new(1.0, 64.0, 0.0), 90.0);
    swing(&session, 9);
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert!(rx.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn departed_player_is_forgotten_by_unique_id() {
    let (session, _rx) = open(&ProxyConfig::default());
    add_player(&session, 7, "Alex", Vec3::new(1.0, 64.0, 0.0), 90.0);
    swing(&session, 7);
    assert_eq!(session.engine().history().recent_swings(EntityId(7)).len(), 1);

    session.on_packet(
        Direction::Downstream,
        &BedrockPacket::RemoveEntity {
            unique_entity_id: unique_of(7),
        },
    );
    assert!(!session.engine().registry().contains(EntityId(7)));
    assert!(session.engine().history().recent_swings(EntityId(7)).is_empty());
}

#[tokio::test(start_paused = true)]
async fn unpaired_removal_leaves_local_player_alone() {
    let (session, _rx) = open(&ProxyConfig::default());
    // Equal to the local runtime id, but no entity was added with it.
    session.on_packet(
        Direction::Downstream,
        &BedrockPacket::RemoveEntity {
            unique_entity_id: i64::try_from(LOCAL).expect("small test id"),
        },
    );
    assert!(session.engine().registry().contains(EntityId(LOCAL)));
    assert_eq!(hurt(&session), Some(AttributionOutcome::Pending));
}

#[tokio::test(start_paused = true)]
async fn open_sizes_queue_from_config() {
    let mut config = ProxyConfig::default();
    config.proxy.outbound_queue = 1;
    let (session, mut rx) = open(&config);
    add_player(&session, 7, "Alex", Vec3::new(1.0, 64.0, 0.0), 90.0);
    swing(&session, 7);
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert!(hurt(&session).is_some_and(|o| o.is_reported()));
    // Chat fits; the overlay copy overflows the one-slot queue.
    assert!(rx.try_recv().is_ok());
    assert!(rx.try_recv().is_err());
    assert_eq!(session.engine().stats().notify_failures, 1);
}

#[test]
fn open_rejects_zero_queue() {
    let mut config = ProxyConfig::default();
    config.proxy.outbound_queue = 0;
    assert!(ProxySession::open("Steve", &config).is_err());
}

#[tokio::test(start_paused = true)]
async fn equipment_before_sighting_still_tags_report() {
    let (session, mut rx) = open(&ProxyConfig::default());
    session.on_packet(
        Direction::Downstream,
        &BedrockPacket::MobEquipment {
            runtime_entity_id: 7,
            item: Some("minecraft:iron_axe".into()),
            hotbar_slot: 0,
        },
    );
    add_player(&session, 7, "Alex", Vec3::new(2.0, 64.0, 0.0), 90.0);
    swing(&session, 7);
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert!(hurt(&session).is_some_and(|o| o.is_reported()));
    let chat = rx.recv().await.expect("chat packet");
    assert!(chat.message.contains("§8[§eiron axe§8]"), "{}", chat.message);
}
