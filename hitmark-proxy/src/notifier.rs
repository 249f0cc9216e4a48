//! Delivers hit reports to the client as text packets.
//!
//! The transcript channel becomes a `Raw` text packet (chat history) and
//! the overlay channel a `Tip` or `Popup`. Packets are handed to a
//! [`PacketSink`], the seam where the transport picks them up and sends
//! them toward the client.

use std::sync::Arc;

use hitmark_core::notify::{Channel, Notifier};
use hitmark_core::HitmarkError;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::trace;

use crate::config::{OverlayKind, ProxyConfig};
use crate::error::{ProxyError, Result};
use crate::packets::{TextKind, TextPacket};

/// Where outbound packets for the client are queued.
pub trait PacketSink: Send + Sync {
    /// Queue `packet` for the client. Must not block.
    ///
    /// # Errors
    /// Returns `ProxyError::Sink` if the packet cannot be queued.
    fn send_to_client(&self, packet: TextPacket) -> Result<()>;
}

/// Bounded mpsc queue feeding the client connection's writer task.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::Sender<TextPacket>,
}

impl ChannelSink {
    /// Create a sink and the receiver the writer task drains.
    #[must_use]
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<TextPacket>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }

    /// Create a sink sized by `proxy.outbound_queue`.
    #[must_use]
    pub fn from_config(config: &ProxyConfig) -> (Self, mpsc::Receiver<TextPacket>) {
        Self::new(config.proxy.outbound_queue)
    }
}

impl PacketSink for ChannelSink {
    fn send_to_client(&self, packet: TextPacket) -> Result<()> {
        self.tx.try_send(packet).map_err(|e| match e {
            TrySendError::Full(_) => ProxyError::Sink("client queue full".into()),
            TrySendError::Closed(_) => ProxyError::Sink("client connection closed".into()),
        })
    }
}

/// [`Notifier`] that turns hit reports into text packets.
pub struct TextPacketNotifier {
    sink: Arc<dyn PacketSink>,
    overlay: OverlayKind,
}

impl TextPacketNotifier {
    /// Create a notifier over `sink`.
    #[must_use]
    pub fn new(sink: Arc<dyn PacketSink>, overlay: OverlayKind) -> Self {
        Self { sink, overlay }
    }

    /// Text packet type used for `channel`.
    #[must_use]
    pub fn text_kind(&self, channel: Channel) -> TextKind {
        match channel {
            Channel::Transcript => TextKind::Raw,
            Channel::Overlay => self.overlay.text_kind(),
        }
    }
}

impl Notifier for TextPacketNotifier {
    fn send(&self, channel: Channel, text: &str) -> hitmark_core::Result<()> {
        let kind = self.text_kind(channel);
        trace!(%channel, ?kind, "Queueing hit report");
        self.sink
            .send_to_client(TextPacket::plain(kind, text))
            .map_err(|e| HitmarkError::Notify {
                channel,
                reason: e.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn transcript_is_raw_and_overlay_is_tip() {
        let (sink, mut rx) = ChannelSink::new(8);
        let notifier = TextPacketNotifier::new(Arc::new(sink), OverlayKind::Tip);

        notifier.send(Channel::Transcript, "hit").expect("queued");
        notifier.send(Channel::Overlay, "hit").expect("queued");

        let chat = rx.recv().await.expect("chat packet");
        assert_eq!(chat.kind, TextKind::Raw);
        assert_eq!(chat.message, "hit");
        assert!(!chat.needs_translation);
        assert!(chat.xuid.is_empty());

        let tip = rx.recv().await.expect("tip packet");
        assert_eq!(tip.kind, TextKind::Tip);
    }

    #[test]
    fn popup_overlay_is_configurable() {
        let (sink, _rx) = ChannelSink::new(1);
        let notifier = TextPacketNotifier::new(Arc::new(sink), OverlayKind::Popup);
        assert_eq!(notifier.text_kind(Channel::Overlay), TextKind::Popup);
        assert_eq!(notifier.text_kind(Channel::Transcript), TextKind::Raw);
    }

    #[test]
    fn full_queue_becomes_notify_error() {
        let (sink, _rx) = ChannelSink::new(1);
        let notifier = TextPacketNotifier::new(Arc::new(sink), OverlayKind::Tip);
        notifier.send(Channel::Transcript, "first").expect("queued");
        let err = notifier.send(Channel::Overlay, "second").expect_err("queue is full");
        assert!(matches!(
            err,
            HitmarkError::Notify {
                channel: Channel::Overlay,
                ..
            }
        ));
    }

    #[test]
    fn sink_capacity_follows_outbound_queue() {
        let mut config = ProxyConfig::default();
        config.proxy.outbound_queue = 3;
        let (sink, _rx) = ChannelSink::from_config(&config);
        assert_eq!(sink.tx.max_capacity(), 3);

        for n in 0..3 {
            sink.send_to_client(TextPacket::plain(TextKind::Raw, format!("hit {n}")))
                .expect("within capacity");
        }
        let err = sink
            .send_to_client(TextPacket::plain(TextKind::Raw, "overflow"))
            .expect_err("queue is full");
        assert!(err.to_string().contains("full"));
    }

    #[test]
    fn closed_receiver_is_reported() {
        let (sink, rx) = ChannelSink::new(4);
        drop(rx);
        let err = sink
            .send_to_client(TextPacket::plain(TextKind::Raw, "x"))
            .expect_err("closed");
        assert!(err.to_string().contains("closed"));
    }
}
