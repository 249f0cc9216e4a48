//! One intercepted client connection.
//!
//! A [`ProxySession`] owns an [`AttributionEngine`] and the bridge that
//! feeds it. The transport calls [`ProxySession::on_packet`] for every
//! decoded packet in either direction, from whichever task reads that side
//! of the connection, and [`ProxySession::close`] when the connection ends.

use std::sync::Arc;

use hitmark_core::engine::{AttributionEngine, AttributionOutcome};
use hitmark_core::metrics::StatsSnapshot;
use tokio::sync::mpsc;
use tracing::{debug, info, info_span, Span};
use uuid::Uuid;

use crate::bridge::PacketBridge;
use crate::config::ProxyConfig;
use crate::error::Result;
use crate::notifier::{ChannelSink, PacketSink, TextPacketNotifier};
use crate::packets::{BedrockPacket, Direction, TextPacket};

/// Attribution state bound to one client connection.
pub struct ProxySession {
    id: Uuid,
    bridge: PacketBridge,
    engine: AttributionEngine,
    span: Span,
}

impl ProxySession {
    /// Start a session for a client logged in as `display_name`.
    ///
    /// # Errors
    /// Returns an error if the engine configuration is invalid.
    pub fn new(
        display_name: impl Into<String>,
        config: &ProxyConfig,
        sink: Arc<dyn PacketSink>,
    ) -> Result<Self> {
        let notifier = Arc::new(TextPacketNotifier::new(sink, config.proxy.overlay_kind));
        let engine = AttributionEngine::new(config.engine_config(), notifier)?;
        Ok(Self::with_engine(display_name, engine))
    }

    /// Start a session whose reports go to a fresh bounded queue of
    /// `proxy.outbound_queue` packets; the client writer drains the receiver.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid.
    pub fn open(
        display_name: impl Into<String>,
        config: &ProxyConfig,
    ) -> Result<(Self, mpsc::Receiver<TextPacket>)> {
        config.validate()?;
        let (sink, rx) = ChannelSink::from_config(config);
        let session = Self::new(display_name, config, Arc::new(sink))?;
        Ok((session, rx))
    }

    /// Bind an already-built engine, e.g. one with a manual clock.
    #[must_use]
    pub fn with_engine(display_name: impl Into<String>, engine: AttributionEngine) -> Self {
        let id = Uuid::new_v4();
        let bridge = PacketBridge::new(display_name);
        let span = info_span!("session", id = %id, player = %bridge.local_username());
        span.in_scope(|| info!("Hit attribution session opened"));
        Self {
            id,
            bridge,
            engine,
            span,
        }
    }

    /// Session id, for correlating logs.
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Engine behind this session.
    #[must_use]
    pub fn engine(&self) -> &AttributionEngine {
        &self.engine
    }

    /// Inspect one decoded packet.
    ///
    /// Packets are only observed, never altered or dropped; the caller
    /// forwards them unchanged. Returns the outcome when the packet was a
    /// damage notification.
    pub fn on_packet(&self, direction: Direction, packet: &BedrockPacket) -> Option<AttributionOutcome> {
        let _entered = self.span.enter();
        let event = self.bridge.translate(direction, packet)?;
        debug!(packet = packet.name(), ?direction, event = event.kind(), "Packet observed");
        self.engine.handle(event)
    }

    /// End the session, cancelling pending rechecks.
    ///
    /// Returns the final counters.
    pub fn close(&self) -> StatsSnapshot {
        let _entered = self.span.enter();
        self.engine.shutdown();
        let stats = self.engine.stats();
        info!(
            damage_events = stats.damage_events,
            attributed = stats.attributed,
            reflected = stats.reflected,
            "Hit attribution session closed"
        );
        stats
    }
}

impl Drop for ProxySession {
    fn drop(&mut self) {
        if self.engine.pending_rechecks() > 0 {
            self.engine.shutdown();
        }
    }
}
