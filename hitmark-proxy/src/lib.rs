//! # hitmark-proxy: Bedrock Integration for hitmark
//!
//! This crate binds the game-agnostic `hitmark-core` engine to a Bedrock
//! edition proxy. The transport and packet codec are external; they hand
//! this crate decoded packets and take back text packets for the client.
//!
//! ## Architecture
//!
//! ```text
//!  server ──downstream──┐                 ┌──upstream── client
//!                       ▼                 ▼
//!              ┌─────────────────────────────────┐
//!              │          ProxySession           │
//!              │  PacketBridge → ProtocolEvent   │
//!              │        AttributionEngine        │
//!              │  TextPacketNotifier → PacketSink│
//!              └────────────────┬────────────────┘
//!                               ▼
//!                    Raw / Tip text to client
//! ```
//!
//! ## Modules
//!
//! - `packets`: decoded packet shapes and direction
//! - `bridge`: packet → event mapping
//! - `session`: per-connection binding
//! - `notifier`: text packet delivery
//! - `config`: `[proxy]` settings on top of the engine config
//! - `telemetry`: tracing subscriber setup

#![deny(clippy::unwrap_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod bridge;
pub mod config;
pub mod error;
pub mod notifier;
pub mod packets;
pub mod session;
pub mod telemetry;

pub use bridge::PacketBridge;
pub use config::ProxyConfig;
pub use error::ProxyError;
pub use notifier::{ChannelSink, PacketSink, TextPacketNotifier};
pub use session::ProxySession;
