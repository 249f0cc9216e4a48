//! # Hitmark Core Library
//!
//! Game-agnostic combat attribution: works out which remote entity hurt the
//! local player when the protocol only says "you took damage".
//!
//! The engine watches a stream of [`ProtocolEvent`]s and keeps three stores:
//!
//! - **Entity registry**: last known name, position, rotation and held item
//! - **Swing history**: a bounded log of attack animations per entity
//! - **Self-attack ledger**: who the local player struck, and when
//!
//! On a damage notification the scorer ranks every recent swing by timing,
//! horizontal reach and aim, and the best one is reported through a
//! [`Notifier`]. If nothing matches, one deferred recheck covers packets
//! that arrived out of order.
//!
//! ## Performance Contract
//!
//! All operations are meant to run inline on a live connection:
//! - State update (move, swing, equipment): < 5μs
//! - Attribution over 50 entities × 20 swings: < 100μs

#![deny(clippy::unwrap_used)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod attribution;
pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod ledger;
pub mod metrics;
pub mod notify;
pub mod recheck;
pub mod registry;
pub mod swing;
pub mod types;

pub use attribution::{AttackerCandidate, Attributor};
pub use clock::{Clock, ManualClock, MonotonicClock};
pub use config::HitmarkConfig;
pub use engine::{AttributionEngine, AttributionOutcome};
pub use error::{HitmarkError, Result};
pub use events::ProtocolEvent;
pub use notify::{Channel, MemoryNotifier, NotificationEmitter, Notifier};
pub use types::*;
