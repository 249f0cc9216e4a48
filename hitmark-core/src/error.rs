//! Error types for the hitmark core library.
//!
//! Almost nothing in attribution is exceptional: unknown entities, missing
//! positions and unattributable damage are ordinary outcomes and are
//! reported through [`AttributionOutcome`](crate::engine::AttributionOutcome).
//! The variants here cover the few places where a caller actually has to
//! react: bad configuration, a failed outbound send or a timer that could
//! not be armed.

use thiserror::Error;

use crate::notify::Channel;

/// Top-level error type for all hitmark operations.
#[derive(Error, Debug)]
pub enum HitmarkError {
    /// Configuration could not be parsed or failed validation.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The outbound collaborator refused a notification.
    #[error("Notification on {channel} channel failed: {reason}")]
    Notify {
        /// Which channel the send was attempted on.
        channel: Channel,
        /// Collaborator-supplied failure description.
        reason: String,
    },

    /// A recheck was requested after the scheduler was shut down.
    #[error("Recheck scheduler has been shut down")]
    SchedulerShutdown,

    /// A recheck was requested outside of an async runtime.
    #[error("No async runtime available to arm the recheck timer")]
    NoRuntime,

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type alias.
pub type Result<T> = std::result::Result<T, HitmarkError>;
