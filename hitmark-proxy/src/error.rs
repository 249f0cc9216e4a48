//! Proxy error types.

use hitmark_core::HitmarkError;
use thiserror::Error;

/// Errors raised by the proxy integration.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// A packet could not be queued toward the client.
    #[error("Packet sink rejected packet: {0}")]
    Sink(String),

    /// Proxy configuration is invalid.
    #[error("Proxy configuration error: {0}")]
    Config(String),

    /// Error from the attribution engine.
    #[error(transparent)]
    Core(#[from] HitmarkError),

    /// The tracing subscriber could not be installed.
    #[error("Telemetry setup failed: {0}")]
    Telemetry(String),
}

/// Convenience Result type alias.
pub type Result<T> = std::result::Result<T, ProxyError>;
