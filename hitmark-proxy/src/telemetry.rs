//! Tracing subscriber setup for the proxy process.
//!
//! `RUST_LOG` wins when set; otherwise `general.log_level` from the config
//! file is used as the filter.

use tracing_subscriber::EnvFilter;

use crate::config::{LogFormat, ProxyConfig};
use crate::error::{ProxyError, Result};

/// Build the log filter for `config`.
///
/// # Errors
/// Returns `ProxyError::Telemetry` if the configured level is not a valid
/// filter directive.
pub fn env_filter(config: &ProxyConfig) -> Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(&config.core.general.log_level)
            .map_err(|e| ProxyError::Telemetry(e.to_string())),
    }
}

/// Install the global tracing subscriber.
///
/// # Errors
/// Returns `ProxyError::Telemetry` if the filter is invalid or a subscriber
/// is already installed.
pub fn init_tracing(config: &ProxyConfig) -> Result<()> {
    let filter = env_filter(config)?;
    let installed = match config.proxy.log_format {
        LogFormat::Pretty => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .try_init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_current_span(true)
            .try_init(),
    };
    installed.map_err(|e| ProxyError::Telemetry(e.to_string()))
}
