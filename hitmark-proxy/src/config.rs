//! Proxy configuration for hitmark.
//!
//! One TOML file configures both layers: the engine sections (`[general]`,
//! `[scoring]`, `[reflect]`, ...) sit at the top level exactly as in
//! `hitmark_core::config`, and proxy-only settings live under `[proxy]`.

use hitmark_core::config::HitmarkConfig;
use serde::{Deserialize, Serialize};

use crate::error::{ProxyError, Result};
use crate::packets::TextKind;

/// Full configuration for a proxied session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProxyConfig {
    /// Engine configuration.
    #[serde(flatten)]
    pub core: HitmarkConfig,
    /// Proxy-only settings.
    #[serde(default)]
    pub proxy: ProxySettings,
}

impl ProxyConfig {
    /// Parse and validate a TOML string.
    ///
    /// # Errors
    /// Returns `ProxyError::Config` for malformed TOML or an invalid proxy
    /// section, `ProxyError::Core` if the engine sections fail validation.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: Self = toml::from_str(toml_str).map_err(|e| ProxyError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ProxyError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml(&content)
    }

    /// Check both layers.
    ///
    /// # Errors
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<()> {
        self.core.validate()?;
        if self.proxy.outbound_queue == 0 {
            return Err(ProxyError::Config(
                "proxy.outbound_queue must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Engine configuration with the proxy's notification switch applied.
    #[must_use]
    pub fn engine_config(&self) -> HitmarkConfig {
        let mut core = self.core.clone();
        if !self.proxy.notifications {
            core.notify.transcript = false;
            core.notify.overlay = false;
        }
        core
    }
}

/// Settings that only make sense inside the proxy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxySettings {
    /// Send hit reports to the client at all.
    #[serde(default = "default_true")]
    pub notifications: bool,
    /// Text packet type used for the overlay channel.
    #[serde(default)]
    pub overlay_kind: OverlayKind,
    /// Log output format.
    #[serde(default)]
    pub log_format: LogFormat,
    /// Capacity of the queue of text packets headed to the client.
    #[serde(default = "default_outbound_queue")]
    pub outbound_queue: usize,
}

impl Default for ProxySettings {
    fn default() -> Self {
        Self {
            notifications: true,
            overlay_kind: OverlayKind::default(),
            log_format: LogFormat::default(),
            outbound_queue: 64,
        }
    }
}

/// How the overlay channel is shown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlayKind {
    /// Small text above the hotbar.
    #[default]
    Tip,
    /// Popup line above the hotbar.
    Popup,
}

impl OverlayKind {
    /// Text packet type for this overlay.
    #[must_use]
    pub fn text_kind(self) -> TextKind {
        match self {
            Self::Tip => TextKind::Tip,
            Self::Popup => TextKind::Popup,
        }
    }
}

/// Log line format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

fn default_true() -> bool { true }
fn default_outbound_queue() -> usize { 64 }
