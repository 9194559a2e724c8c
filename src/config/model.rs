//! Serde data structures for the passthru configuration.
//!
//! [`ConfigLayer`] is one partially-filled source of settings (a config
//! file, or the CLI flags and their environment variables). Layers are
//! stacked with [`ConfigLayer::or`] and finalized into [`Settings`], the
//! immutable value the server holds for its whole lifetime.

use serde::{Deserialize, Serialize};

use crate::proxy::cookies::CookieMode;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3003;
pub const DEFAULT_UPSTREAM: &str = "https://noma.rent";
pub const DEFAULT_MAX_BODY: usize = 1_048_576;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigLayer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upstream: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cookie_mode: Option<CookieMode>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_body: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

impl ConfigLayer {
    /// Fill every unset field of `self` from `lower`.
    #[must_use]
    pub fn or(self, lower: Self) -> Self {
        Self {
            host: self.host.or(lower.host),
            port: self.port.or(lower.port),
            upstream: self.upstream.or(lower.upstream),
            cookie_mode: self.cookie_mode.or(lower.cookie_mode),
            max_body: self.max_body.or(lower.max_body),
            timeout_ms: self.timeout_ms.or(lower.timeout_ms),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    /// Base URL every proxied path is appended to, verbatim.
    pub upstream: String,
    pub cookie_mode: CookieMode,
    pub max_body: usize,
    pub timeout_ms: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self::from(ConfigLayer::default())
    }
}

impl From<ConfigLayer> for Settings {
    fn from(layer: ConfigLayer) -> Self {
        Self {
            host: layer.host.unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: layer.port.unwrap_or(DEFAULT_PORT),
            upstream: layer
                .upstream
                .unwrap_or_else(|| DEFAULT_UPSTREAM.to_string()),
            cookie_mode: layer.cookie_mode.unwrap_or_default(),
            max_body: layer.max_body.unwrap_or(DEFAULT_MAX_BODY),
            timeout_ms: layer.timeout_ms,
        }
    }
}

impl Settings {
    #[must_use]
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
