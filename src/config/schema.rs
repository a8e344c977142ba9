//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::prerender::defaults;

/// Root configuration for the prerender proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Origin application server receiving pass-through traffic.
    pub origin: OriginConfig,

    /// Crawler detection and rendering service settings.
    pub prerender: PrerenderConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Origin server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OriginConfig {
    /// Origin address (e.g., "127.0.0.1:3000").
    pub address: String,
}

impl Default for OriginConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1:3000".to_string(),
        }
    }
}

/// Outbound calling convention of the rendering service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RequestStyle {
    /// `POST <endpoint>` with a JSON payload naming the page to render.
    #[default]
    Post,
    /// `GET <endpoint>/<render url>`, the older prerender convention.
    LegacyGet,
}

/// Basic auth credentials for the rendering service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Credentials {
    pub username: String,
    #[serde(default)]
    pub password: Option<String>,
}

/// Crawler detection and relay settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PrerenderConfig {
    /// Base URL of the rendering service.
    pub endpoint: String,

    /// Optional basic auth for the rendering service.
    pub credentials: Option<Credentials>,

    /// Substrings of the request URL that mark a static asset.
    pub ignored_extensions: Vec<String>,

    /// Case-insensitive user-agent substrings identifying crawlers.
    pub crawler_user_agents: Vec<String>,

    /// Upstream status codes relayed as redirects when a Location is present.
    pub redirect_status_codes: Vec<u16>,

    /// Ask the rendering service for a full-page render.
    pub fullpage: bool,

    /// Output kind requested from the rendering service.
    pub render_type: String,

    /// Overrides the scheme of the reconstructed page URL.
    pub protocol: Option<String>,

    /// Overrides the host of the reconstructed page URL.
    pub host: Option<String>,

    /// Which calling convention the rendering service speaks.
    pub request_style: RequestStyle,

    /// Header whose presence forces a render regardless of user-agent.
    pub force_render_header: String,
}

impl Default for PrerenderConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:3001/".to_string(),
            credentials: None,
            ignored_extensions: defaults::ignored_extensions(),
            crawler_user_agents: defaults::crawler_user_agents(),
            redirect_status_codes: defaults::REDIRECT_STATUS_CODES.to_vec(),
            fullpage: true,
            render_type: defaults::RENDER_TYPE.to_string(),
            protocol: None,
            host: None,
            request_style: RequestStyle::Post,
            force_render_header: defaults::FORCE_RENDER_HEADER.to_string(),
        }
    }
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Connection establishment timeout towards the rendering service in seconds.
    pub connect_secs: u64,

    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            request_secs: 30,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
