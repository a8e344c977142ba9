//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate the rendering service endpoint and overrides
//! - Validate value ranges (status codes, addresses)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use axum::http::HeaderName;
use url::Url;

use crate::config::schema::ProxyConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("invalid listener bind address '{0}'")]
    BindAddress(String),
    #[error("origin address must not be empty")]
    EmptyOrigin,
    #[error("prerender endpoint '{0}' is not an http(s) URL")]
    Endpoint(String),
    #[error("redirect status code {0} is outside 100..=599")]
    RedirectStatus(u16),
    #[error("render_type must not be empty")]
    EmptyRenderType,
    #[error("force_render_header '{0}' is not a valid header name")]
    ForceHeader(String),
    #[error("credentials username must not be empty")]
    EmptyUsername,
    #[error("protocol override '{0}' must be http or https")]
    Protocol(String),
    #[error("host override must not be empty")]
    EmptyHost,
}

/// Validate a parsed configuration, collecting every problem found.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }

    if config.origin.address.trim().is_empty() {
        errors.push(ValidationError::EmptyOrigin);
    }

    let prerender = &config.prerender;
    match Url::parse(&prerender.endpoint) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        _ => errors.push(ValidationError::Endpoint(prerender.endpoint.clone())),
    }

    for code in &prerender.redirect_status_codes {
        if !(100..=599).contains(code) {
            errors.push(ValidationError::RedirectStatus(*code));
        }
    }

    if prerender.render_type.is_empty() {
        errors.push(ValidationError::EmptyRenderType);
    }

    if HeaderName::from_bytes(prerender.force_render_header.as_bytes()).is_err() {
        errors.push(ValidationError::ForceHeader(prerender.force_render_header.clone()));
    }

    if let Some(credentials) = &prerender.credentials {
        if credentials.username.is_empty() {
            errors.push(ValidationError::EmptyUsername);
        }
    }

    if let Some(protocol) = &prerender.protocol {
        if !matches!(protocol.as_str(), "http" | "https") {
            errors.push(ValidationError::Protocol(protocol.clone()));
        }
    }

    if let Some(host) = &prerender.host {
        if host.trim().is_empty() {
            errors.push(ValidationError::EmptyHost);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
