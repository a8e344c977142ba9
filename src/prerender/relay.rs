//! Rendering service relay.
//!
//! # Responsibilities
//! - Reconstruct the public URL of the requested page
//! - Describe the outbound exchange for the configured calling convention
//! - Issue exactly one call to the rendering service
//! - Map the upstream result onto a response (body, status, redirect)
//!
//! # Design Decisions
//! - Building and interpreting are pure; only `RenderClient::execute` does I/O
//! - Redirects from the rendering service are inspected, never followed
//! - The rendered payload is opaque bytes and is never parsed
//! - Dropping the future aborts the outbound call; nothing is written

use std::time::Duration;

use axum::{
    body::{Body, Bytes},
    http::{
        header::{self, InvalidHeaderValue},
        HeaderMap, HeaderValue, Method, StatusCode,
    },
    response::{IntoResponse, Response},
};
use serde::Serialize;

use super::defaults::RENDERER_USER_AGENT;
use super::RequestFacts;
use crate::config::{Credentials, PrerenderConfig, RequestStyle};

/// Error raised while relaying a request to the rendering service.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("request has no host and no host override is configured")]
    MissingHost,
    #[error("invalid outbound header value: {0}")]
    InvalidHeader(#[from] InvalidHeaderValue),
    #[error("failed to serialize render payload: {0}")]
    Payload(#[from] serde_json::Error),
    #[error("rendering service request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("failed to read rendering service response: {0}")]
    Body(#[source] reqwest::Error),
}

impl RelayError {
    /// Status reported to the client when the relay fails.
    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::MissingHost | RelayError::InvalidHeader(_) => StatusCode::BAD_REQUEST,
            RelayError::Transport(e) | RelayError::Body(e) if e.is_timeout() => {
                StatusCode::GATEWAY_TIMEOUT
            }
            _ => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match status {
            StatusCode::BAD_REQUEST => "Cannot render request",
            StatusCode::GATEWAY_TIMEOUT => "Rendering service timed out",
            _ => "Rendering service request failed",
        };
        (status, message).into_response()
    }
}

/// JSON body of a `RequestStyle::Post` exchange.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RenderPayload<'a> {
    render_type: &'a str,
    fullpage: bool,
    url: &'a str,
    user_agent: &'a str,
}

/// A fully described call to the rendering service.
#[derive(Debug, Clone)]
pub struct OutboundExchange {
    pub method: Method,
    pub url: String,
    /// Serialized JSON payload; `None` for the legacy GET convention.
    pub body: Option<String>,
    pub headers: HeaderMap,
    pub auth: Option<Credentials>,
}

/// What the rendering service answered.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub location: Option<HeaderValue>,
    pub content_type: Option<HeaderValue>,
    pub body: Bytes,
}

/// The result of a relay, applied to the client response by the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum RelayOutcome {
    /// Upstream asked for a redirect; no body is sent.
    Redirect {
        status: StatusCode,
        location: HeaderValue,
    },
    /// Upstream payload relayed unmodified.
    Rendered {
        status: StatusCode,
        content_type: Option<HeaderValue>,
        body: Bytes,
    },
}

impl IntoResponse for RelayOutcome {
    fn into_response(self) -> Response {
        match self {
            RelayOutcome::Redirect { status, location } => {
                let mut response = Response::new(Body::empty());
                *response.status_mut() = status;
                response.headers_mut().insert(header::LOCATION, location);
                response
            }
            RelayOutcome::Rendered {
                status,
                content_type,
                body,
            } => {
                let mut response = Response::new(Body::from(body));
                *response.status_mut() = status;
                response.headers_mut().insert(
                    header::CONTENT_TYPE,
                    content_type
                        .unwrap_or_else(|| HeaderValue::from_static("text/html; charset=utf-8")),
                );
                response
            }
        }
    }
}

/// Public URL of the requested page, as the rendering service should load it.
pub fn render_url(facts: &RequestFacts<'_>, config: &PrerenderConfig) -> Result<String, RelayError> {
    let protocol = config
        .protocol
        .as_deref()
        .or(facts.scheme)
        .unwrap_or("http");
    let host = config
        .host
        .as_deref()
        .or(facts.host)
        .ok_or(RelayError::MissingHost)?;

    Ok(format!("{}://{}{}", protocol, host, facts.path_and_query))
}

/// Describe the outbound call for the configured calling convention.
pub fn build_exchange(
    facts: &RequestFacts<'_>,
    config: &PrerenderConfig,
) -> Result<OutboundExchange, RelayError> {
    let page_url = render_url(facts, config)?;

    let mut headers = HeaderMap::new();
    let user_agent = match facts.user_agent_header {
        Some(raw) => raw.clone(),
        None => HeaderValue::from_str(&facts.user_agent)?,
    };
    headers.insert(header::USER_AGENT, user_agent);

    let exchange = match config.request_style {
        RequestStyle::Post => {
            headers.insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/json"),
            );
            let payload = RenderPayload {
                render_type: &config.render_type,
                fullpage: config.fullpage,
                url: &page_url,
                user_agent: RENDERER_USER_AGENT,
            };
            OutboundExchange {
                method: Method::POST,
                url: config.endpoint.clone(),
                body: Some(serde_json::to_string(&payload)?),
                headers,
                auth: config.credentials.clone(),
            }
        }
        RequestStyle::LegacyGet => {
            let separator = if config.endpoint.ends_with('/') { "" } else { "/" };
            OutboundExchange {
                method: Method::GET,
                url: format!("{}{}{}", config.endpoint, separator, page_url),
                body: None,
                headers,
                auth: config.credentials.clone(),
            }
        }
    };

    Ok(exchange)
}

/// Map an upstream answer to the outcome relayed to the client.
///
/// A redirect is relayed only when the status is a configured redirect code
/// AND a non-empty `Location` is present; otherwise the status and body are
/// relayed as they are.
pub fn interpret(upstream: UpstreamResponse, config: &PrerenderConfig) -> RelayOutcome {
    let is_redirect_code = config
        .redirect_status_codes
        .contains(&upstream.status.as_u16());

    match upstream.location {
        Some(location) if is_redirect_code && !location.is_empty() => RelayOutcome::Redirect {
            status: upstream.status,
            location,
        },
        _ => RelayOutcome::Rendered {
            status: upstream.status,
            content_type: upstream.content_type,
            body: upstream.body,
        },
    }
}

/// HTTP client for the rendering service.
///
/// Negotiates gzip and never follows redirects, for every exchange it runs.
#[derive(Debug, Clone)]
pub struct RenderClient {
    client: reqwest::Client,
}

impl RenderClient {
    pub fn new(connect_timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .gzip(true)
            .connect_timeout(connect_timeout)
            .no_proxy()
            .build()?;
        Ok(Self { client })
    }

    /// Issue the exchange once. No retry.
    pub async fn execute(&self, exchange: OutboundExchange) -> Result<UpstreamResponse, RelayError> {
        let mut request = self
            .client
            .request(exchange.method, &exchange.url)
            .headers(exchange.headers);

        if let Some(credentials) = exchange.auth {
            request = request.basic_auth(credentials.username, credentials.password);
        }
        if let Some(body) = exchange.body {
            request = request.body(body);
        }

        let response = request.send().await.map_err(RelayError::Transport)?;

        let status = response.status();
        let location = response.headers().get(header::LOCATION).cloned();
        let content_type = response.headers().get(header::CONTENT_TYPE).cloned();
        let body = response.bytes().await.map_err(RelayError::Body)?;

        Ok(UpstreamResponse {
            status,
            location,
            content_type,
            body,
        })
    }

    /// Execute the exchange and interpret the answer.
    pub async fn relay(
        &self,
        exchange: OutboundExchange,
        config: &PrerenderConfig,
    ) -> Result<RelayOutcome, RelayError> {
        let upstream = self.execute(exchange).await?;
        Ok(interpret(upstream, config))
    }
}
