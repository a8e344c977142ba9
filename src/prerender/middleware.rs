//! Prerender middleware.
//!
//! Sits in front of the application handler. Crawler requests are answered
//! by the rendering service and tagged `X-Prerender: true`; everything else
//! runs the next handler and is tagged `X-Prerender: false`. The two paths
//! are exclusive: a failed relay never falls back to the next handler.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::{HeaderName, HeaderValue, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::classifier::should_render;
use super::relay::{build_exchange, RenderClient};
use super::RequestFacts;
use crate::config::PrerenderConfig;
use crate::http::request::request_id;
use crate::observability::metrics;

/// Response header recording which path served the request.
pub const X_PRERENDER: HeaderName = HeaderName::from_static("x-prerender");

/// Shared, read-only state of the middleware.
#[derive(Debug, Clone)]
pub struct PrerenderState {
    pub config: Arc<PrerenderConfig>,
    pub client: RenderClient,
}

impl PrerenderState {
    pub fn new(config: Arc<PrerenderConfig>, client: RenderClient) -> Self {
        Self { config, client }
    }
}

fn tag(response: &mut Response, rendered: bool) {
    let value = if rendered { "true" } else { "false" };
    response
        .headers_mut()
        .insert(X_PRERENDER, HeaderValue::from_static(value));
}

pub async fn prerender_middleware(
    State(state): State<PrerenderState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let request_id = request_id(&req).to_string();

    // Facts borrow the request; resolve everything needed before awaiting.
    let exchange = {
        let facts = RequestFacts::from_request(&req, &state.config.force_render_header);
        if should_render(&facts, &state.config) {
            Some(build_exchange(&facts, &state.config))
        } else {
            None
        }
    };

    let exchange = match exchange {
        None => {
            metrics::record_decision(false);
            let mut response = next.run(req).await;
            tag(&mut response, false);
            return response;
        }
        Some(Ok(exchange)) => exchange,
        Some(Err(e)) => {
            tracing::warn!(request_id = %request_id, uri = %req.uri(), error = %e, "Cannot build render request");
            metrics::record_decision(true);
            metrics::record_relay_error(Instant::now());
            return e.into_response();
        }
    };

    metrics::record_decision(true);
    tracing::debug!(
        request_id = %request_id,
        method = %exchange.method,
        target = %exchange.url,
        "Relaying request to rendering service"
    );

    let start_time = Instant::now();
    match state.client.relay(exchange, &state.config).await {
        Ok(outcome) => {
            metrics::record_relay(&outcome, start_time);
            let mut response = outcome.into_response();
            tracing::debug!(
                request_id = %request_id,
                status = %response.status(),
                "Rendered response relayed"
            );
            tag(&mut response, true);
            response
        }
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Rendering service error");
            metrics::record_relay_error(start_time);
            e.into_response()
        }
    }
}
