//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the origin handler
//! - Wire up middleware (prerender, timeout, tracing, request ID)
//! - Bind server to listener
//! - Forward pass-through requests to the origin server

use axum::{
    body::Body,
    extract::State,
    http::{
        uri::{Authority, InvalidUri, PathAndQuery, Scheme},
        Request, StatusCode, Uri, Version,
    },
    middleware,
    response::{IntoResponse, Response},
    Router,
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::ProxyConfig;
use crate::http::request::{propagate_request_id_layer, request_id, set_request_id_layer};
use crate::prerender::{prerender_middleware, PrerenderState, RenderClient};

/// Error building the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("failed to build rendering service client: {0}")]
    RenderClient(#[from] reqwest::Error),
    #[error("invalid origin address '{address}': {source}")]
    Origin {
        address: String,
        #[source]
        source: InvalidUri,
    },
}

/// State of the origin pass-through handler.
#[derive(Clone)]
pub struct OriginState {
    pub client: Client<HttpConnector, Body>,
    pub authority: Authority,
}

/// HTTP server fronting the origin with the prerender filter.
pub struct HttpServer {
    router: Router,
    config: Arc<ProxyConfig>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ProxyConfig) -> Result<Self, ServerError> {
        let authority =
            Authority::from_str(&config.origin.address).map_err(|source| ServerError::Origin {
                address: config.origin.address.clone(),
                source,
            })?;

        let origin = OriginState {
            client: Client::builder(TokioExecutor::new()).build(HttpConnector::new()),
            authority,
        };

        let render_client = RenderClient::new(Duration::from_secs(config.timeouts.connect_secs))?;
        let prerender = PrerenderState::new(Arc::new(config.prerender.clone()), render_client);

        let router = Self::build_router(&config, origin, prerender);
        Ok(Self {
            router,
            config: Arc::new(config),
        })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ProxyConfig, origin: OriginState, prerender: PrerenderState) -> Router {
        Router::new()
            .fallback(origin_handler)
            .with_state(origin)
            .layer(middleware::from_fn_with_state(prerender, prerender_middleware))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(TraceLayer::new_for_http())
            .layer(propagate_request_id_layer())
            .layer(set_request_id_layer())
    }

    /// The fully layered router, for embedding or in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until a shutdown signal is received.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            origin = %self.config.origin.address,
            render_endpoint = %self.config.prerender.endpoint,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }
}

/// Forward a pass-through request to the origin, unchanged apart from its URI.
async fn origin_handler(State(state): State<OriginState>, mut request: Request<Body>) -> Response {
    let request_id = request_id(&request).to_string();

    let mut uri_parts = request.uri().clone().into_parts();
    uri_parts.scheme = Some(Scheme::HTTP);
    uri_parts.authority = Some(state.authority.clone());
    if uri_parts.path_and_query.is_none() {
        uri_parts.path_and_query = Some(PathAndQuery::from_static("/"));
    }
    // The origin connection speaks HTTP/1.1 whatever the client used.
    *request.version_mut() = Version::HTTP_11;
    match Uri::from_parts(uri_parts) {
        Ok(uri) => *request.uri_mut() = uri,
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Cannot build origin URI");
            return (StatusCode::BAD_GATEWAY, "Origin request failed").into_response();
        }
    }

    tracing::debug!(
        request_id = %request_id,
        method = %request.method(),
        uri = %request.uri(),
        "Forwarding request to origin"
    );

    match state.client.request(request).await {
        Ok(response) => {
            let (parts, body) = response.into_parts();
            Response::from_parts(parts, Body::new(body))
        }
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Origin error");
            (StatusCode::BAD_GATEWAY, "Origin request failed").into_response()
        }
    }
}
