//! Prerender proxy library.
//!
//! An axum middleware that serves search-engine crawlers and link-preview
//! fetchers from an external rendering service, plus a proxy server that
//! puts it in front of an origin application.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod prerender;

pub use config::ProxyConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use prerender::{prerender_middleware, should_render, PrerenderState, RequestFacts};
