//! Crawler detection and rendering-service relay.
//!
//! # Data Flow
//! ```text
//! Incoming Request
//!     → RequestFacts (borrowed view: method, url, user-agent, ...)
//!     → classifier.rs (pure decision, no I/O)
//!         false → next handler → X-Prerender: false
//!         true  → relay.rs
//!                   build_exchange (pure)
//!                   → RenderClient::execute (one outbound call)
//!                   → interpret (pure) → RelayOutcome
//!                   → IntoResponse → X-Prerender: true
//! ```
//!
//! # Design Decisions
//! - Matching is plain substring search, not suffix or token matching
//! - The relay never retries and never follows redirects itself
//! - The outbound result is an explicit value applied to the response by
//!   the caller, never a response captured and mutated inside the call

pub mod classifier;
pub mod defaults;
pub mod middleware;
pub mod relay;

use std::borrow::Cow;

use axum::http::{header, HeaderValue, Method, Request};

pub use classifier::should_render;
pub use middleware::{prerender_middleware, PrerenderState, X_PRERENDER};
pub use relay::{OutboundExchange, RelayError, RelayOutcome, RenderClient, UpstreamResponse};

/// Per-request facts consulted by the classifier and the relay.
#[derive(Debug, Clone)]
pub struct RequestFacts<'a> {
    pub method: &'a Method,
    /// Path and query as received, e.g. `/page?foo=1`.
    pub path_and_query: &'a str,
    /// Empty when the header is absent. Non-UTF-8 bytes are replaced.
    pub user_agent: Cow<'a, str>,
    /// The user-agent header exactly as received, forwarded to the renderer.
    pub user_agent_header: Option<&'a HeaderValue>,
    /// The forced-render signal header carried a non-empty value.
    pub forced: bool,
    /// Scheme observed on the request, if any; only `http` or `https`.
    pub scheme: Option<&'a str>,
    /// Host observed on the request, if any.
    pub host: Option<&'a str>,
}

impl<'a> RequestFacts<'a> {
    /// Extract facts from a request. `force_header` names the forced-render signal.
    pub fn from_request<B>(req: &'a Request<B>, force_header: &str) -> Self {
        let headers = req.headers();

        let forced = headers
            .get(force_header)
            .map(|v| !v.is_empty())
            .unwrap_or(false);

        let scheme = match req.uri().scheme_str() {
            Some(scheme) => web_scheme(scheme),
            None => headers
                .get("x-forwarded-proto")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.split(',').next())
                .and_then(|v| web_scheme(v.trim())),
        };

        let user_agent_header = headers.get(header::USER_AGENT);

        let host = headers
            .get(header::HOST)
            .and_then(|v| v.to_str().ok())
            .filter(|h| !h.is_empty())
            .or_else(|| req.uri().authority().map(|a| a.as_str()));

        Self {
            method: req.method(),
            path_and_query: req
                .uri()
                .path_and_query()
                .map(|pq| pq.as_str())
                .unwrap_or("/"),
            user_agent: user_agent_header
                .map(|v| String::from_utf8_lossy(v.as_bytes()))
                .unwrap_or(Cow::Borrowed("")),
            user_agent_header,
            forced,
            scheme,
            host,
        }
    }
}

/// Normalizes a scheme to `http` or `https`; anything else is dropped.
fn web_scheme(scheme: &str) -> Option<&'static str> {
    if scheme.eq_ignore_ascii_case("https") {
        Some("https")
    } else if scheme.eq_ignore_ascii_case("http") {
        Some("http")
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    #[test]
    fn facts_from_request() {
        let req = Request::builder()
            .method("GET")
            .uri("/page?foo=1")
            .header("Host", "example.com")
            .header("User-Agent", "Twitterbot/1.0")
            .header("X-Forwarded-Proto", "https, http")
            .body(Body::empty())
            .unwrap();

        let facts = RequestFacts::from_request(&req, "x-bufferbot");
        assert_eq!(facts.method, Method::GET);
        assert_eq!(facts.path_and_query, "/page?foo=1");
        assert_eq!(facts.user_agent, "Twitterbot/1.0");
        assert!(!facts.forced);
        assert_eq!(facts.scheme, Some("https"));
        assert_eq!(facts.host, Some("example.com"));
    }

    #[test]
    fn absolute_uri_supplies_scheme_and_host() {
        let req = Request::builder()
            .uri("http://origin.test:8080/a")
            .header("X-BufferBot", "1")
            .body(Body::empty())
            .unwrap();

        let facts = RequestFacts::from_request(&req, "x-bufferbot");
        assert!(facts.forced);
        assert_eq!(facts.user_agent, "");
        assert_eq!(facts.scheme, Some("http"));
        assert_eq!(facts.host, Some("origin.test:8080"));
    }

    #[test]
    fn empty_force_header_is_not_forced() {
        let req = Request::builder()
            .uri("/")
            .header("x-bufferbot", "")
            .body(Body::empty())
            .unwrap();

        assert!(!RequestFacts::from_request(&req, "x-bufferbot").forced);
    }

    #[test]
    fn non_ascii_user_agent_is_kept() {
        let raw = HeaderValue::from_bytes("Twitterbot/1.0 (café)".as_bytes()).unwrap();
        let req = Request::builder()
            .uri("/page")
            .header(header::USER_AGENT, raw.clone())
            .body(Body::empty())
            .unwrap();

        let facts = RequestFacts::from_request(&req, "x-bufferbot");
        assert_eq!(facts.user_agent, "Twitterbot/1.0 (café)");
        assert_eq!(facts.user_agent_header, Some(&raw));
    }

    #[test]
    fn forwarded_proto_limited_to_web_schemes() {
        let proto = |value: &str| {
            let req = Request::builder()
                .uri("/")
                .header("X-Forwarded-Proto", value)
                .body(Body::empty())
                .unwrap();
            RequestFacts::from_request(&req, "x-bufferbot")
                .scheme
                .and_then(web_scheme)
        };

        assert_eq!(proto("gopher"), None);
        assert_eq!(proto("javascript"), None);
        assert_eq!(proto("HTTPS"), Some("https"));
        assert_eq!(proto("http, https"), Some("http"));
    }
}
