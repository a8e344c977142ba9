//! Crawler classification.
//!
//! # Responsibilities
//! - Decide whether a request gets a rendered snapshot or passes through
//!
//! # Design Decisions
//! - Rules are evaluated in a fixed order; the first match wins
//! - Extension matching is a substring test on the full request URL, so
//!   `/app.jsx` and `/x?f=a.js` are both treated as assets
//! - Crawler matching is a case-insensitive substring test
//! - Total and stateless: same facts and config always give the same answer

use axum::http::Method;

use super::RequestFacts;
use crate::config::PrerenderConfig;

/// Query key of the legacy AJAX crawling scheme.
pub const ESCAPED_FRAGMENT: &str = "_escaped_fragment_";

/// Returns true if the request should be served by the rendering service.
pub fn should_render(facts: &RequestFacts<'_>, config: &PrerenderConfig) -> bool {
    if facts.user_agent.is_empty() {
        return false;
    }

    if facts.method != Method::GET {
        return false;
    }

    if config
        .ignored_extensions
        .iter()
        .any(|ext| facts.path_and_query.contains(ext.as_str()))
    {
        return false;
    }

    if has_escaped_fragment(facts.path_and_query) {
        return true;
    }

    if facts.forced {
        return true;
    }

    is_crawler(&facts.user_agent, &config.crawler_user_agents)
}

/// Case-insensitive substring match of the user-agent against crawler signatures.
pub fn is_crawler(user_agent: &str, signatures: &[String]) -> bool {
    let user_agent = user_agent.to_lowercase();
    signatures
        .iter()
        .any(|sig| user_agent.contains(&sig.to_lowercase()))
}

fn has_escaped_fragment(path_and_query: &str) -> bool {
    match path_and_query.split_once('?') {
        Some((_, query)) => url::form_urlencoded::parse(query.as_bytes())
            .any(|(key, _)| key == ESCAPED_FRAGMENT),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn facts<'a>(method: &'a Method, url: &'a str, ua: &'a str) -> RequestFacts<'a> {
        RequestFacts {
            method,
            path_and_query: url,
            user_agent: ua.into(),
            user_agent_header: None,
            forced: false,
            scheme: None,
            host: Some("example.com"),
        }
    }

    #[test]
    fn empty_user_agent_never_renders() {
        let config = PrerenderConfig::default();
        let get = Method::GET;
        assert!(!should_render(&facts(&get, "/page?_escaped_fragment_=", ""), &config));

        let mut forced = facts(&get, "/page", "");
        forced.forced = true;
        assert!(!should_render(&forced, &config));
    }

    #[test]
    fn non_get_never_renders() {
        let config = PrerenderConfig::default();
        for method in [Method::POST, Method::HEAD, Method::PUT, Method::DELETE] {
            assert!(!should_render(&facts(&method, "/page", "Googlebot"), &config));
            assert!(!should_render(
                &facts(&method, "/page?_escaped_fragment_=x", "twitterbot"),
                &config
            ));
        }
    }

    #[test]
    fn ignored_extension_beats_crawler() {
        let config = PrerenderConfig::default();
        let get = Method::GET;
        assert!(!should_render(&facts(&get, "/app.js", "Twitterbot/1.0"), &config));
        assert!(!should_render(&facts(&get, "/logo.png?_escaped_fragment_=", "Twitterbot"), &config));

        let mut forced = facts(&get, "/style.css", "Mozilla/5.0");
        forced.forced = true;
        assert!(!should_render(&forced, &config));
    }

    #[test]
    fn extension_match_is_plain_substring() {
        let config = PrerenderConfig::default();
        let get = Method::GET;
        assert!(!should_render(&facts(&get, "/component.jsx", "twitterbot"), &config));
        assert!(!should_render(&facts(&get, "/page?file=main.js", "twitterbot"), &config));
        assert!(!should_render(&facts(&get, "/icons/svg/home", "twitterbot"), &config));
    }

    #[test]
    fn escaped_fragment_renders_for_any_agent() {
        let config = PrerenderConfig::default();
        let get = Method::GET;
        assert!(should_render(&facts(&get, "/page?_escaped_fragment_=", "Mozilla/5.0"), &config));
        assert!(should_render(&facts(&get, "/page?a=1&_escaped_fragment_", "curl/8.0"), &config));
        assert!(!should_render(&facts(&get, "/page?x_escaped_fragment_=1", "curl/8.0"), &config));
        assert!(!should_render(&facts(&get, "/_escaped_fragment_", "curl/8.0"), &config));
    }

    #[test]
    fn forced_header_renders() {
        let config = PrerenderConfig::default();
        let get = Method::GET;
        let mut f = facts(&get, "/page", "Mozilla/5.0 (Macintosh)");
        assert!(!should_render(&f, &config));
        f.forced = true;
        assert!(should_render(&f, &config));
    }

    #[test]
    fn crawler_match_is_case_insensitive() {
        let config = PrerenderConfig::default();
        let get = Method::GET;
        assert!(should_render(&facts(&get, "/page?foo=1", "Twitterbot/1.0"), &config));
        assert!(should_render(&facts(&get, "/", "Mozilla/5.0 (compatible; Baiduspider/2.0)"), &config));
        assert!(should_render(&facts(&get, "/", "facebookexternalhit/1.1"), &config));
        assert!(should_render(&facts(&get, "/", "VKSHARE; +http://vk.com/dev/Share"), &config));
        assert!(should_render(&facts(&get, "/", "w3c_validator/1.3"), &config));
        assert!(!should_render(&facts(&get, "/", "Mozilla/5.0 (X11; Linux x86_64) Firefox/120.0"), &config));
    }

    #[test]
    fn custom_signatures_replace_defaults() {
        let mut config = PrerenderConfig::default();
        config.crawler_user_agents = vec!["GoogleBot".into()];
        let get = Method::GET;
        assert!(should_render(&facts(&get, "/page", "Mozilla/5.0 (compatible; Googlebot/2.1)"), &config));
        assert!(!should_render(&facts(&get, "/page", "Twitterbot/1.0"), &config));
    }

    #[test]
    fn non_ascii_crawler_agent_still_renders() {
        let config = PrerenderConfig::default();
        let get = Method::GET;
        assert!(should_render(&facts(&get, "/page", "Twitterbot/1.0 (caf\u{fffd})"), &config));
    }

    #[test]
    fn classification_is_idempotent() {
        let config = PrerenderConfig::default();
        let get = Method::GET;
        let f = facts(&get, "/page?foo=1", "LinkedInBot/1.0");
        let first = should_render(&f, &config);
        for _ in 0..10 {
            assert_eq!(should_render(&f, &config), first);
        }
    }
}
