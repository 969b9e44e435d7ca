//! URL classification for the caching worker.
//!
//! The route table is an ordered list of (pattern, strategy) pairs evaluated
//! first-match-wins against the request path. Network-first routes are
//! declared before cache-first routes, and anything unmatched defaults to
//! cache-first. Non-HTTP(S) schemes are never handled by the worker.

use std::sync::OnceLock;

use regex::Regex;

/// Response strategy for a matched route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Prefer live network; cache is the fallback.
    NetworkFirst,
    /// Prefer cached copy; revalidate in the background.
    CacheFirst,
}

/// Outcome of classifying a request URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    /// Non-HTTP scheme: the worker leaves the request alone.
    Passthrough,
    Apply(Strategy),
}

/// One route: a named pattern over the request path and its strategy.
pub struct Route {
    pub name: &'static str,
    pub pattern: Regex,
    pub strategy: Strategy,
}

/// The ordered route table. Declaration order is the tie-break: lesson
/// pages must hit network-first even though nothing else would match them.
pub fn route_table() -> &'static [Route] {
    static TABLE: OnceLock<Vec<Route>> = OnceLock::new();
    TABLE
        .get_or_init(|| {
            vec![
                Route {
                    name: "lesson-pages",
                    pattern: Regex::new(r"/grade[78]/lesson-\d+\.html$").expect("static regex"),
                    strategy: Strategy::NetworkFirst,
                },
                Route {
                    name: "welcome-pages",
                    pattern: Regex::new(r"/grade[78]/welcome.*\.html$").expect("static regex"),
                    strategy: Strategy::NetworkFirst,
                },
                Route {
                    name: "images",
                    pattern: Regex::new(r"\.(png|jpg|jpeg|svg|gif|webp)$").expect("static regex"),
                    strategy: Strategy::CacheFirst,
                },
                Route {
                    name: "fonts",
                    pattern: Regex::new(r"\.(woff|woff2|ttf|eot)$").expect("static regex"),
                    strategy: Strategy::CacheFirst,
                },
                Route {
                    name: "assets",
                    pattern: Regex::new(r"/assets/").expect("static regex"),
                    strategy: Strategy::CacheFirst,
                },
            ]
        })
        .as_slice()
}

/// Extract the path component of a URL. Relative URLs are already paths.
fn url_path(url: &str) -> &str {
    match url.split_once("://") {
        Some((_, rest)) => match rest.find('/') {
            Some(i) => &rest[i..],
            None => "/",
        },
        None => url,
    }
}

fn is_http(url: &str) -> bool {
    match url.split_once(':') {
        // A scheme is everything before the first ':' unless a '/' comes first
        Some((scheme, _)) if !scheme.contains('/') => matches!(scheme, "http" | "https"),
        // No scheme: a relative same-origin path
        _ => true,
    }
}

/// Classify a request URL against the route table.
pub fn classify(url: &str) -> RouteDecision {
    if !is_http(url) {
        return RouteDecision::Passthrough;
    }

    let path = url_path(url);
    for route in route_table() {
        if route.pattern.is_match(path) {
            return RouteDecision::Apply(route.strategy);
        }
    }

    RouteDecision::Apply(Strategy::CacheFirst)
}

/// Whether a URL names an image by suffix; decides the storage partition
/// for cache-first fills.
pub fn is_image_url(url: &str) -> bool {
    static IMAGE: OnceLock<Regex> = OnceLock::new();
    IMAGE
        .get_or_init(|| Regex::new(r"\.(png|jpg|jpeg|svg|gif|webp)$").expect("static regex"))
        .is_match(url_path(url))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lesson_pages_are_network_first() {
        assert_eq!(
            classify("https://portal.example.org/grade7/lesson-12.html"),
            RouteDecision::Apply(Strategy::NetworkFirst)
        );
        assert_eq!(
            classify("/grade8/lesson-2.html"),
            RouteDecision::Apply(Strategy::NetworkFirst)
        );
        assert_eq!(
            classify("/grade8/welcome-back.html"),
            RouteDecision::Apply(Strategy::NetworkFirst)
        );
    }

    #[test]
    fn test_images_fonts_and_assets_are_cache_first() {
        for url in [
            "/assets/banner.png",
            "https://cdn.example.com/fonts/inter.woff2",
            "/assets/styles/site.css",
        ] {
            assert_eq!(classify(url), RouteDecision::Apply(Strategy::CacheFirst), "{}", url);
        }
    }

    #[test]
    fn test_unmatched_defaults_to_cache_first() {
        assert_eq!(
            classify("https://portal.example.org/about.html"),
            RouteDecision::Apply(Strategy::CacheFirst)
        );
    }

    #[test]
    fn test_declaration_order_wins() {
        // A lesson page that is also under /assets/ would match both; the
        // earlier network-first route must win.
        assert_eq!(
            classify("/assets/grade7/lesson-3.html"),
            RouteDecision::Apply(Strategy::NetworkFirst)
        );
        // Network-first routes all precede cache-first routes in the table
        let table = route_table();
        let first_cache_first = table
            .iter()
            .position(|r| r.strategy == Strategy::CacheFirst)
            .unwrap();
        assert!(table[..first_cache_first]
            .iter()
            .all(|r| r.strategy == Strategy::NetworkFirst));
    }

    #[test]
    fn test_non_http_schemes_pass_through() {
        assert_eq!(classify("chrome-extension://abc/def.png"), RouteDecision::Passthrough);
        assert_eq!(classify("data:image/png;base64,xyz"), RouteDecision::Passthrough);
        assert_eq!(classify("ftp://example.com/file.png"), RouteDecision::Passthrough);
        assert_eq!(
            classify("/grade7/lesson-2.html"),
            RouteDecision::Apply(Strategy::NetworkFirst)
        );
    }

    #[test]
    fn test_image_suffix_partitioning() {
        assert!(is_image_url("/assets/logo.svg"));
        assert!(!is_image_url("/assets/site.css"));
        assert!(is_image_url("https://cdn.example.com/pic.webp"));
    }
}
