//! HTTP client for the portal origin.
//!
//! Provides lesson-availability probes (HEAD) and asset fetches (GET) for
//! the offline cache. Relative lesson hrefs resolve against the configured
//! portal base URL; absolute URLs (CDN assets) pass through untouched.

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::cache::fetch::{Fetch, FetchedResponse};

use super::FetchError;

/// HTTP request timeout in seconds.
/// Lesson pages are small static files; anything slower than this is
/// effectively unreachable for probing purposes.
const REQUEST_TIMEOUT_SECS: u64 = 10;

/// HTTP client for the portal.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct PortalClient {
    client: Client,
    base_url: String,
}

impl PortalClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Resolve a site-relative path against the portal origin. Absolute
    /// URLs are returned unchanged.
    pub fn resolve(&self, path_or_url: &str) -> String {
        if path_or_url.starts_with("http://") || path_or_url.starts_with("https://") {
            path_or_url.to_string()
        } else {
            format!("{}/{}", self.base_url, path_or_url.trim_start_matches('/'))
        }
    }

    /// Existence probe for a lesson page. Any failure - transport error,
    /// timeout, or non-2xx status - reads as "not there yet".
    pub async fn lesson_exists(&self, href: &str) -> bool {
        let url = self.resolve(href);
        match self.client.head(&url).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                debug!(url = %url, error = %e, "Lesson probe failed");
                false
            }
        }
    }
}

#[async_trait]
impl Fetch for PortalClient {
    async fn fetch(&self, url: &str) -> Result<FetchedResponse, FetchError> {
        let resolved = self.resolve(url);
        let response = self.client.get(&resolved).send().await?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::from_status(status.as_u16(), &body));
        }

        let body = response.bytes().await?.to_vec();
        Ok(FetchedResponse {
            url: url.to_string(),
            status: status.as_u16(),
            content_type,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_relative_and_absolute() {
        let client = PortalClient::new("https://portal.example.org/").unwrap();
        assert_eq!(
            client.resolve("grade7/lesson-2.html"),
            "https://portal.example.org/grade7/lesson-2.html"
        );
        assert_eq!(
            client.resolve("/assets/logo.png"),
            "https://portal.example.org/assets/logo.png"
        );
        assert_eq!(
            client.resolve("https://cdn.example.com/lib.css"),
            "https://cdn.example.com/lib.css"
        );
    }
}
