//! The network seam for the caching layer.
//!
//! Strategies operate against the `Fetch` trait rather than `reqwest`
//! directly, so cache behavior can be exercised with a scripted fake.
//! Bodies are fully buffered: a fetched response is an owned value that can
//! be written to a partition and returned to the caller without any
//! single-use stream hazards.

use async_trait::async_trait;

use crate::api::FetchError;

/// A request as seen by the caching layer.
#[derive(Debug, Clone)]
pub struct Request {
    pub url: String,
    /// Whether this is a page navigation (navigations get the offline page
    /// as a last resort; subresource requests do not).
    pub navigation: bool,
}

impl Request {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            navigation: false,
        }
    }

    pub fn navigation(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            navigation: true,
        }
    }
}

/// A fully-buffered response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedResponse {
    pub url: String,
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl FetchedResponse {
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// A synthesized response (offline page); not tied to a network exchange.
    pub fn synthesized(url: &str, content_type: &str, body: Vec<u8>) -> Self {
        Self {
            url: url.to_string(),
            status: 200,
            content_type: Some(content_type.to_string()),
            body,
        }
    }
}

/// Network access used by the worker's strategies.
#[async_trait]
pub trait Fetch: Send + Sync {
    /// Fetch a URL, buffering the body. Transport failures and HTTP error
    /// statuses both surface as `Err`.
    async fn fetch(&self, url: &str) -> Result<FetchedResponse, FetchError>;
}
