//! HTTP surface of the portal.
//!
//! This module provides the `PortalClient` for probing lesson availability
//! (lightweight HEAD requests) and for fetching assets into the offline
//! cache. There is no authentication; the portal is a public static site.

pub mod client;
pub mod error;

pub use client::PortalClient;
pub use error::FetchError;
