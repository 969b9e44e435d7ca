//! Offline caching layer.
//!
//! This module is the portal's request-serving core: a worker that fills a
//! static cache partition on install, rotates stale partitions on activate,
//! and then serves every request through one of two strategies chosen by an
//! ordered route table:
//!
//! - network-first for lesson content (changes over time)
//! - cache-first with background revalidation for images, fonts, and
//!   static assets
//!
//! Three named partitions exist per cache version: static, dynamic, images.
//! When both network and cache miss on a navigation, a synthesized offline
//! page is returned instead of an error.

pub mod fetch;
pub mod routes;
pub mod store;
pub mod worker;

pub use fetch::{Fetch, FetchedResponse, Request};
pub use store::CacheStore;
pub use worker::CacheWorker;
