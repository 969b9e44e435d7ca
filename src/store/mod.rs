//! Local persistence for learner state.
//!
//! Everything the portal remembers between runs lives in a single
//! per-user key-value store (one JSON file per key):
//!
//! - `grade`: active grade selection
//! - `progress`: progress map keyed by lesson identifier
//! - `bookmarks`: bookmarked lesson identifiers
//! - `last_visit`: last startup timestamp
//! - `theme`: UI theme name
//! - `analytics`: capped telemetry event log
//!
//! All access is synchronous and last-write-wins; there is a single user
//! and a single process, so no locking is needed.

pub mod analytics;
pub mod kv;
pub mod progress;

pub use analytics::AnalyticsLog;
pub use kv::KvStore;
pub use progress::ProgressStore;
