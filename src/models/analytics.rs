//! Write-only telemetry event records.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A single analytics event.
///
/// Events are appended to a capped log and never read back programmatically;
/// losing them has no user-visible consequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsEvent {
    pub name: String,
    /// Milliseconds since the epoch.
    pub timestamp: i64,
    pub session_id: String,
    pub grade: String,
    /// Event-specific fields, flattened into the serialized object.
    #[serde(flatten)]
    pub fields: BTreeMap<String, String>,
}
