//! Progress tracking types: per-lesson records, export snapshots, stats.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::LessonStatus;

/// One progress record per lesson identifier.
///
/// Overwritten whenever the learner opens or advances a lesson; only a full
/// reset ever removes records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressRecord {
    pub status: LessonStatus,
    /// Last-modified time in milliseconds since the epoch.
    pub timestamp: i64,
    /// Grade key ("7" or "8") the record was written under.
    pub grade: String,
}

impl ProgressRecord {
    pub fn new(status: LessonStatus, grade: &str) -> Self {
        Self {
            status,
            timestamp: Utc::now().timestamp_millis(),
            grade: grade.to_string(),
        }
    }
}

impl Default for ProgressRecord {
    fn default() -> Self {
        Self {
            status: LessonStatus::NotStarted,
            timestamp: 0,
            grade: String::new(),
        }
    }
}

/// Exported data snapshot. There is no import path; this is a one-way backup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub grade: String,
    pub progress: BTreeMap<String, ProgressRecord>,
    pub bookmarks: Vec<String>,
    pub export_date: DateTime<Utc>,
}

/// Counts shown in the stats panel, scoped to the active grade.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LessonStats {
    pub total: usize,
    pub completed: usize,
    pub in_progress: usize,
    pub bookmarked: usize,
}
