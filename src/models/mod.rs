//! Data models for portal entities.
//!
//! This module contains the data structures shared across the app:
//!
//! - `Grade`, `LessonStatus`, `Availability`: lesson-level enums
//! - `ProgressRecord`, `Snapshot`, `LessonStats`: progress tracking types
//! - `AnalyticsEvent`: write-only telemetry records

pub mod analytics;
pub mod lesson;
pub mod progress;

pub use analytics::AnalyticsEvent;
pub use lesson::{Availability, Grade, LessonStatus};
pub use progress::{LessonStats, ProgressRecord, Snapshot};
