//! Utility functions for string formatting and manipulation.

pub mod format;

// Re-export commonly used functions at module level
pub use format::{days_since_ms, format_ms_date, truncate_string};
