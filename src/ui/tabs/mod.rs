//! Content rendering for the main area.

pub mod lessons;
