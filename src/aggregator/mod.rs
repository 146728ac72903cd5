//! Aggregation of parsed records into summary statistics.

pub mod summary;

// Re-export main functions
pub use summary::{summarize, EventSummary};
