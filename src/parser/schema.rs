//! Record schema written to CSV/JSON.
//!
//! Field order here is the column order of the persisted CSV
//! (see `utils::config::CSV_COLUMNS`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One sampled event, fully materialized
///
/// Every field is optional: a block that lacks a detail line, or carries
/// a value that does not convert, simply leaves that field empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Sample time in nanoseconds (`None` for the `.` placeholder)
    pub timestamp: Option<u64>,

    /// Header address, verbatim (e.g. `0x7fff1000`)
    pub address: Option<String>,

    /// Free-form tail of the header line
    pub event_type: Option<String>,

    /// Bracketed record size from the header, verbatim
    pub event_size: Option<String>,

    pub thread_id: Option<String>,
    pub process_id: Option<String>,

    /// Shared object the sample was attributed to
    pub dso: Option<String>,

    /// Sample period count
    pub period: Option<u64>,

    /// Instruction pointer, verbatim
    pub ip_address: Option<String>,

    /// Raw dump lines, newline-joined
    pub raw_data: Option<String>,

    /// `timestamp` as a calendar time
    pub timestamp_readable: Option<DateTime<Utc>>,

    /// `address` parsed as base-16
    pub address_numeric: Option<u64>,
}

impl EventRecord {
    /// True when the header line was recognised
    pub fn has_header(&self) -> bool {
        self.address.is_some()
    }
}
