//! Output writers for event records.
//!
//! This module handles writing data to disk in various formats:
//! - CSV tables (create or append)
//! - JSON arrays

pub mod csv;
pub mod json;

// Re-export main functions
pub use self::csv::{read_records, write_records_csv, CsvRecordWriter};
pub use self::json::{read_records_json, write_records_json};
