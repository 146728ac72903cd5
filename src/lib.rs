//! Perf Trace Studio
//!
//! Turns the text output of `perf script` (sample headers followed by
//! indented detail lines) into a stream of typed event records, and
//! persists them as CSV or JSON.
//!
//! This crate provides the core implementation for the
//! `perf-trace` CLI tool.
//!
//! ## Getting Started
//!
//! ```bash
//! perf script -F+period -D > perf_output.txt
//! perf-trace convert --input perf_output.txt --output perf_output_enhanced.csv --summary
//! ```
//!
//! As a library:
//!
//! ```
//! use perf_trace_studio::parser::parse_str;
//!
//! let records = parse_str("100 0xAB [0x10]: sample\nperiod: 4\n");
//! assert_eq!(records[0].period, Some(4));
//! assert_eq!(records[0].address_numeric, Some(0xAB));
//! ```

pub mod aggregator;
pub mod commands;
pub mod output;
pub mod parser;
pub mod tail;
pub mod utils;
