//! Configuration and constants for the CLI.

use std::time::Duration;

/// Current CSV/JSON record schema version
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Default perf script dump to read when no input is given
pub const DEFAULT_INPUT_PATH: &str = "perf_output.txt";

/// Default destination for the converted records
pub const DEFAULT_OUTPUT_PATH: &str = "perf_output_enhanced.csv";

/// Environment variables that override the input/output paths
pub const INPUT_ENV_VAR: &str = "PERF_TRACE_INPUT";
pub const OUTPUT_ENV_VAR: &str = "PERF_TRACE_OUTPUT";

/// How often the follower re-checks the input file
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

// Longest accepted poll interval (one hour)
pub const MAX_POLL_INTERVAL_MS: u64 = 3_600_000;

/// Upper bound on bytes the follower reads in one poll (8 MiB)
pub const MAX_POLL_READ_BYTES: u64 = 8 * 1024 * 1024;

/// Column header of the persisted CSV, in record schema order
pub const CSV_COLUMNS: &[&str] = &[
    "timestamp",
    "address",
    "event_type",
    "event_size",
    "thread_id",
    "process_id",
    "dso",
    "period",
    "ip_address",
    "raw_data",
    "timestamp_readable",
    "address_numeric",
];
