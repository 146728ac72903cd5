use crate::aggregator::summarize;
use crate::output::read_records;
use crate::utils::config::{CSV_COLUMNS, SCHEMA_VERSION};
use anyhow::{Context, Result};
use std::path::Path;

/// Validate a records CSV file
pub fn validate_records_file(file_path: &Path) -> Result<()> {
    println!("Validating records: {}", file_path.display());

    let records = read_records(file_path)
        .with_context(|| format!("{} is not a valid records CSV", file_path.display()))?;
    let summary = summarize(&records);

    println!("✓ Valid records CSV");
    println!("  Columns: {}", CSV_COLUMNS.len());
    println!("  Rows: {}", records.len());
    println!("  Event types: {}", summary.unique_event_types());
    println!(
        "  Rows without header fields: {}",
        records.iter().filter(|r| !r.has_header()).count()
    );

    Ok(())
}

/// Display schema information
pub fn display_schema(show_details: bool) {
    println!("Perf Trace Studio Record Schema");
    println!("Current Version: {}", SCHEMA_VERSION);
    println!();

    if show_details {
        println!("CSV Columns (empty cell = not present):");
        println!("  timestamp: integer        - Sample time in nanoseconds");
        println!("  address: string           - Header address, hex (e.g. '0x7fff1000')");
        println!("  event_type: string        - Free-form tail of the header line");
        println!("  event_size: string        - Bracketed record size, hex");
        println!("  thread_id: string         - From 'thread: T/P'");
        println!("  process_id: string        - From 'thread: T/P'");
        println!("  dso: string               - Shared object path");
        println!("  period: integer           - Sample period");
        println!("  ip_address: string        - Instruction pointer, hex");
        println!("  raw_data: string          - Raw dump lines, newline-joined");
        println!("  timestamp_readable: string - ISO 8601 time derived from timestamp");
        println!("  address_numeric: integer  - address parsed as base-16");
    } else {
        println!("Columns: {}", CSV_COLUMNS.join(","));
        println!("Use --show for detailed schema information");
    }
}

/// Display version information
pub fn display_version() {
    println!("Perf Trace Studio v{}", env!("CARGO_PKG_VERSION"));
    println!("Record Schema: v{}", SCHEMA_VERSION);
    println!();
    println!("Turns perf script sample dumps into structured event records.");
}
