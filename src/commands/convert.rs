//! Convert command implementation.
//!
//! The convert command:
//! 1. Parses a complete perf script dump
//! 2. Writes the records as CSV
//! 3. Optionally writes a JSON copy
//! 4. Optionally prints summary statistics

use super::models::ConvertArgs;
use crate::aggregator::summarize;
use crate::output::{write_records_csv, write_records_json};
use crate::parser::{parse_file, EventRecord};
use anyhow::{Context, Result};
use log::{debug, info};
use std::path::Path;
use std::time::Instant;

/// Execute the convert command
///
/// **Public** - main entry point called from main.rs
///
/// # Returns
/// The parsed records, in input order
///
/// # Errors
/// * Input file missing or unreadable
/// * Output file write errors
pub fn execute_convert(args: &ConvertArgs) -> Result<Vec<EventRecord>> {
    let start_time = Instant::now();

    info!("Step 1/3: Parsing {}...", args.input.display());
    let records = parse_file(&args.input)
        .with_context(|| format!("Failed to parse {}", args.input.display()))?;

    let headerless = records.iter().filter(|r| !r.has_header()).count();
    if headerless > 0 {
        debug!("{} record(s) had an unrecognised header line", headerless);
    }

    info!("Step 2/3: Writing CSV...");
    write_records_csv(&records, &args.output_csv).context("Failed to write records CSV")?;
    info!("✓ Records written to: {}", args.output_csv.display());

    if let Some(json_path) = &args.output_json {
        info!("Step 3/3: Writing JSON...");
        write_records_json(&records, json_path).context("Failed to write records JSON")?;
        info!("✓ JSON written to: {}", json_path.display());
    } else {
        info!("Step 3/3: Skipping JSON output (not requested)");
    }

    let summary = summarize(&records);
    info!("{}", summary.summary());

    if args.print_summary {
        println!("\n{}", "=".repeat(80));
        println!("DATA PROCESSING SUMMARY");
        println!("{}", "=".repeat(80));
        print!("{}", summary.report());
        println!("{}", "=".repeat(80));
    }

    let elapsed = start_time.elapsed();
    info!(
        "Converted {} records in {:.2}s",
        records.len(),
        elapsed.as_secs_f64()
    );

    Ok(records)
}

/// Validate convert arguments
///
/// **Public** - can be called before execute_convert for early validation
pub fn validate_convert_args(args: &ConvertArgs) -> Result<()> {
    validate_paths(&args.input, &args.output_csv)?;

    if let Some(json_path) = &args.output_json {
        if json_path.as_os_str().is_empty() {
            anyhow::bail!("JSON output path cannot be empty");
        }
        if json_path == &args.output_csv {
            anyhow::bail!("JSON and CSV outputs must be different files");
        }
    }

    Ok(())
}

/// Shared input/output path checks for convert and follow
pub(crate) fn validate_paths(input: &Path, output: &Path) -> Result<()> {
    if input.as_os_str().is_empty() {
        anyhow::bail!("Input path cannot be empty");
    }

    if output.as_os_str().is_empty() {
        anyhow::bail!("Output path cannot be empty");
    }

    if input == output {
        anyhow::bail!("Output path must differ from the input path");
    }

    Ok(())
}
