//! Perf Trace Studio CLI
//!
//! Converts `perf script` text dumps into structured event records.
//! Works on finished files or follows a dump while perf is still writing it.

use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::Env;
use std::path::PathBuf;
use std::time::Duration;

use perf_trace_studio::commands::{
    display_schema, display_version, execute_convert, execute_follow, validate_convert_args,
    validate_follow_args, validate_records_file, ConvertArgs, FollowArgs,
};
use perf_trace_studio::utils::config::{
    DEFAULT_INPUT_PATH, DEFAULT_OUTPUT_PATH, INPUT_ENV_VAR, OUTPUT_ENV_VAR,
};

/// Perf Trace Studio - structured records from perf script output
#[derive(Parser, Debug)]
#[command(name = "perf-trace")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Convert a complete perf script dump to CSV
    Convert {
        /// perf script text output
        #[arg(short, long, env = INPUT_ENV_VAR, default_value = DEFAULT_INPUT_PATH)]
        input: PathBuf,

        /// Output path for the records CSV
        #[arg(short, long, env = OUTPUT_ENV_VAR, default_value = DEFAULT_OUTPUT_PATH)]
        output: PathBuf,

        /// Also write the records as a JSON array
        #[arg(long)]
        json: Option<PathBuf>,

        /// Print text summary to stdout
        #[arg(long)]
        summary: bool,
    },

    /// Follow a growing perf script dump and append records to CSV
    Follow {
        /// perf script text output being written
        #[arg(short, long, env = INPUT_ENV_VAR, default_value = DEFAULT_INPUT_PATH)]
        input: PathBuf,

        /// CSV file to append rows to
        #[arg(short, long, env = OUTPUT_ENV_VAR, default_value = DEFAULT_OUTPUT_PATH)]
        output: PathBuf,

        /// Poll interval in milliseconds
        #[arg(long, default_value = "1000")]
        interval_ms: u64,

        /// Stop after this many polls instead of waiting for Ctrl+C
        #[arg(long)]
        cycles: Option<u64>,
    },

    /// Validate a records CSV file
    Validate {
        /// Path to records CSV
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Display schema information
    Schema {
        /// Show full schema details
        #[arg(long)]
        show: bool,
    },

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    // Execute command
    match cli.command {
        Commands::Convert {
            input,
            output,
            json,
            summary,
        } => {
            let args = ConvertArgs {
                input,
                output_csv: output,
                output_json: json,
                print_summary: summary,
            };

            validate_convert_args(&args)?;
            execute_convert(&args)?;
        }

        Commands::Follow {
            input,
            output,
            interval_ms,
            cycles,
        } => {
            let args = FollowArgs {
                input,
                output_csv: output,
                interval: Duration::from_millis(interval_ms),
                max_cycles: cycles,
            };

            validate_follow_args(&args)?;
            execute_follow(&args)?;
        }

        Commands::Validate { file } => {
            validate_records_file(&file)?;
        }

        Commands::Schema { show } => {
            display_schema(show);
        }

        Commands::Version => {
            display_version();
        }
    }

    Ok(())
}
