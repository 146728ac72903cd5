use crate::utils::config::{DEFAULT_INPUT_PATH, DEFAULT_OUTPUT_PATH, DEFAULT_POLL_INTERVAL};
use std::path::PathBuf;
use std::time::Duration;

/// Arguments for the convert command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone)]
pub struct ConvertArgs {
    /// perf script text dump to read
    pub input: PathBuf,

    /// Output path for the records CSV
    pub output_csv: PathBuf,

    /// Output path for a JSON copy of the records (optional)
    pub output_json: Option<PathBuf>,

    /// Print text summary to stdout
    pub print_summary: bool,
}

impl Default for ConvertArgs {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_INPUT_PATH),
            output_csv: PathBuf::from(DEFAULT_OUTPUT_PATH),
            output_json: None,
            print_summary: false,
        }
    }
}

/// Arguments for the follow command
#[derive(Debug, Clone)]
pub struct FollowArgs {
    /// Growing perf script dump to follow
    pub input: PathBuf,

    /// CSV file that receives appended rows
    pub output_csv: PathBuf,

    /// Delay between polls
    pub interval: Duration,

    /// Stop after this many polls (None = until Ctrl+C)
    pub max_cycles: Option<u64>,
}

impl Default for FollowArgs {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_INPUT_PATH),
            output_csv: PathBuf::from(DEFAULT_OUTPUT_PATH),
            interval: DEFAULT_POLL_INTERVAL,
            max_cycles: None,
        }
    }
}
