//! CLI command implementations.
//!
//! Each command is implemented in its own module.
//! Commands orchestrate the various library components to perform user tasks.

pub mod convert;
pub mod follow;
pub mod models;
pub mod utils;

// Re-export main command functions
pub use convert::{execute_convert, validate_convert_args};
pub use follow::{execute_follow, run_follow, validate_follow_args, FollowSession};
pub use models::{ConvertArgs, FollowArgs};
pub use utils::{display_schema, display_version, validate_records_file};
