//! Error types for the entire application.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.
//!
//! The record parser itself has no error type: malformed input degrades to
//! null fields. Only the collaborators around it (line sources, the file
//! follower, writers) can fail.

use thiserror::Error;

/// Errors that can occur while pulling lines from an input source
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Failed to read input: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur while following a growing file
#[derive(Error, Debug)]
pub enum FollowError {
    #[error("Input file not found: {0}")]
    Missing(String),

    #[error("IO error while following input: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur during file output
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to write file: {0}")]
    WriteFailed(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to serialize JSON: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    #[error("Invalid output path: {0}")]
    InvalidPath(String),

    #[error("Unexpected CSV columns: {0}")]
    SchemaMismatch(String),
}
