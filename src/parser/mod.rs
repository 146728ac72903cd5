//! Parsing of `perf script` text output into event records.
//!
//! This module handles:
//! - Classifying lines as record starts or continuations
//! - Assembling lines into one block per sample
//! - Extracting optional field families from each block
//! - Materializing typed records with derived fields

pub mod assembler;
pub mod classifier;
pub mod extractor;
pub mod materializer;
pub mod perf_script;
pub mod schema;

// Re-export main types
pub use assembler::{AssemblerState, RecordAssembler, RecordBlock};
pub use classifier::{classify_line, is_skippable, LineKind};
pub use extractor::{extract_fields, ExtractedFields};
pub use materializer::materialize;
pub use perf_script::{parse_block, parse_file, parse_reader, parse_str, LossyLines, RecordStream};
pub use schema::EventRecord;
