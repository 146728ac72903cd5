//! Incremental reader for a file that is still being written.
//!
//! Remembers the byte offset reached by the previous poll and only hands
//! out lines appended since. A line is released once its `\n` has been
//! written; a partial trailing line waits in `pending` until a later poll
//! completes it, so every line is delivered exactly once.

use crate::parser::perf_script::decode_line;
use crate::utils::config::MAX_POLL_READ_BYTES;
use crate::utils::error::FollowError;
use log::{debug, warn};
use std::fs::File;
use std::io::{ErrorKind, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

/// Lines handed out by one [`FileFollower::poll`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PollBatch {
    /// Complete lines, in file order, without terminators
    pub lines: Vec<String>,
    /// The file shrank and was re-read from its first byte. Lines seen
    /// before this batch belong to the previous file contents.
    pub restarted: bool,
}

/// Tail-follow state for one input file
#[derive(Debug)]
pub struct FileFollower {
    path: PathBuf,
    offset: u64,
    pending: Vec<u8>,
    read_limit: u64,
}

impl FileFollower {
    /// Follow `path` from its first byte
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::starting_at(path, 0)
    }

    /// Follow `path` from a known byte offset (e.g. resuming a previous run)
    pub fn starting_at(path: impl Into<PathBuf>, offset: u64) -> Self {
        Self {
            path: path.into(),
            offset,
            pending: Vec::new(),
            read_limit: MAX_POLL_READ_BYTES,
        }
    }

    /// Cap the bytes read by a single poll; the rest waits for the next one
    pub fn with_read_limit(mut self, bytes: u64) -> Self {
        self.read_limit = bytes.max(1);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Bytes consumed so far, including any buffered partial line
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Read whatever was appended since the last poll
    ///
    /// **Public** - called once per polling cycle
    ///
    /// At most `read_limit` bytes are read per call, so a large existing
    /// dump is consumed over several polls.
    ///
    /// # Errors
    /// * `FollowError::Missing` - the file does not exist
    /// * `FollowError::Io` - any other read failure
    pub fn poll(&mut self) -> Result<PollBatch, FollowError> {
        let mut file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(FollowError::Missing(self.path.display().to_string()));
            }
            Err(e) => return Err(FollowError::Io(e)),
        };

        let len = file.metadata()?.len();
        let restarted = len < self.offset;
        if restarted {
            warn!(
                "{} shrank from {} to {} bytes, restarting from the beginning",
                self.path.display(),
                self.offset,
                len
            );
            self.offset = 0;
            self.pending.clear();
        }
        if len == self.offset {
            return Ok(PollBatch {
                lines: Vec::new(),
                restarted,
            });
        }

        file.seek(SeekFrom::Start(self.offset))?;
        let read = file
            .take(self.read_limit)
            .read_to_end(&mut self.pending)?;
        self.offset += read as u64;

        let lines = self.drain_complete_lines();
        debug!(
            "Read {} bytes, {} complete line(s), offset now {}",
            read,
            lines.len(),
            self.offset
        );

        Ok(PollBatch { lines, restarted })
    }

    /// Hand out the unterminated tail, if any (used at shutdown)
    pub fn take_pending(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            return None;
        }
        let rest = std::mem::take(&mut self.pending);
        Some(decode_line(&rest))
    }

    fn drain_complete_lines(&mut self) -> Vec<String> {
        let Some(last_newline) = self.pending.iter().rposition(|&b| b == b'\n') else {
            return Vec::new();
        };

        let rest = self.pending.split_off(last_newline + 1);
        let complete = std::mem::replace(&mut self.pending, rest);

        complete[..complete.len() - 1]
            .split(|&b| b == b'\n')
            .map(decode_line)
            .collect()
    }
}
