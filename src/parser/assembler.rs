//! Groups classified lines into one block per sample record.
//!
//! The assembler holds at most one block in flight. A record-start line
//! closes the current block and hands it out by value; the buffer is then
//! replaced with a fresh one, so the block being built and the block being
//! parsed never alias.

use super::classifier::{classify_line, is_skippable, LineKind};
use log::debug;

/// The raw lines believed to make up one sample record
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordBlock {
    lines: Vec<String>,
}

impl RecordBlock {
    /// Create a block from already-trimmed lines
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// First line of the block (the header, when the block is well-formed)
    pub fn header(&self) -> Option<&str> {
        self.lines.first().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// All lines joined with `\n`
    pub fn joined(&self) -> String {
        self.lines.join("\n")
    }

    fn push(&mut self, line: String) {
        self.lines.push(line);
    }
}

/// Where the assembler is in the input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssemblerState {
    /// No record start seen yet (or the previous block was just finished)
    AwaitingFirstRecord,
    /// A block is being accumulated
    InRecord,
}

/// Streaming record assembler
///
/// **Public** - fed one line at a time by the stream driver
#[derive(Debug, Default)]
pub struct RecordAssembler {
    buffer: RecordBlock,
    dropped_orphans: u64,
}

impl RecordAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one line of input
    ///
    /// The line is trimmed here. Returns the previous block when `line`
    /// opens a new record and a block was already buffered.
    ///
    /// A continuation line arriving before any record start has nowhere to
    /// go and is dropped; this is expected at the top of truncated dumps.
    pub fn feed(&mut self, line: &str) -> Option<RecordBlock> {
        let line = line.trim();
        if is_skippable(line) {
            return None;
        }

        match classify_line(line) {
            LineKind::RecordStart => {
                let fresh = RecordBlock::from_lines([line]);
                let previous = std::mem::replace(&mut self.buffer, fresh);
                if previous.is_empty() {
                    None
                } else {
                    Some(previous)
                }
            }
            LineKind::Continuation => {
                if self.buffer.is_empty() {
                    self.dropped_orphans += 1;
                    debug!("Dropping continuation line before first record: {}", line);
                } else {
                    self.buffer.push(line.to_string());
                }
                None
            }
        }
    }

    /// Close the trailing block at end of input
    pub fn finish(&mut self) -> Option<RecordBlock> {
        let last = std::mem::take(&mut self.buffer);
        if last.is_empty() {
            None
        } else {
            Some(last)
        }
    }

    pub fn state(&self) -> AssemblerState {
        if self.buffer.is_empty() {
            AssemblerState::AwaitingFirstRecord
        } else {
            AssemblerState::InRecord
        }
    }

    /// Number of orphan continuation lines discarded so far
    pub fn dropped_orphans(&self) -> u64 {
        self.dropped_orphans
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed_all(assembler: &mut RecordAssembler, input: &str) -> Vec<RecordBlock> {
        let mut blocks: Vec<RecordBlock> = input
            .lines()
            .filter_map(|line| assembler.feed(line))
            .collect();
        blocks.extend(assembler.finish());
        blocks
    }

    #[test]
    fn test_blocks_split_on_record_start() {
        let mut assembler = RecordAssembler::new();
        let blocks = feed_all(
            &mut assembler,
            "100 0xAB [0x10]: sample\n  thread: 5/10\n200 0xCD [0x20]: sample\n",
        );

        assert_eq!(blocks.len(), 2);
        assert_eq!(
            blocks[0].lines(),
            ["100 0xAB [0x10]: sample", "thread: 5/10"]
        );
        assert_eq!(blocks[1].lines(), ["200 0xCD [0x20]: sample"]);
    }

    #[test]
    fn test_state_transitions() {
        let mut assembler = RecordAssembler::new();
        assert_eq!(assembler.state(), AssemblerState::AwaitingFirstRecord);

        assert!(assembler.feed("100 0x1 [0x1]: a").is_none());
        assert_eq!(assembler.state(), AssemblerState::InRecord);

        assert!(assembler.feed("period: 1").is_none());
        assert_eq!(assembler.state(), AssemblerState::InRecord);

        let closed = assembler.feed("200 0x2 [0x1]: b").unwrap();
        assert_eq!(closed.len(), 2);
        assert_eq!(assembler.state(), AssemblerState::InRecord);

        let last = assembler.finish().unwrap();
        assert_eq!(last.header(), Some("200 0x2 [0x1]: b"));
        assert_eq!(assembler.state(), AssemblerState::AwaitingFirstRecord);
        assert!(assembler.finish().is_none());
    }

    #[test]
    fn test_orphan_continuation_dropped() {
        let mut assembler = RecordAssembler::new();
        let blocks = feed_all(&mut assembler, "period: 9\ndso: x\n100 0x1 [0x1]: a\n");

        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].lines(), ["100 0x1 [0x1]: a"]);
        assert_eq!(assembler.dropped_orphans(), 2);
    }

    #[test]
    fn test_comments_and_blank_lines_ignored() {
        let mut assembler = RecordAssembler::new();
        let blocks = feed_all(
            &mut assembler,
            "# captured on: today\n\n100 0x1 [0x1]: a\n   \n# mid comment\nperiod: 3\n",
        );

        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].lines(), ["100 0x1 [0x1]: a", "period: 3"]);
        assert_eq!(assembler.dropped_orphans(), 0);
    }

    #[test]
    fn test_empty_input_yields_nothing() {
        let mut assembler = RecordAssembler::new();
        assert!(feed_all(&mut assembler, "").is_empty());
    }
}
