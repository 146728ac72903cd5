//! End-to-end parsing of `perf script` text output.
//!
//! Wires classifier, assembler, extractor and materializer together.
//! [`RecordStream`] is the lazy form (one record out as soon as its block
//! closes); [`parse_reader`] and [`parse_str`] collect everything eagerly.

use super::assembler::{RecordAssembler, RecordBlock};
use super::extractor::extract_fields;
use super::materializer::materialize;
use super::schema::EventRecord;
use crate::utils::error::ParseError;
use log::{debug, info};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// Parse one closed block into its record
///
/// **Public** - also used by the follow session
pub fn parse_block(block: RecordBlock) -> EventRecord {
    materialize(extract_fields(&block))
}

/// Lazy record iterator over a sequence of lines
///
/// Lines must arrive in file order. The trailing record is produced once
/// the underlying line iterator is exhausted.
///
/// Detail lines seen before the first record start are dropped and logged
/// one by one at `debug`. The stream does not report the total itself;
/// callers read [`RecordStream::dropped_orphans`] and log it at `info`, as
/// [`parse_reader`] does.
pub struct RecordStream<I> {
    lines: I,
    assembler: RecordAssembler,
    finished: bool,
}

impl<I> RecordStream<I> {
    pub fn new(lines: I) -> Self {
        Self {
            lines,
            assembler: RecordAssembler::new(),
            finished: false,
        }
    }

    /// Orphan continuation lines dropped so far
    pub fn dropped_orphans(&self) -> u64 {
        self.assembler.dropped_orphans()
    }
}

impl<I, S> Iterator for RecordStream<I>
where
    I: Iterator<Item = S>,
    S: AsRef<str>,
{
    type Item = EventRecord;

    fn next(&mut self) -> Option<EventRecord> {
        if self.finished {
            return None;
        }

        for line in self.lines.by_ref() {
            if let Some(block) = self.assembler.feed(line.as_ref()) {
                return Some(parse_block(block));
            }
        }

        self.finished = true;
        self.assembler.finish().map(parse_block)
    }
}

/// Parse a whole in-memory dump
pub fn parse_str(input: &str) -> Vec<EventRecord> {
    RecordStream::new(input.lines()).collect()
}

/// Parse everything readable from `reader`
///
/// **Public** - eager entry point used by the convert command
///
/// # Errors
/// * `ParseError::Io` - the reader failed; records parsed so far are discarded
pub fn parse_reader<R: BufRead>(reader: R) -> Result<Vec<EventRecord>, ParseError> {
    let mut assembler = RecordAssembler::new();
    let mut records = Vec::new();

    for line in LossyLines::new(reader) {
        if let Some(block) = assembler.feed(&line?) {
            records.push(parse_block(block));
        }
    }
    records.extend(assembler.finish().map(parse_block));

    if assembler.dropped_orphans() > 0 {
        info!(
            "Dropped {} detail line(s) that preceded the first record",
            assembler.dropped_orphans()
        );
    }
    debug!("Parsed {} records", records.len());

    Ok(records)
}

/// Open and parse a dump file
pub fn parse_file(path: impl AsRef<Path>) -> Result<Vec<EventRecord>, ParseError> {
    let path = path.as_ref();
    info!("Parsing perf script output: {}", path.display());

    let file = File::open(path)?;
    parse_reader(BufReader::new(file))
}

/// Line iterator that tolerates invalid UTF-8
///
/// `BufRead::lines` errors out on the first non-UTF-8 byte; perf dumps can
/// contain arbitrary bytes in symbol and DSO names, so decode lossily instead.
pub struct LossyLines<R> {
    reader: R,
    buf: Vec<u8>,
}

impl<R: BufRead> LossyLines<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::new(),
        }
    }
}

impl<R: BufRead> Iterator for LossyLines<R> {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        self.buf.clear();
        match self.reader.read_until(b'\n', &mut self.buf) {
            Ok(0) => None,
            Ok(_) => Some(Ok(decode_line(&self.buf))),
            Err(e) => Some(Err(e)),
        }
    }
}

/// Decode one raw line, dropping the `\n` / `\r\n` terminator
pub fn decode_line(raw: &[u8]) -> String {
    let raw = raw.strip_suffix(b"\n").unwrap_or(raw);
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    String::from_utf8_lossy(raw).into_owned()
}
