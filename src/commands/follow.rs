//! Follow command implementation.
//!
//! Tails a perf script dump that is still being written and appends each
//! record to the CSV as soon as the next record start closes it. The last
//! record is only written at shutdown, when no more detail lines can come.

use super::convert::validate_paths;
use super::models::FollowArgs;
use crate::output::CsvRecordWriter;
use crate::parser::{parse_block, RecordAssembler};
use crate::tail::FileFollower;
use crate::utils::config::MAX_POLL_INTERVAL_MS;
use crate::utils::error::FollowError;
use anyhow::{Context, Result};
use log::{debug, info};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

// Granularity of the Ctrl+C check while sleeping
const STOP_CHECK_SLICE: Duration = Duration::from_millis(100);

/// Follower, assembler and CSV appender for one live input
pub struct FollowSession {
    follower: FileFollower,
    assembler: RecordAssembler,
    writer: CsvRecordWriter,
}

impl FollowSession {
    /// Start following `input` from its beginning, appending to `output`
    pub fn open(input: &Path, output: &Path) -> Result<Self> {
        let writer = CsvRecordWriter::append(output)
            .with_context(|| format!("Failed to open {} for appending", output.display()))?;

        Ok(Self {
            follower: FileFollower::new(input),
            assembler: RecordAssembler::new(),
            writer,
        })
    }

    /// Run one polling cycle
    ///
    /// # Returns
    /// Number of records appended during this cycle
    ///
    /// A missing input file is not an error here: perf may not have
    /// created it yet.
    pub fn cycle(&mut self) -> Result<usize> {
        let batch = match self.follower.poll() {
            Ok(batch) => batch,
            Err(FollowError::Missing(path)) => {
                debug!("Waiting for {} to appear", path);
                return Ok(0);
            }
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("Failed to read {}", self.follower.path().display())
                })
            }
        };

        let mut persisted = 0;

        // A rewritten file starts new blocks; close the one left over
        if batch.restarted {
            if let Some(block) = self.assembler.finish() {
                self.writer.write_record(&parse_block(block))?;
                persisted += 1;
            }
        }

        for line in &batch.lines {
            if let Some(block) = self.assembler.feed(line) {
                self.writer.write_record(&parse_block(block))?;
                persisted += 1;
            }
        }

        if persisted > 0 {
            self.writer.flush()?;
            info!("Added {} new rows to {}", persisted, self.writer.path().display());
        }

        Ok(persisted)
    }

    /// Flush the unterminated tail and the last open record
    ///
    /// # Returns
    /// Number of records appended during shutdown (0 or 1)
    pub fn shutdown(mut self) -> Result<usize> {
        let mut persisted = 0;

        if let Some(line) = self.follower.take_pending() {
            if let Some(block) = self.assembler.feed(&line) {
                self.writer.write_record(&parse_block(block))?;
                persisted += 1;
            }
        }
        if let Some(block) = self.assembler.finish() {
            self.writer.write_record(&parse_block(block))?;
            persisted += 1;
        }

        self.writer.flush()?;
        if self.assembler.dropped_orphans() > 0 {
            info!(
                "Dropped {} detail line(s) that preceded the first record",
                self.assembler.dropped_orphans()
            );
        }
        info!(
            "Follow stopped after {} bytes, {} rows written",
            self.follower.offset(),
            self.writer.rows_written()
        );

        Ok(persisted)
    }

    pub fn rows_written(&self) -> u64 {
        self.writer.rows_written()
    }
}

/// Execute the follow command until Ctrl+C (or `max_cycles`)
///
/// **Public** - main entry point called from main.rs
pub fn execute_follow(args: &FollowArgs) -> Result<u64> {
    let stop = Arc::new(AtomicBool::new(false));
    let handler_stop = Arc::clone(&stop);
    ctrlc::set_handler(move || handler_stop.store(true, Ordering::Relaxed))
        .context("Failed to install Ctrl+C handler")?;

    info!(
        "Monitoring {} for updates... Press Ctrl+C to stop.",
        args.input.display()
    );
    run_follow(args, &stop)
}

/// Polling loop behind [`execute_follow`]
///
/// **Public** - callers that manage their own stop flag use this directly
///
/// # Returns
/// Total rows appended
pub fn run_follow(args: &FollowArgs, stop: &AtomicBool) -> Result<u64> {
    let mut session = FollowSession::open(&args.input, &args.output_csv)?;
    let mut cycles: u64 = 0;

    while !stop.load(Ordering::Relaxed) {
        session.cycle()?;
        cycles += 1;

        if args.max_cycles.is_some_and(|max| cycles >= max) {
            break;
        }
        sleep_unless_stopped(args.interval, stop);
    }

    debug!("Leaving follow loop after {} cycle(s)", cycles);
    let before_shutdown = session.rows_written();
    let tail = session.shutdown()?;

    Ok(before_shutdown + tail as u64)
}

fn sleep_unless_stopped(interval: Duration, stop: &AtomicBool) {
    let deadline = Instant::now() + interval;
    while !stop.load(Ordering::Relaxed) {
        let now = Instant::now();
        if now >= deadline {
            break;
        }
        std::thread::sleep(STOP_CHECK_SLICE.min(deadline - now));
    }
}

/// Validate follow arguments
pub fn validate_follow_args(args: &FollowArgs) -> Result<()> {
    validate_paths(&args.input, &args.output_csv)?;

    if args.interval.is_zero() {
        anyhow::bail!("Poll interval must be greater than 0");
    }

    if args.interval.as_millis() > u128::from(MAX_POLL_INTERVAL_MS) {
        anyhow::bail!("Poll interval is too large (max {} ms)", MAX_POLL_INTERVAL_MS);
    }

    if args.max_cycles == Some(0) {
        anyhow::bail!("cycles must be greater than 0");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::read_records;
    use std::fs::OpenOptions;
    use std::io::Write;
    use std::path::PathBuf;

    fn append(path: &Path, text: &str) {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .unwrap();
        file.write_all(text.as_bytes()).unwrap();
    }

    #[test]
    fn test_session_emits_closed_records_only() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("perf.txt");
        let output = dir.path().join("out.csv");
        append(&input, "100 0x1 [0x1]: a\nperiod: 1\n");

        let mut session = FollowSession::open(&input, &output).unwrap();
        assert_eq!(session.cycle().unwrap(), 0);

        append(&input, "dso: libc.so\n200 0x2 [0x1]: b\nperi");
        assert_eq!(session.cycle().unwrap(), 1);

        append(&input, "od: 7\n");
        assert_eq!(session.cycle().unwrap(), 0);
        assert_eq!(session.shutdown().unwrap(), 1);

        let records = read_records(&output).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].period, Some(1));
        assert_eq!(records[0].dso.as_deref(), Some("libc.so"));
        assert_eq!(records[1].timestamp, Some(200));
        assert_eq!(records[1].period, Some(7));
    }

    #[test]
    fn test_shutdown_feeds_unterminated_line() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("perf.txt");
        let output = dir.path().join("out.csv");
        append(&input, "100 0x1 [0x1]: a\n200 0x2 [0x1]: b");

        let mut session = FollowSession::open(&input, &output).unwrap();
        assert_eq!(session.cycle().unwrap(), 0);
        assert_eq!(session.shutdown().unwrap(), 2);

        assert_eq!(read_records(&output).unwrap().len(), 2);
    }

    #[test]
    fn test_rewritten_input_does_not_extend_open_record() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("perf.txt");
        let output = dir.path().join("out.csv");
        append(&input, "100 0x1 [0x1]: old\nperiod: 1\nthread: 1/1\n");

        let mut session = FollowSession::open(&input, &output).unwrap();
        assert_eq!(session.cycle().unwrap(), 0);

        std::fs::write(&input, "dso: /NEW.so\n").unwrap();
        append(&input, "200 0x2 [0x1]: new\n");
        assert_eq!(session.cycle().unwrap(), 1);
        assert_eq!(session.shutdown().unwrap(), 1);

        let records = read_records(&output).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].timestamp, Some(100));
        assert_eq!(records[0].period, Some(1));
        assert_eq!(records[0].dso, None);
        assert_eq!(records[1].timestamp, Some(200));
        assert_eq!(records[1].dso, None);
    }

    #[test]
    fn test_open_rejects_foreign_table() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.csv");
        std::fs::write(&output, "Timestamp,Address,Event\n").unwrap();

        assert!(FollowSession::open(&dir.path().join("perf.txt"), &output).is_err());
        assert_eq!(
            std::fs::read_to_string(&output).unwrap(),
            "Timestamp,Address,Event\n"
        );
    }

    #[test]
    fn test_missing_input_waits() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("not-yet.txt");
        let mut session = FollowSession::open(&input, &dir.path().join("out.csv")).unwrap();

        assert_eq!(session.cycle().unwrap(), 0);

        append(&input, "100 0x1 [0x1]: a\n200 0x2 [0x1]: b\n");
        assert_eq!(session.cycle().unwrap(), 1);
    }

    #[test]
    fn test_run_follow_bounded_cycles() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("perf.txt");
        append(&input, "100 0x1 [0x1]: a\n200 0x2 [0x1]: b\n300 0x3 [0x1]: c\n");

        let args = FollowArgs {
            input,
            output_csv: dir.path().join("out.csv"),
            interval: Duration::from_millis(1),
            max_cycles: Some(2),
        };
        let stop = AtomicBool::new(false);

        assert_eq!(run_follow(&args, &stop).unwrap(), 3);
    }

    #[test]
    fn test_run_follow_stops_immediately_when_flagged() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("perf.txt");
        append(&input, "100 0x1 [0x1]: a\n");

        let args = FollowArgs {
            input,
            output_csv: dir.path().join("out.csv"),
            ..Default::default()
        };
        let stop = AtomicBool::new(true);

        // No cycle runs, so the input is never read
        assert_eq!(run_follow(&args, &stop).unwrap(), 0);
    }

    #[test]
    fn test_validate_follow_args() {
        assert!(validate_follow_args(&FollowArgs::default()).is_ok());

        let zero_interval = FollowArgs {
            interval: Duration::ZERO,
            ..Default::default()
        };
        assert!(validate_follow_args(&zero_interval).is_err());

        let huge_interval = FollowArgs {
            interval: Duration::from_secs(7200),
            ..Default::default()
        };
        assert!(validate_follow_args(&huge_interval).is_err());

        let zero_cycles = FollowArgs {
            max_cycles: Some(0),
            ..Default::default()
        };
        assert!(validate_follow_args(&zero_cycles).is_err());

        let same_paths = FollowArgs {
            input: PathBuf::from("a.txt"),
            output_csv: PathBuf::from("a.txt"),
            ..Default::default()
        };
        assert!(validate_follow_args(&same_paths).is_err());
    }
}
