//! Decides where one sample record ends and the next begins.
//!
//! `perf script` prints each sample as a header line (timestamp, address,
//! bracketed size, event) followed by indented detail lines. A header is
//! recognised by its leading `<decimal|.> 0x...` or bare `0x...` token;
//! everything else continues the record in progress.

use regex::Regex;
use std::sync::OnceLock;

/// Classification of one trimmed input line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// Line opens a new record
    RecordStart,
    /// Line belongs to the record currently being built
    Continuation,
}

fn record_start_re() -> &'static Regex {
    static RECORD_START_RE: OnceLock<Regex> = OnceLock::new();
    RECORD_START_RE.get_or_init(|| {
        Regex::new(r"^(?:(?:\d+|\.)\s+0x|0x)").expect("valid record start regex")
    })
}

/// Classify a single trimmed line
///
/// **Public** - used by the assembler for every incoming line
///
/// Blank and comment lines must be filtered out beforehand with
/// [`is_skippable`]; this function does not look at them specially.
pub fn classify_line(line: &str) -> LineKind {
    if record_start_re().is_match(line) {
        LineKind::RecordStart
    } else {
        LineKind::Continuation
    }
}

/// Blank lines and `#` comments never reach the classifier
pub fn is_skippable(line: &str) -> bool {
    line.is_empty() || line.starts_with('#')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decimal_timestamp_header_starts_record() {
        assert_eq!(
            classify_line("100 0xAB [0x10]: sample"),
            LineKind::RecordStart
        );
    }

    #[test]
    fn test_placeholder_timestamp_starts_record() {
        assert_eq!(classify_line(". 0xff [0x1]: x"), LineKind::RecordStart);
    }

    #[test]
    fn test_bare_address_starts_record() {
        assert_eq!(classify_line("0x7fff0000 garbage"), LineKind::RecordStart);
    }

    #[test]
    fn test_detail_lines_are_continuations() {
        for line in [
            "thread: 5/10",
            "dso: /usr/lib/libc.so.6",
            "period: 4000",
            "... raw event: size 48 bytes",
            ". 0000:  09 00 00 00 01 00 30 00",
            "100 sample without address",
            "100\t0",
        ] {
            assert_eq!(classify_line(line), LineKind::Continuation, "{line}");
        }
    }

    #[test]
    fn test_timestamp_needs_whitespace_before_address() {
        assert_eq!(classify_line("1000x10"), LineKind::Continuation);
        assert_eq!(classify_line("100\t0x10 [0x1]: x"), LineKind::RecordStart);
    }

    #[test]
    fn test_is_skippable() {
        assert!(is_skippable(""));
        assert!(is_skippable("# ========"));
        assert!(!is_skippable("period: 1"));
    }
}
