//! Pulls the raw field strings out of one record block.
//!
//! Each field family has its own matcher and is searched for independently
//! across the whole block, because different perf versions and option sets
//! omit or reorder the detail lines. A miss is a `None`, never an error.

use super::assembler::RecordBlock;
use log::debug;
use regex::Regex;
use std::sync::OnceLock;

/// Raw, unconverted field strings found in a block
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedFields {
    pub timestamp_raw: Option<String>,
    pub address_raw: Option<String>,
    pub event_size_raw: Option<String>,
    pub event_type_raw: Option<String>,
    pub thread_id_raw: Option<String>,
    pub process_id_raw: Option<String>,
    pub dso_raw: Option<String>,
    pub period_raw: Option<String>,
    pub ip_address_raw: Option<String>,
    pub raw_data_raw: Option<String>,
}

fn header_re() -> &'static Regex {
    static HEADER_RE: OnceLock<Regex> = OnceLock::new();
    HEADER_RE.get_or_init(|| {
        Regex::new(r"^(\d+|\.)\s+(0x[0-9a-fA-F]+)\s+\[(0x[0-9a-fA-F]+)\]:\s*(.*)")
            .expect("valid header regex")
    })
}

fn thread_re() -> &'static Regex {
    static THREAD_RE: OnceLock<Regex> = OnceLock::new();
    THREAD_RE.get_or_init(|| Regex::new(r"thread:\s*(\d+)/(\d+)").expect("valid thread regex"))
}

fn dso_re() -> &'static Regex {
    static DSO_RE: OnceLock<Regex> = OnceLock::new();
    // Value stays on the `dso:` line
    DSO_RE.get_or_init(|| Regex::new(r"dso:[ \t]*([^\n]+)").expect("valid dso regex"))
}

fn period_re() -> &'static Regex {
    static PERIOD_RE: OnceLock<Regex> = OnceLock::new();
    PERIOD_RE.get_or_init(|| Regex::new(r"period:\s*(\d+)").expect("valid period regex"))
}

fn ip_re() -> &'static Regex {
    static IP_RE: OnceLock<Regex> = OnceLock::new();
    IP_RE.get_or_init(|| Regex::new(r"IP.*?:\s*(0x[0-9a-fA-F]+)").expect("valid ip regex"))
}

/// Extract every field family from a block
///
/// **Public** - main entry point for field extraction
///
/// The header triple is only looked for on the first line. All other
/// fields are searched in the newline-joined block text, so their order
/// within the block does not matter.
pub fn extract_fields(block: &RecordBlock) -> ExtractedFields {
    let mut fields = ExtractedFields::default();

    let Some(header) = block.header() else {
        return fields;
    };

    extract_header(header, &mut fields);

    let text = block.joined();

    if let Some(caps) = thread_re().captures(&text) {
        fields.thread_id_raw = Some(caps[1].to_string());
        fields.process_id_raw = Some(caps[2].to_string());
    }

    fields.dso_raw = capture_first(dso_re(), &text);
    fields.period_raw = capture_first(period_re(), &text);
    fields.ip_address_raw = capture_first(ip_re(), &text);
    fields.raw_data_raw = collect_raw_dump(block);

    fields
}

/// Match the `<ts> <addr> [<size>]: <event>` header
///
/// **Private** - a non-matching header leaves all four fields as `None`
fn extract_header(header: &str, fields: &mut ExtractedFields) {
    let Some(caps) = header_re().captures(header) else {
        debug!("Header did not match expected layout: {}", header);
        return;
    };

    fields.timestamp_raw = Some(caps[1].to_string());
    fields.address_raw = Some(caps[2].to_string());
    fields.event_size_raw = Some(caps[3].to_string());
    fields.event_type_raw = Some(caps[4].trim_end().to_string());
}

fn capture_first(re: &Regex, text: &str) -> Option<String> {
    re.captures(text).map(|caps| caps[1].to_string())
}

/// Lines of the raw sample dump, in block order
///
/// **Private** - `raw event:` banners plus every line starting with `.`
fn collect_raw_dump(block: &RecordBlock) -> Option<String> {
    let dump: Vec<&str> = block
        .lines()
        .iter()
        .map(|line| line.trim())
        .filter(|line| line.contains("raw event:") || line.starts_with('.'))
        .collect();

    if dump.is_empty() {
        None
    } else {
        Some(dump.join("\n"))
    }
}
