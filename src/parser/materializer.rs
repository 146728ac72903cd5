//! Turns extracted field strings into a typed [`EventRecord`].
//!
//! Conversions never fail: a value that cannot be converted becomes
//! `None` and the rest of the record is kept.

use super::extractor::ExtractedFields;
use super::schema::EventRecord;
use chrono::{DateTime, Utc};
use log::debug;

/// Build the final record from extracted fields
///
/// **Public** - last stage of the per-block pipeline
pub fn materialize(fields: ExtractedFields) -> EventRecord {
    let timestamp = fields.timestamp_raw.as_deref().and_then(parse_timestamp);
    let address_numeric = fields.address_raw.as_deref().and_then(parse_hex_address);

    EventRecord {
        timestamp,
        address: fields.address_raw,
        event_type: fields.event_type_raw,
        event_size: fields.event_size_raw,
        thread_id: fields.thread_id_raw.and_then(numeric_string),
        process_id: fields.process_id_raw.and_then(numeric_string),
        dso: fields.dso_raw,
        period: fields.period_raw.as_deref().and_then(parse_decimal),
        ip_address: fields.ip_address_raw,
        raw_data: fields.raw_data_raw,
        timestamp_readable: timestamp.and_then(nanos_to_datetime),
        address_numeric,
    }
}

/// Parse a header timestamp; the `.` placeholder means "not recorded"
pub fn parse_timestamp(raw: &str) -> Option<u64> {
    if raw == "." {
        return None;
    }
    parse_decimal(raw)
}

/// Parse a `0x`-prefixed hexadecimal address
///
/// Returns `None` for anything that is not `0x` followed by one or more
/// hex digits, or that does not fit in 64 bits.
pub fn parse_hex_address(raw: &str) -> Option<u64> {
    let digits = raw.strip_prefix("0x")?;
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        debug!("Not a hex address: {}", raw);
        return None;
    }
    u64::from_str_radix(digits, 16)
        .map_err(|e| debug!("Hex address {} out of range: {}", raw, e))
        .ok()
}

/// Interpret nanoseconds since the Unix epoch as a UTC time
pub fn nanos_to_datetime(nanos: u64) -> Option<DateTime<Utc>> {
    i64::try_from(nanos).ok().map(DateTime::from_timestamp_nanos)
}

fn parse_decimal(raw: &str) -> Option<u64> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        debug!("Not a decimal number: {}", raw);
        return None;
    }
    raw.parse::<u64>()
        .map_err(|e| debug!("Decimal {} out of range: {}", raw, e))
        .ok()
}

// Thread/process ids stay textual but must be numeric
fn numeric_string(raw: String) -> Option<String> {
    parse_decimal(&raw).map(|_| raw)
}
