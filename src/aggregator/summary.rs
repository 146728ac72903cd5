//! Summary statistics over a parsed record collection.
//!
//! Counts events per type, distinct addresses and the covered time span.
//! Used for the text report printed after a conversion.

use crate::parser::schema::EventRecord;
use chrono::{DateTime, Utc};
use log::debug;
use std::collections::{HashMap, HashSet};

/// Aggregate view of a record collection
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventSummary {
    /// Number of records
    pub total_events: usize,

    /// Event types with their counts, most frequent first
    pub event_type_counts: Vec<(String, usize)>,

    /// Earliest and latest readable timestamps, if any record had one
    pub time_range: Option<(DateTime<Utc>, DateTime<Utc>)>,

    /// Number of distinct header addresses
    pub unique_addresses: usize,
}

/// Summarize a record collection
///
/// **Public** - main entry point for statistics
///
/// Records without an event type or address are counted in `total_events`
/// but do not contribute to the per-type or address counts.
pub fn summarize(records: &[EventRecord]) -> EventSummary {
    debug!("Summarizing {} records", records.len());

    let mut by_type: HashMap<&str, usize> = HashMap::new();
    let mut addresses: HashSet<&str> = HashSet::new();
    let mut time_range: Option<(DateTime<Utc>, DateTime<Utc>)> = None;

    for record in records {
        if let Some(event_type) = record.event_type.as_deref() {
            *by_type.entry(event_type).or_insert(0) += 1;
        }
        if let Some(address) = record.address.as_deref() {
            addresses.insert(address);
        }
        if let Some(ts) = record.timestamp_readable {
            time_range = Some(match time_range {
                Some((min, max)) => (min.min(ts), max.max(ts)),
                None => (ts, ts),
            });
        }
    }

    let mut event_type_counts: Vec<(String, usize)> = by_type
        .into_iter()
        .map(|(name, count)| (name.to_string(), count))
        .collect();
    event_type_counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    EventSummary {
        total_events: records.len(),
        event_type_counts,
        time_range,
        unique_addresses: addresses.len(),
    }
}

impl EventSummary {
    pub fn unique_event_types(&self) -> usize {
        self.event_type_counts.len()
    }

    /// Get human-readable one-line summary
    ///
    /// **Public** - for logging
    pub fn summary(&self) -> String {
        format!(
            "Events: {} | Event types: {} | Unique addresses: {}",
            self.total_events,
            self.unique_event_types(),
            self.unique_addresses
        )
    }

    /// Multi-line text report
    pub fn report(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("Total events processed: {}\n", self.total_events));
        out.push_str(&format!("Unique event types: {}\n", self.unique_event_types()));
        out.push_str("Event type distribution:\n");
        for (event_type, count) in &self.event_type_counts {
            out.push_str(&format!("  {}: {}\n", event_type, count));
        }
        match self.time_range {
            Some((start, end)) => {
                out.push_str(&format!("Time range: {} to {}\n", start, end));
            }
            None => out.push_str("Time range: n/a\n"),
        }
        out.push_str(&format!(
            "Number of unique addresses: {}\n",
            self.unique_addresses
        ));
        out
    }
}
