//! Timestamp parsing and formatting.
//!
//! Accepts `HH:MM:SS`, `MM:SS` and `SS` tokens in a comma-separated list.
//! Components are not range-checked individually (`1:75` is 135 seconds);
//! only the total is compared against the media duration.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Whole seconds from the start of the media.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(pub u64);

impl Timestamp {
    pub fn seconds(self) -> u64 {
        self.0
    }

    /// `HH:MM:SS`, hours unbounded.
    pub fn format_hms(self) -> String {
        let s = self.0;
        format!("{:02}:{:02}:{:02}", s / 3600, (s % 3600) / 60, s % 60)
    }

    /// Render a fractional duration (as reported by a probe) as `HH:MM:SS`.
    pub fn hms_from_secs_f64(duration: f64) -> String {
        Timestamp(duration.max(0.0).floor() as u64).format_hms()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format_hms())
    }
}

/// Parse a single trimmed token. Returns `None` for any shape other than
/// one to three non-negative integer components separated by `:`.
pub fn parse_timestamp(token: &str) -> Option<Timestamp> {
    let parts = token
        .split(':')
        .map(|p| p.trim().parse::<u64>().ok())
        .collect::<Option<Vec<_>>>()?;

    let (h, m, s) = match parts.as_slice() {
        [h, m, s] => (*h, *m, *s),
        [m, s] => (0, *m, *s),
        [s] => (0, 0, *s),
        _ => return None,
    };

    h.checked_mul(3600)
        .and_then(|h| m.checked_mul(60).and_then(|m| h.checked_add(m)))
        .and_then(|hm| hm.checked_add(s))
        .map(Timestamp)
}

/// A user-supplied entry that parsed and fits within the media.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimestampEntry {
    /// Trimmed text as the user typed it.
    pub text: String,
    pub timestamp: Timestamp,
}

/// A user-supplied entry that was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidEntry {
    Malformed(String),
    ExceedsDuration(String),
}

impl fmt::Display for InvalidEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed(text) => f.write_str(text),
            Self::ExceedsDuration(text) => write!(f, "{text} (exceeds duration)"),
        }
    }
}

/// Result of interpreting one line of free text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedTimestamps {
    /// Valid entries in input order, duplicates (by value) removed.
    pub valid: Vec<TimestampEntry>,
    pub invalid: Vec<InvalidEntry>,
}

impl ParsedTimestamps {
    /// Unique valid timestamps in ascending order, as the extractor wants them.
    pub fn sorted_unique(&self) -> Vec<Timestamp> {
        let mut out: Vec<Timestamp> = self.valid.iter().map(|e| e.timestamp).collect();
        out.sort_unstable();
        out.dedup();
        out
    }
}

/// Split a reply on ASCII or full-width commas and classify each entry.
///
/// An entry is valid only when its total is strictly below `duration`.
/// Blank entries (e.g. from a trailing comma) are skipped.
pub fn parse_timestamp_list(raw: &str, duration: f64) -> ParsedTimestamps {
    let normalized = raw.replace('，', ",");
    let mut parsed = ParsedTimestamps::default();

    for entry in normalized.split(',').map(str::trim) {
        if entry.is_empty() {
            continue;
        }
        match parse_timestamp(entry) {
            None => parsed.invalid.push(InvalidEntry::Malformed(entry.to_string())),
            Some(ts) if ts.0 as f64 >= duration => {
                parsed.invalid.push(InvalidEntry::ExceedsDuration(entry.to_string()))
            }
            Some(ts) => {
                if !parsed.valid.iter().any(|e| e.timestamp == ts) {
                    parsed.valid.push(TimestampEntry {
                        text: entry.to_string(),
                        timestamp: ts,
                    });
                }
            }
        }
    }

    parsed
}
