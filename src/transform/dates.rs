//! Sale date parsing

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Formats tried, in order, after RFC 3339
pub const DEFAULT_DATE_FORMATS: [&str; 11] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%m-%d-%Y",
    "%d %B %Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%Y.%m.%d",
];

/// Parses loosely formatted date text into a naive date-time
///
/// Offsets in RFC 3339 input are converted to UTC. Date-only formats map to
/// midnight.
#[derive(Debug, Clone)]
pub struct DateParser {
    formats: Vec<String>,
}

impl Default for DateParser {
    fn default() -> Self {
        Self::new(DEFAULT_DATE_FORMATS.iter().map(|f| f.to_string()).collect())
    }
}

impl DateParser {
    pub fn new(formats: Vec<String>) -> Self {
        Self { formats }
    }

    /// Parse one value, returning None if no format matches
    pub fn parse(&self, text: &str) -> Option<NaiveDateTime> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
            return Some(dt.naive_utc());
        }

        self.formats.iter().find_map(|format| {
            NaiveDateTime::parse_from_str(text, format)
                .ok()
                .or_else(|| {
                    NaiveDate::parse_from_str(text, format)
                        .ok()
                        .and_then(|d| d.and_hms_opt(0, 0, 0))
                })
        })
    }
}
