// Success line recognition in the run log

use super::error::{DomainError, Result};
use chrono::{DateTime, FixedOffset};

/// Offset-aware instant parsed from a log line
pub type Timestamp = DateTime<FixedOffset>;

/// Leading timestamp format of every run log line, e.g. `2023-01-01T11:41:01+0000`
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%z";

/// Marker written by the dump/import runners on success
pub const DEFAULT_SUCCESS_MARKER: &str = "completed ok";

/// The most recent line carrying the success marker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuccessLine<'a> {
    /// Zero-based index of the line within the log
    pub index: usize,
    pub line: &'a str,
}

impl<'a> SuccessLine<'a> {
    /// Parse the line's leading token as the success timestamp
    pub fn timestamp(&self) -> Result<Timestamp> {
        parse_timestamp(leading_token(self.line))
    }
}

/// Text up to the first space (the whole line if there is none)
pub fn leading_token(line: &str) -> &str {
    line.split(' ').next().unwrap_or(line)
}

/// Parse `YYYY-MM-DDTHH:MM:SS±HHMM`; naive timestamps are rejected
pub fn parse_timestamp(token: &str) -> Result<Timestamp> {
    DateTime::parse_from_str(token, TIMESTAMP_FORMAT)
        .map_err(|e| DomainError::InvalidTimestamp(format!("'{}': {}", token, e)))
}

/// Scan from the end of the log and return the first line containing `marker`
///
/// Earlier occurrences are never inspected.
pub fn find_last_success<'a>(contents: &'a str, marker: &str) -> Option<SuccessLine<'a>> {
    // Lines is not ExactSizeIterator, so index before reversing
    let lines: Vec<&'a str> = contents.lines().collect();
    lines
        .into_iter()
        .enumerate()
        .rev()
        .find(|(_, line)| line.contains(marker))
        .map(|(index, line)| SuccessLine { index, line })
}
