// Run log entries shared by the runners (producers) and the recency check (consumer)

use super::error::{DomainError, Result};
use super::success::{DEFAULT_SUCCESS_MARKER, TIMESTAMP_FORMAT};
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Utc};
use std::fmt::Write;

/// Default timestamp layout for run log lines (UTC, numeric offset)
pub const DEFAULT_DATE_FORMAT: &str = TIMESTAMP_FORMAT;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

/// One run log line: `<timestamp> <LEVEL>: <message>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunLogEntry {
    pub at: DateTime<Utc>,
    pub level: LogLevel,
    pub message: String,
}

impl RunLogEntry {
    pub fn new(at: DateTime<Utc>, level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            at,
            level,
            message: message.into(),
        }
    }

    /// The record the recency check looks for
    pub fn success(at: DateTime<Utc>) -> Self {
        Self::new(at, LogLevel::Info, DEFAULT_SUCCESS_MARKER)
    }

    pub fn error(at: DateTime<Utc>, message: impl Into<String>) -> Self {
        Self::new(at, LogLevel::Error, message)
    }

    /// Render without the trailing newline
    ///
    /// # Errors
    /// `DomainError::ValidationError` if `date_format` is not a valid strftime string
    pub fn render(&self, date_format: &str) -> Result<String> {
        let mut line = String::new();
        write!(
            line,
            "{} {}: {}",
            self.at.format(date_format),
            self.level,
            self.message
        )
        .map_err(|_| {
            DomainError::ValidationError(format!("Invalid date format: {}", date_format))
        })?;
        Ok(line)
    }
}

/// Reject strftime strings chrono cannot render
pub fn validate_date_format(date_format: &str) -> Result<()> {
    if StrftimeItems::new(date_format).any(|item| matches!(item, Item::Error)) {
        return Err(DomainError::ValidationError(format!(
            "Invalid date format: {}",
            date_format
        )));
    }
    Ok(())
}
