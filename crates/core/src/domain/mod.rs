// Domain Layer - Pure business logic and entities

pub mod error;
pub mod run_log_entry;
pub mod status;
pub mod success;

// Re-exports
pub use error::DomainError;
pub use run_log_entry::{validate_date_format, LogLevel, RunLogEntry, DEFAULT_DATE_FORMAT};
pub use status::CheckStatus;
pub use success::{
    find_last_success, leading_token, parse_timestamp, SuccessLine, Timestamp,
    DEFAULT_SUCCESS_MARKER, TIMESTAMP_FORMAT,
};
