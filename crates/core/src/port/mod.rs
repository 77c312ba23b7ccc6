// Port Layer - Interfaces for external dependencies

pub mod archive_extractor;
pub mod command_runner;
pub mod run_log;
pub mod sleeper;
pub mod time_provider; // For deterministic testing

// Re-exports
pub use archive_extractor::ArchiveExtractor;
pub use command_runner::{CommandOutput, CommandRunner, CommandSpec, ExecutionError};
pub use run_log::RunLog;
pub use sleeper::Sleeper;
pub use time_provider::TimeProvider;
