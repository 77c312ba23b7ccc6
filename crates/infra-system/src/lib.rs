// dbfailover Infrastructure - System Adapters
// Implements: CommandRunner, ArchiveExtractor, RunLog

pub mod permissions;
pub mod run_log_impl;
pub mod subprocess_runner;
pub mod zip_extractor;

pub use permissions::{check_options_file_permissions, restrict_umask};
pub use run_log_impl::{FileRunLog, StdoutRunLog};
pub use subprocess_runner::SubprocessRunner;
pub use zip_extractor::ZipExtractor;
