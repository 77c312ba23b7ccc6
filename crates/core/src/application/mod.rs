// Application Layer - Use Cases and Business Logic

pub mod archive;
pub mod constants;
pub mod dump;
pub mod import;
pub mod panic_guard;
pub mod recency;
pub mod retry;
pub mod sentinel;

// Re-exports
pub use dump::{DumpJob, DumpRunner, RunOutcome};
pub use import::{ImportBinaries, ImportJob, ImportRunner, RemoteSource};
pub use recency::{CheckError, CheckReport, RecencyChecker};
pub use retry::{run_with_retry, RetryDecision, RetryPolicy};
