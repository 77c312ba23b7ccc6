// Dump Runner - fetch a fresh dump from the primary and rotate the previous one
use crate::application::archive::rotate_generation;
use crate::application::constants::DEFAULT_DUMP_BINARY;
use crate::application::sentinel::read_sentinel;
use crate::domain::RunLogEntry;
use crate::error::Result;
use crate::port::{CommandRunner, CommandSpec, RunLog, TimeProvider};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, info};

/// How a run ended when it did not fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every step ran and the success record was appended
    Completed,
    /// A sentinel file suppressed the run; carries its contents
    Aborted(String),
}

/// One dump invocation
#[derive(Debug, Clone)]
pub struct DumpJob {
    /// Client options file handed to the dump binary
    pub options_file: PathBuf,
    pub database: String,
    /// Where the dump binary writes its output
    pub result_file: PathBuf,
    /// Current generation; the previous one lives at `<dump_file>_old`
    pub dump_file: PathBuf,
    pub sentinel: PathBuf,
    pub binary: String,
}

impl DumpJob {
    pub fn new(
        options_file: impl Into<PathBuf>,
        database: impl Into<String>,
        result_file: impl Into<PathBuf>,
        dump_file: impl Into<PathBuf>,
        sentinel: impl Into<PathBuf>,
    ) -> Self {
        Self {
            options_file: options_file.into(),
            database: database.into(),
            result_file: result_file.into(),
            dump_file: dump_file.into(),
            sentinel: sentinel.into(),
            binary: DEFAULT_DUMP_BINARY.to_string(),
        }
    }

    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }

    pub fn command(&self) -> CommandSpec {
        CommandSpec::new(&self.binary)
            .arg(format!(
                "--defaults-extra-file={}",
                self.options_file.display()
            ))
            .arg(&self.database)
    }
}

pub struct DumpRunner {
    runner: Arc<dyn CommandRunner>,
    run_log: Arc<dyn RunLog>,
    time_provider: Arc<dyn TimeProvider>,
}

impl DumpRunner {
    pub fn new(
        runner: Arc<dyn CommandRunner>,
        run_log: Arc<dyn RunLog>,
        time_provider: Arc<dyn TimeProvider>,
    ) -> Self {
        Self {
            runner,
            run_log,
            time_provider,
        }
    }

    /// Run the dump and record the outcome in the run log
    ///
    /// Failures are appended as an ERROR entry and then returned.
    pub async fn run(&self, job: &DumpJob) -> Result<RunOutcome> {
        if let Some(reason) = read_sentinel(&job.sentinel).await? {
            let message = format!(
                "{} exists. No fetch attempted. File contents - {}",
                job.sentinel.display(),
                reason
            );
            self.run_log
                .append(&RunLogEntry::error(self.time_provider.now(), &message))
                .await?;
            return Ok(RunOutcome::Aborted(reason));
        }

        match self.dump_and_rotate(job).await {
            Ok(()) => {
                self.run_log
                    .append(&RunLogEntry::success(self.time_provider.now()))
                    .await?;
                info!(database = %job.database, "Dump completed");
                Ok(RunOutcome::Completed)
            }
            Err(e) => {
                error!(database = %job.database, error = %e, "Dump failed");
                self.run_log
                    .append(&RunLogEntry::error(self.time_provider.now(), e.to_string()))
                    .await?;
                Err(e)
            }
        }
    }

    async fn dump_and_rotate(&self, job: &DumpJob) -> Result<()> {
        let command = job.command();
        debug!("running {}", command.display());

        let output = self.runner.run(&command).await?;
        debug!(duration_ms = output.duration_ms, "dump command finished");

        rotate_generation(&job.result_file, &job.dump_file).await
    }
}
