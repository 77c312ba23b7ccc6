// Import Runner - fetch a dump, load it into the standby and archive it
use crate::application::archive::archive_import;
use crate::application::constants::{
    DEFAULT_COPY_BINARY, DEFAULT_IMPORT_BINARY, DEFAULT_SCP_BINARY, ZIP_EXTENSION,
};
use crate::application::dump::RunOutcome;
use crate::application::retry::{run_with_retry, RetryPolicy};
use crate::application::sentinel::read_sentinel;
use crate::domain::RunLogEntry;
use crate::error::{AppError, Result};
use crate::port::{ArchiveExtractor, CommandRunner, CommandSpec, RunLog, Sleeper, TimeProvider};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info};

/// Where the dump is fetched from
///
/// Empty `host` and `user` mean `path` is on the local filesystem.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteSource {
    pub host: String,
    pub user: String,
    pub path: String,
}

impl RemoteSource {
    pub fn is_local(&self) -> bool {
        self.host.is_empty() && self.user.is_empty()
    }

    /// Final path component of the source
    pub fn file_name(&self) -> Result<&str> {
        Path::new(&self.path)
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| AppError::Config(format!("Remote path {} names no file", self.path)))
    }
}

/// External binaries the import shells out to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportBinaries {
    pub mysql: String,
    pub scp: String,
    pub copy: String,
}

impl Default for ImportBinaries {
    fn default() -> Self {
        Self {
            mysql: DEFAULT_IMPORT_BINARY.to_string(),
            scp: DEFAULT_SCP_BINARY.to_string(),
            copy: DEFAULT_COPY_BINARY.to_string(),
        }
    }
}

/// One import invocation
#[derive(Debug, Clone)]
pub struct ImportJob {
    pub source: RemoteSource,
    pub work_dir: PathBuf,
    pub archive_dir: PathBuf,
    pub options_file: PathBuf,
    /// strftime layout for archived file names (rendered in UTC)
    pub archive_format: String,
    pub sentinel: PathBuf,
    pub retry: RetryPolicy,
    pub binaries: ImportBinaries,
}

impl ImportJob {
    /// `cp <path> <work_dir>` or `scp -o PasswordAuthentication=no <user>@<host>:<path> <work_dir>`
    pub fn fetch_command(&self) -> CommandSpec {
        let work_dir = self.work_dir.display().to_string();

        if self.source.is_local() {
            CommandSpec::new(&self.binaries.copy)
                .arg(&self.source.path)
                .arg(work_dir)
        } else {
            CommandSpec::new(&self.binaries.scp)
                .arg("-o")
                .arg("PasswordAuthentication=no")
                .arg(format!(
                    "{}@{}:{}",
                    self.source.user, self.source.host, self.source.path
                ))
                .arg(work_dir)
        }
    }

    pub fn import_command(&self, local: &Path) -> CommandSpec {
        CommandSpec::new(&self.binaries.mysql)
            .arg(format!(
                "--defaults-extra-file={}",
                self.options_file.display()
            ))
            .arg(format!("-e SOURCE {}", local.display()))
    }

    /// Where the fetch leaves the file
    pub fn fetched_path(&self) -> Result<PathBuf> {
        Ok(self.work_dir.join(self.source.file_name()?))
    }
}

fn is_zip(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e == ZIP_EXTENSION)
}

pub struct ImportRunner {
    runner: Arc<dyn CommandRunner>,
    extractor: Arc<dyn ArchiveExtractor>,
    run_log: Arc<dyn RunLog>,
    sleeper: Arc<dyn Sleeper>,
    time_provider: Arc<dyn TimeProvider>,
}

impl ImportRunner {
    pub fn new(
        runner: Arc<dyn CommandRunner>,
        extractor: Arc<dyn ArchiveExtractor>,
        run_log: Arc<dyn RunLog>,
        sleeper: Arc<dyn Sleeper>,
        time_provider: Arc<dyn TimeProvider>,
    ) -> Self {
        Self {
            runner,
            extractor,
            run_log,
            sleeper,
            time_provider,
        }
    }

    /// Run fetch, import and archive; record the outcome in the run log
    ///
    /// The caller is expected to have restricted the process umask, since the
    /// fetched dump holds personal data.
    pub async fn run(&self, job: &ImportJob) -> Result<RunOutcome> {
        if let Some(reason) = read_sentinel(&job.sentinel).await? {
            let message = format!(
                "{} exists. No import attempted. File contents - {}",
                job.sentinel.display(),
                reason
            );
            self.run_log
                .append(&RunLogEntry::error(self.time_provider.now(), message))
                .await?;
            return Ok(RunOutcome::Aborted(reason));
        }

        match self.fetch_import_archive(job).await {
            Ok(archived) => {
                self.run_log
                    .append(&RunLogEntry::success(self.time_provider.now()))
                    .await?;
                info!(archived = %archived.display(), "Import completed");
                Ok(RunOutcome::Completed)
            }
            Err(e) => {
                error!(error = %e, "Import failed");
                self.run_log
                    .append(&RunLogEntry::error(self.time_provider.now(), e.to_string()))
                    .await?;
                Err(e)
            }
        }
    }

    async fn fetch_import_archive(&self, job: &ImportJob) -> Result<PathBuf> {
        let local = self.fetch(job).await?;
        self.import(job, &local).await?;
        archive_import(
            &local,
            &job.archive_dir,
            &job.archive_format,
            self.time_provider.now(),
        )
        .await
    }

    /// Copy the source into the work dir, inflating it if it is a zip
    async fn fetch(&self, job: &ImportJob) -> Result<PathBuf> {
        let command = job.fetch_command();
        debug!("fetching: {}", command.display());
        self.runner.run(&command).await?;

        let fetched = job.fetched_path()?;
        if !is_zip(&fetched) {
            return Ok(fetched);
        }

        debug!("inflating {}", fetched.display());
        self.extractor.extract_single(&fetched, &job.work_dir).await
    }

    async fn import(&self, job: &ImportJob, local: &Path) -> Result<()> {
        let command = job.import_command(local);
        debug!("importing: {}", command.display());

        let output = run_with_retry(&job.retry, self.sleeper.as_ref(), |_| {
            self.runner.run(&command)
        })
        .await?;

        debug!(duration_ms = output.duration_ms, "import command finished");
        Ok(())
    }
}
