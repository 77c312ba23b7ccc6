// Adapter wiring (DI) for the runner binaries
use anyhow::{Context, Result};
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info, warn};

use dbfailover_core::application::{DumpRunner, ImportRunner, RunOutcome};
use dbfailover_core::domain::RunLogEntry;
use dbfailover_core::port::sleeper::TokioSleeper;
use dbfailover_core::port::time_provider::SystemTimeProvider;
use dbfailover_core::port::{RunLog, TimeProvider};
use dbfailover_core::AppError;
use dbfailover_infra_system::{
    check_options_file_permissions, restrict_umask, FileRunLog, StdoutRunLog, SubprocessRunner,
    ZipExtractor,
};

use crate::config::{DumpConfig, ImportConfig, LogsConfig};
use crate::logging::init_tracing;

/// Run log destination from `[logs]`
pub fn build_run_log(logs: &LogsConfig) -> Result<Arc<dyn RunLog>> {
    let date_format = logs.date_format.clone();
    let run_log: Arc<dyn RunLog> = match logs.run_log_path() {
        Some(path) => Arc::new(FileRunLog::new(path, date_format).context("Invalid [logs] dateFormat")?),
        None => Arc::new(StdoutRunLog::new(date_format).context("Invalid [logs] dateFormat")?),
    };
    Ok(run_log)
}

/// Startup failures after the run log exists still belong in it
async fn record_failure(run_log: &dyn RunLog, err: &AppError) {
    let entry = RunLogEntry::error(SystemTimeProvider.now(), err.to_string());
    if let Err(e) = run_log.append(&entry).await {
        warn!(error = %e, "Failed to append to run log");
    }
}

fn outcome_exit_code(outcome: dbfailover_core::Result<RunOutcome>) -> ExitCode {
    match outcome {
        Ok(RunOutcome::Completed) => ExitCode::SUCCESS,
        Ok(RunOutcome::Aborted(reason)) => {
            warn!(reason = %reason, "Run suppressed by sentinel");
            ExitCode::FAILURE
        }
        // Already recorded in the run log by the runner
        Err(_) => ExitCode::FAILURE,
    }
}

/// Load, validate and run `failover-dump`
pub async fn run_dump(config_path: &Path) -> Result<ExitCode> {
    let config = DumpConfig::load(config_path)
        .with_context(|| format!("Failed to load {}", config_path.display()))?;
    init_tracing(&config.logs.level, &config.logs.format);

    info!("failover-dump v{} starting...", dbfailover_core::VERSION);

    let run_log = build_run_log(&config.logs)?;
    if let Err(e) = check_options_file_permissions(config_path) {
        record_failure(run_log.as_ref(), &e).await;
        return Err(anyhow::Error::new(e).context("Dump terminated"));
    }

    let time_provider: Arc<dyn TimeProvider> = Arc::new(SystemTimeProvider);
    let runner = DumpRunner::new(
        Arc::new(SubprocessRunner::new(time_provider.clone())),
        run_log,
        time_provider,
    );

    Ok(outcome_exit_code(runner.run(&config.to_job(config_path)).await))
}

/// Load, validate and run `failover-import`
pub async fn run_import(config_path: &Path) -> Result<ExitCode> {
    let config = ImportConfig::load(config_path)
        .with_context(|| format!("Failed to load {}", config_path.display()))?;
    init_tracing(&config.logs.level, &config.logs.format);

    info!("failover-import v{} starting...", dbfailover_core::VERSION);

    let run_log = build_run_log(&config.logs)?;
    let job = config.to_job(config_path);
    if let Err(e) = check_options_file_permissions(&job.options_file) {
        record_failure(run_log.as_ref(), &e).await;
        return Err(anyhow::Error::new(e).context("Import terminated"));
    }

    // The fetched dump carries personal data
    restrict_umask();

    let time_provider: Arc<dyn TimeProvider> = Arc::new(SystemTimeProvider);
    let runner = ImportRunner::new(
        Arc::new(SubprocessRunner::new(time_provider.clone())),
        Arc::new(ZipExtractor::new()),
        run_log,
        Arc::new(TokioSleeper),
        time_provider,
    );

    Ok(outcome_exit_code(runner.run(&job).await))
}

/// Report a startup failure and map it to exit code 1
pub fn startup_failure(err: anyhow::Error) -> ExitCode {
    error!(error = ?err, "Startup failed");
    eprintln!("Error: {:#}", err);
    ExitCode::FAILURE
}
