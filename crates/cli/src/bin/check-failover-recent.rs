//! check-failover-recent - monitoring probe for the failover run log
//!
//! Exit codes follow the monitoring convention: 0 OK, 1 WARNING, 2 CRITICAL,
//! 3 UNKNOWN. Anything that goes wrong before a check can run is UNKNOWN.

use clap::error::ErrorKind;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use dbfailover_cli::init_tracing;
use dbfailover_core::application::constants::DEFAULT_GRACE_PERIOD;
use dbfailover_core::application::{CheckReport, RecencyChecker};
use dbfailover_core::domain::{CheckStatus, DEFAULT_SUCCESS_MARKER};
use dbfailover_core::port::time_provider::SystemTimeProvider;

const DEFAULT_GRACE_MINUTES: u64 = DEFAULT_GRACE_PERIOD.as_secs() / 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "check-failover-recent")]
#[command(about = "Check the failover run log for a recent success", long_about = None)]
#[command(version)]
struct Args {
    /// Run log written by failover-dump / failover-import
    log_file: PathBuf,

    /// Maximum age of the last success, in minutes
    #[arg(long, default_value_t = DEFAULT_GRACE_MINUTES)]
    grace_minutes: u64,

    /// Text identifying a success line
    #[arg(long, default_value = DEFAULT_SUCCESS_MARKER)]
    marker: String,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

fn unknown(message: impl std::fmt::Display) -> ExitCode {
    println!("{}", message);
    ExitCode::from(CheckStatus::Unknown.exit_code())
}

fn print_report(report: &CheckReport, format: OutputFormat) {
    match format {
        OutputFormat::Text => {
            for message in &report.messages {
                println!("{}", message);
            }
        }
        OutputFormat::Json => match serde_json::to_string(report) {
            Ok(json) => println!("{}", json),
            Err(e) => println!("An unexpected error occurred: {}", e),
        },
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            print!("{}", e);
            return ExitCode::SUCCESS;
        }
        Err(e) if e.kind() == ErrorKind::MissingRequiredArgument => {
            return unknown("No file path provided as the first argument");
        }
        Err(e) => return unknown(e.render()),
    };

    init_tracing("warn", "compact");

    let grace_period = match args.grace_minutes.checked_mul(60) {
        Some(secs) => Duration::from_secs(secs),
        None => return unknown(format!("--grace-minutes {} is too large", args.grace_minutes)),
    };

    let checker = match RecencyChecker::new(grace_period, args.marker, Arc::new(SystemTimeProvider)) {
        Ok(checker) => checker,
        Err(e) => return unknown(e),
    };

    let report = checker.check(&args.log_file).await;
    print_report(&report, args.format);

    ExitCode::from(report.status.exit_code())
}
