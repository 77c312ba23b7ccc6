//! failover-dump - dump the primary database and keep the previous generation

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

use dbfailover_cli::config::DEFAULT_DUMP_CONFIG;
use dbfailover_cli::wiring::{run_dump, startup_failure};

#[derive(Parser, Debug)]
#[command(name = "failover-dump")]
#[command(about = "Dump the primary database for failover", long_about = None)]
#[command(version)]
struct Args {
    /// INI configuration; also passed to the dump binary as its options file
    #[arg(short, long, default_value = DEFAULT_DUMP_CONFIG)]
    config: PathBuf,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    match run_dump(&args.config).await {
        Ok(code) => code,
        Err(e) => startup_failure(e),
    }
}
