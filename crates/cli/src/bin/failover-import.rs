//! failover-import - fetch the latest dump and load it into the standby

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

use dbfailover_cli::config::DEFAULT_IMPORT_CONFIG;
use dbfailover_cli::wiring::{run_import, startup_failure};

#[derive(Parser, Debug)]
#[command(name = "failover-import")]
#[command(about = "Fetch and import the failover database dump", long_about = None)]
#[command(version)]
struct Args {
    #[arg(short, long, default_value = DEFAULT_IMPORT_CONFIG)]
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

    match run_import(&args.config).await {
        Ok(code) => code,
        Err(e) => startup_failure(e),
    }
}
