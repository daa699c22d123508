use clap::Parser;
use std::process::ExitCode;

use gpo_manager::cli::Cli;
use gpo_manager::config::AppConfig;
use gpo_manager::{format_error, logging, run};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = AppConfig::from_env();

    // Keep the guard alive so buffered log lines are flushed on exit
    let _guard = logging::init_logging(cli.verbose, &config);

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "gpo-manager starting");

    match run(&cli, &config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(code = e.error_code(), retryable = e.is_retryable(), error = %e, "Command failed");
            eprintln!("{}", format_error(e, cli.command.format()));
            ExitCode::FAILURE
        }
    }
}
