pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod logging;
pub mod output;

use cli::{Cli, OutputFormat};
use config::AppConfig;
use error::{AppError, AppResult, CommandError};
use infrastructure::PolicyManager;

/// Run a parsed command line against the system policy store.
///
/// Prints the command output on success. Errors are returned to the caller,
/// which decides how to report them and which exit code to use.
pub async fn run(cli: &Cli, config: &AppConfig) -> AppResult<()> {
    let domain = config.resolve_domain(cli.command.domain());
    let manager = PolicyManager::new(domain.as_deref());

    tracing::info!(scope = %manager.scope(), command = ?cli.command, "Running command");

    let output = commands::execute(&cli.command, &manager).await?;
    println!("{}", output);
    Ok(())
}

/// Render an error for the operator, as JSON when JSON output was requested
pub fn format_error(err: AppError, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => {
            let message = err.to_string();
            serde_json::to_string_pretty(&CommandError::from(err))
                .unwrap_or_else(|_| format!("Error: {}", message))
        }
        _ => format!("Error: {}", err),
    }
}
