//! Logging infrastructure for gpo-manager
//!
//! Logs go to `gpo-manager.log` in the configured log directory and, at a
//! lower level of detail, to stderr. The library only emits `tracing`
//! events; with no subscriber installed they cost nothing and print nothing.

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::{AppConfig, DEFAULT_LOG_FILTER};

/// Base name of the log file
pub const LOG_FILE_PREFIX: &str = "gpo-manager";

/// Initialize logging.
///
/// Returns a guard that must be kept alive for the duration of the program
/// to ensure all logs are flushed to disk. `None` when the log file could
/// not be created; stderr logging still works in that case.
pub fn init_logging(verbose: bool, config: &AppConfig) -> Option<WorkerGuard> {
    let stderr_level = if verbose { "debug" } else { "warn" };
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(EnvFilter::new(stderr_level));

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(LOG_FILE_PREFIX)
        .filename_suffix("log")
        .build(&config.log_dir);

    match file_appender {
        Ok(appender) => {
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);

            let file_filter = EnvFilter::try_new(&config.log_filter)
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

            tracing_subscriber::registry()
                .with(stderr_layer)
                .with(
                    fmt::layer()
                        .with_writer(non_blocking)
                        .with_ansi(false)
                        .with_target(true)
                        .with_thread_ids(true)
                        .with_file(true)
                        .with_line_number(true)
                        .with_filter(file_filter),
                )
                .init();

            Some(guard)
        }
        Err(e) => {
            tracing_subscriber::registry().with(stderr_layer).init();
            tracing::warn!(
                error = %e,
                log_dir = %config.log_dir.display(),
                "Cannot create log file, logging to stderr only"
            );
            None
        }
    }
}
