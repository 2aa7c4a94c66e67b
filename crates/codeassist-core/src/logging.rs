//! Diagnostic logging setup.
//!
//! The TUI owns stdout/stderr, so log records go to a file under
//! `$CODEASSIST_HOME/logs/` through a non-blocking appender.

use std::path::Path;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::config::{Config, paths};

/// Environment variable that overrides the configured log filter.
pub const LOG_ENV_VAR: &str = "CODEASSIST_LOG";

/// Log file name inside the logs directory.
pub const LOG_FILE_NAME: &str = "codeassist.log";

/// Installs the global tracing subscriber writing to the default logs directory.
///
/// The returned guard flushes buffered records on drop and must be held
/// for the lifetime of the program.
///
/// # Errors
/// Returns an error if the logs directory cannot be created or a global
/// subscriber is already installed.
pub fn init(config: &Config) -> Result<WorkerGuard> {
    init_in(&paths::logs_dir(), config)
}

/// Installs the global tracing subscriber writing into `dir`.
///
/// # Errors
/// Returns an error if `dir` cannot be created or a global subscriber is
/// already installed.
pub fn init_in(dir: &Path, config: &Config) -> Result<WorkerGuard> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create log directory {}", dir.display()))?;

    let appender = tracing_appender::rolling::never(dir, LOG_FILE_NAME);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::fmt()
        .with_env_filter(build_filter(std::env::var(LOG_ENV_VAR).ok(), config))
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install tracing subscriber: {e}"))?;

    Ok(guard)
}

/// Builds the filter: `CODEASSIST_LOG` wins, then config `log_level`, then `info`.
fn build_filter(env_value: Option<String>, config: &Config) -> EnvFilter {
    let directive = env_value
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| config.log_level.clone());

    EnvFilter::try_new(directive.trim()).unwrap_or_else(|_| EnvFilter::new("info"))
}
