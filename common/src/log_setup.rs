//! Console and rolling-file logging for command-line tools.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use thiserror::Error;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{Builder, Rotation};
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Rolled log files kept per application.
pub const MAX_LOG_FILES: usize = 5;

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

#[derive(Debug, Clone)]
pub struct LogOptions<'a> {
    /// Filter used when `RUST_LOG` is unset, e.g. `info` or `chanmerge=debug`.
    pub base_level: &'a str,
    /// Prefix of the rolled file names.
    pub app_name: &'a str,
    pub log_dir: &'a Path,
}

#[derive(Debug, Error)]
pub enum LogSetupError {
    #[error("Invalid log filter '{filter}': {reason}")]
    Filter { filter: String, reason: String },

    #[error("Cannot create log directory '{path}': {source}")]
    Directory { path: PathBuf, source: io::Error },

    #[error("Cannot open log file in '{path}': {reason}")]
    Appender { path: PathBuf, reason: String },

    #[error("Logging is already initialized")]
    AlreadyInitialized,
}

/// Installs a console layer (stdout, warnings also on stderr) and a daily
/// rolled file layer in `options.log_dir`.
///
/// `RUST_LOG` takes precedence over `options.base_level`. Can succeed only
/// once per process.
pub fn setup_logging(options: &LogOptions<'_>) -> Result<(), LogSetupError> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(options.base_level).map_err(|e| LogSetupError::Filter {
            filter: options.base_level.to_string(),
            reason: e.to_string(),
        })?,
    };

    std::fs::create_dir_all(options.log_dir).map_err(|source| LogSetupError::Directory {
        path: options.log_dir.to_path_buf(),
        source,
    })?;

    let file_appender = Builder::new()
        .rotation(Rotation::DAILY)
        .filename_prefix(options.app_name)
        .filename_suffix("log")
        .max_log_files(MAX_LOG_FILES)
        .build(options.log_dir)
        .map_err(|e| LogSetupError::Appender {
            path: options.log_dir.to_path_buf(),
            reason: e.to_string(),
        })?;

    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);
    LOG_GUARD
        .set(guard)
        .map_err(|_| LogSetupError::AlreadyInitialized)?;

    let console_writer = io::stdout.and(io::stderr.with_min_level(Level::WARN));

    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_ansi(true)
        .with_writer(console_writer);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_ansi(false)
        .with_writer(file_writer);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|_| LogSetupError::AlreadyInitialized)
}
