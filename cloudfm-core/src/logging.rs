//! src/logging.rs
//! ============================================================================
//! # Logger: structured JSON logs to a rolling file
//!
//! The terminal belongs to the UI, so every `tracing` event goes to a
//! non-blocking rolling file appender as one JSON object per line. `RUST_LOG`
//! overrides the configured level.

use std::path::PathBuf;

use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use tracing_appender::{
    non_blocking::WorkerGuard,
    rolling::{RollingFileAppender, Rotation},
};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    pub log_dir: PathBuf,
    pub log_file_prefix: CompactString,
    pub log_level: CompactString,
    pub max_log_files: usize,
    pub rotation: LogRotation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogRotation {
    Never,
    Hourly,
    Daily,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            log_dir: PathBuf::from("./logs"),
            log_file_prefix: CompactString::const_new("cloudfm"),
            log_level: CompactString::const_new("info"),
            max_log_files: 10,
            rotation: LogRotation::Daily,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("Logger already initialized")]
    AlreadyInitialized,

    #[error("Failed to create log directory: {0}")]
    DirectoryCreationFailed(#[from] std::io::Error),

    #[error("Failed to create log appender: {0}")]
    Appender(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

pub struct Logger;

impl Logger {
    /// Install the global subscriber. Keep the returned guard alive for the
    /// lifetime of the program; dropping it flushes and stops the writer.
    pub fn init(config: &LoggerConfig) -> Result<WorkerGuard, LoggingError> {
        validate_config(config)?;
        std::fs::create_dir_all(&config.log_dir)?;

        let rotation = match config.rotation {
            LogRotation::Never => Rotation::NEVER,
            LogRotation::Hourly => Rotation::HOURLY,
            LogRotation::Daily => Rotation::DAILY,
        };

        let file_appender = RollingFileAppender::builder()
            .rotation(rotation)
            .filename_prefix(config.log_file_prefix.as_str())
            .filename_suffix("jsonl")
            .max_log_files(config.max_log_files)
            .build(&config.log_dir)
            .map_err(|e| LoggingError::Appender(e.to_string()))?;

        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(config.log_level.as_str()))
            .map_err(|e| LoggingError::ConfigError(e.to_string()))?;

        let json_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_target(true)
            .with_current_span(true);

        tracing_subscriber::registry()
            .with(filter)
            .with(json_layer)
            .try_init()
            .map_err(|_| LoggingError::AlreadyInitialized)?;

        tracing::info!(
            marker = "LOGGER_READY",
            log_dir = %config.log_dir.display(),
            level = %config.log_level,
            "Logging initialized"
        );

        Ok(guard)
    }
}

fn validate_config(config: &LoggerConfig) -> Result<(), LoggingError> {
    if !LEVELS.contains(&config.log_level.to_lowercase().as_str()) {
        return Err(LoggingError::ConfigError(format!(
            "unknown log level '{}'",
            config.log_level
        )));
    }

    if config.max_log_files == 0 {
        return Err(LoggingError::ConfigError(
            "max_log_files must be at least 1".to_string(),
        ));
    }

    if config.log_file_prefix.is_empty() {
        return Err(LoggingError::ConfigError(
            "log_file_prefix must not be empty".to_string(),
        ));
    }

    Ok(())
}
