//! Structured logging setup with console and file output.
//!
//! Provides:
//! - Daily rotating log files under the data directory
//! - Build-type conditional log levels
//! - Console-only fallback when file logging fails
//! - Environment variable override via QUERYDESK_LOG or RUST_LOG
//!
//! Console output goes to stderr so it never interleaves with rendered results.

use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::EnvFilter;

/// Environment variable consulted before `RUST_LOG`.
pub const LOG_ENV: &str = "QUERYDESK_LOG";

/// Logging configuration.
pub struct LogConfig {
    /// Directory for log files
    pub log_dir: PathBuf,
    /// Whether stderr is an interactive terminal
    pub is_tty: bool,
    /// Optional custom log filter
    pub log_filter: Option<String>,
}

impl LogConfig {
    /// Create a new logging configuration.
    pub fn new(log_dir: PathBuf) -> Self {
        Self { log_dir, is_tty: atty::is(atty::Stream::Stderr), log_filter: None }
    }

    /// Set custom log filter.
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.log_filter = Some(filter.into());
        self
    }
}

/// Guard that must be held for the lifetime of the application.
///
/// Dropping this guard flushes pending log entries.
pub struct LoggingGuard {
    _worker_guard: Option<WorkerGuard>,
}

/// Initialize logging with the given configuration.
///
/// If file logging initialization fails, falls back to console only.
pub fn init_logging(config: LogConfig) -> LoggingGuard {
    // Interactive sessions keep the terminal quiet and log to file only
    if config.is_tty {
        return match init_file_logging(&config, false) {
            Ok(guard) => LoggingGuard { _worker_guard: Some(guard) },
            Err(_) => init_stderr_logging(config.log_filter.as_deref()),
        };
    }

    match init_file_logging(&config, true) {
        Ok(guard) => LoggingGuard { _worker_guard: Some(guard) },
        Err(e) => {
            eprintln!("Warning: Failed to initialize file logging: {}. Using console only.", e);
            init_stderr_logging(config.log_filter.as_deref())
        }
    }
}

/// Initialize with defaults (convenience function).
pub fn init_logging_default() -> LoggingGuard {
    init_logging(LogConfig::new(log_dir()))
}

/// Initialize stderr-only logging.
fn init_stderr_logging(filter: Option<&str>) -> LoggingGuard {
    let env_filter = build_env_filter(filter);

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(env_filter)
        .with_ansi(true)
        .with_target(false)
        .with_thread_ids(false)
        .init();

    LoggingGuard { _worker_guard: None }
}

/// Initialize file logging, optionally mirrored to stderr.
fn init_file_logging(
    config: &LogConfig,
    mirror_to_stderr: bool,
) -> Result<WorkerGuard, Box<dyn std::error::Error>> {
    std::fs::create_dir_all(&config.log_dir)?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("querydesk")
        .filename_suffix("log")
        .build(&config.log_dir)?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = build_env_filter(config.log_filter.as_deref());

    if mirror_to_stderr {
        let stderr = std::io::stderr.with_max_level(tracing::Level::INFO);
        tracing_subscriber::fmt()
            .with_writer(stderr.and(non_blocking))
            .with_env_filter(env_filter)
            .with_ansi(false)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_writer(non_blocking)
            .with_env_filter(env_filter)
            .with_ansi(false)
            .with_target(true)
            .init();
    }

    Ok(guard)
}

/// Build the environment filter from config or defaults.
fn build_env_filter(custom_filter: Option<&str>) -> EnvFilter {
    // Priority: custom filter > QUERYDESK_LOG > RUST_LOG > default
    if let Some(filter) = custom_filter {
        return EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new(default_log_filter()));
    }

    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_env("RUST_LOG"))
        .unwrap_or_else(|_| EnvFilter::new(default_log_filter()))
}

/// Get the default log filter based on build type.
pub fn default_log_filter() -> &'static str {
    #[cfg(debug_assertions)]
    {
        "debug,querydesk=trace,querydesk_core=trace,hyper=warn,hyper_util=warn,reqwest=warn"
    }
    #[cfg(not(debug_assertions))]
    {
        "info,querydesk=info,querydesk_core=info,hyper=warn,hyper_util=warn,reqwest=warn"
    }
}

/// Get the default log directory.
pub fn log_dir() -> PathBuf {
    crate::config::default_data_dir().join("logs")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_filter_wins() {
        assert_eq!(build_env_filter(Some("warn")).to_string(), "warn");
    }

    #[test]
    fn default_filter_is_valid() {
        assert!(EnvFilter::try_new(default_log_filter()).is_ok());
    }

    #[test]
    fn logs_live_under_the_data_dir() {
        let dir = log_dir();
        assert!(dir.ends_with("querydesk/logs"));
        let config = LogConfig::new(dir.clone()).with_filter("querydesk_core=debug");
        assert_eq!(config.log_dir, dir);
        assert_eq!(config.log_filter.as_deref(), Some("querydesk_core=debug"));
    }
}
