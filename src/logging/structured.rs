//! Structured logging setup using tracing
//!
//! Console output for operators plus an optional JSON log file with
//! rotation, written through a non-blocking appender.

use crate::config::LoggingConfig;
use crate::domain::{ImporterError, Result};
use std::path::Path;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// File name of the rolling JSON log
pub const LOG_FILE_NAME: &str = "record_importer.log";

/// Guard that must be kept alive for the duration of the program
/// to ensure logs are flushed properly
pub struct LoggingGuard {
    _file_guard: Option<WorkerGuard>,
}

impl LoggingGuard {
    fn new(file_guard: Option<WorkerGuard>) -> Self {
        Self {
            _file_guard: file_guard,
        }
    }
}

/// Initialize the logging system
///
/// # Arguments
///
/// * `log_level_str` - Log level (trace, debug, info, warn, error)
/// * `config` - Logging configuration
/// * `default_dir` - Log directory used when `config.local_path` is unset
///
/// # Example
///
/// ```no_run
/// use record_importer::logging::init_logging;
/// use record_importer::config::LoggingConfig;
/// use std::path::Path;
///
/// let config = LoggingConfig::default();
/// let _guard = init_logging("info", &config, Path::new("logs")).expect("Failed to initialize logging");
/// ```
pub fn init_logging(
    log_level_str: &str,
    config: &LoggingConfig,
    default_dir: &Path,
) -> Result<LoggingGuard> {
    let log_level = parse_log_level(log_level_str)?;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("record_importer={log_level}")));

    let mut layers = Vec::new();

    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_writer(std::io::stderr)
        .with_filter(env_filter.clone());
    layers.push(console_layer.boxed());

    let log_dir = config.local_path.as_deref().unwrap_or(default_dir);
    let file_guard = if config.local_enabled {
        std::fs::create_dir_all(log_dir).map_err(|e| {
            ImporterError::Configuration(format!(
                "Failed to create log directory {}: {}",
                log_dir.display(),
                e
            ))
        })?;

        let file_appender =
            RollingFileAppender::new(parse_rotation(&config.local_rotation), log_dir, LOG_FILE_NAME);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        let file_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_thread_ids(true)
            .with_span_events(FmtSpan::CLOSE)
            .with_writer(non_blocking)
            .with_filter(env_filter);

        layers.push(file_layer.boxed());
        Some(guard)
    } else {
        None
    };

    tracing_subscriber::registry().with(layers).init();

    tracing::debug!(
        local_enabled = config.local_enabled,
        log_dir = %log_dir.display(),
        rotation = %config.local_rotation,
        "Logging initialized"
    );

    Ok(LoggingGuard::new(file_guard))
}

fn parse_rotation(rotation: &str) -> Rotation {
    match rotation {
        "hourly" => Rotation::HOURLY,
        "never" => Rotation::NEVER,
        _ => Rotation::DAILY,
    }
}

/// Parse log level from string
fn parse_log_level(level_str: &str) -> Result<Level> {
    match level_str.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => Err(ImporterError::Configuration(format!(
            "Invalid log level: {level_str}. Must be one of: trace, debug, info, warn, error"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_log_level_valid() {
        assert_eq!(parse_log_level("trace").unwrap(), Level::TRACE);
        assert_eq!(parse_log_level("WARN").unwrap(), Level::WARN);
        assert_eq!(parse_log_level("Info").unwrap(), Level::INFO);
    }

    #[test]
    fn test_parse_log_level_invalid() {
        assert!(parse_log_level("verbose").is_err());
        assert!(parse_log_level("").is_err());
    }

    #[test]
    fn test_parse_rotation() {
        assert_eq!(
            format!("{:?}", parse_rotation("hourly")),
            format!("{:?}", Rotation::HOURLY)
        );
        assert_eq!(
            format!("{:?}", parse_rotation("never")),
            format!("{:?}", Rotation::NEVER)
        );
        assert_eq!(
            format!("{:?}", parse_rotation("daily")),
            format!("{:?}", Rotation::DAILY)
        );
    }
}
