//! Logging and observability
//!
//! Structured logging through `tracing`, plus a handful of macros that keep
//! per-record events uniform across the loader.
//!
//! # Example
//!
//! ```no_run
//! use record_importer::logging::init_logging;
//! use record_importer::config::LoggingConfig;
//! use std::path::Path;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config, Path::new("logs")).expect("Failed to initialize logging");
//!
//! tracing::info!(index = 3, "Record loaded");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard, LOG_FILE_NAME};

/// Log the start of a record load
///
/// ```no_run
/// use record_importer::log_record_start;
///
/// log_record_start!(3, "3");
/// ```
#[macro_export]
macro_rules! log_record_start {
    ($index:expr, $locator:expr) => {
        tracing::debug!(
            index = $index,
            locator = %$locator,
            "Loading record"
        );
    };
}

/// Log the terminal state of a record load
///
/// Failures are logged at warn level with their classification.
#[macro_export]
macro_rules! log_record_outcome {
    ($outcome:expr) => {
        match &$outcome.error {
            Some(error) => tracing::warn!(
                index = $outcome.index,
                doi = ?$outcome.doi.as_ref().map(|d| d.as_str()),
                status = %$outcome.status,
                kind = %error.kind,
                stage = %error.stage,
                error = %error.message,
                "Record load failed"
            ),
            None => tracing::info!(
                index = $outcome.index,
                doi = ?$outcome.doi.as_ref().map(|d| d.as_str()),
                status = %$outcome.status,
                record_id = ?$outcome.record_id.as_ref().map(|r| r.as_str()),
                "Record load finished"
            ),
        }
    };
}

/// Log the end of a load run
#[macro_export]
macro_rules! log_load_complete {
    ($summary:expr) => {
        tracing::info!(
            created = $summary.created,
            updated = $summary.updated,
            skipped = $summary.skipped,
            failed = $summary.failed,
            halted = $summary.halted,
            duration_ms = $summary.duration.as_millis() as u64,
            "Load run completed"
        );
    };
}

/// Log a retry attempt
///
/// ```no_run
/// use record_importer::log_retry_attempt;
///
/// log_retry_attempt!(2, 3, "Connection timeout");
/// ```
#[macro_export]
macro_rules! log_retry_attempt {
    ($attempt:expr, $max_attempts:expr, $reason:expr) => {
        tracing::warn!(
            attempt = $attempt,
            max_attempts = $max_attempts,
            reason = %$reason,
            "Retrying request"
        );
    };
}
