//! Error context extension trait
//!
//! Similar to `anyhow::Context`, but keeps library code on
//! [`ImporterError`]. Context is prepended to the message while the error
//! variant is preserved, so per-record failure classification still sees
//! the original kind.
//!
//! # Examples
//!
//! ```rust
//! use record_importer::domain::Result;
//! use record_importer::domain::context::ResultExt;
//!
//! fn read_dataset(path: &str) -> Result<String> {
//!     std::fs::read_to_string(path).with_context(|| format!("Failed to read dataset {path}"))
//! }
//! ```

use crate::domain::errors::ImporterError;
use crate::domain::result::Result;

/// Extension trait for adding context to `Result` types
pub trait ResultExt<T> {
    /// Add context to an error
    fn context<C>(self, context: C) -> Result<T>
    where
        C: std::fmt::Display + Send + Sync + 'static;

    /// Add context to an error, computing it only on failure
    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: std::fmt::Display + Send + Sync + 'static,
        F: FnOnce() -> C;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<ImporterError>,
{
    fn context<C>(self, context: C) -> Result<T>
    where
        C: std::fmt::Display + Send + Sync + 'static,
    {
        self.map_err(|e| prefix(e.into(), &context))
    }

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: std::fmt::Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.map_err(|e| prefix(e.into(), &f()))
    }
}

fn prefix(err: ImporterError, context: &dyn std::fmt::Display) -> ImporterError {
    use ImporterError::*;

    let wrap = |message: String| format!("{context}: {message}");
    match err {
        Configuration(m) => Configuration(wrap(m)),
        Usage(m) => Usage(wrap(m)),
        NotFound(m) => NotFound(wrap(m)),
        FetchFailed(m) => FetchFailed(wrap(m)),
        WriteFailed(m) => WriteFailed(wrap(m)),
        ProvisioningFailed(m) => ProvisioningFailed(wrap(m)),
        Ledger(m) => Ledger(wrap(m)),
        Aggregation(m) => Aggregation(wrap(m)),
        Validation(m) => Validation(wrap(m)),
        Serialization(m) => Serialization(wrap(m)),
        Io(m) => Io(wrap(m)),
        Other(m) => Other(wrap(m)),
        // Store errors carry structured status; fold them into the message
        store @ Store(_) => Other(wrap(store.to_string())),
    }
}
