//! Run-level load options

use crate::domain::{ImporterError, Result};
use chrono::NaiveDate;

/// Options for one `load` invocation
///
/// Built once from the command line and validated before any record is
/// touched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadOptions {
    /// Skip records that already exist in the target store
    pub no_updates: bool,

    /// Merge the ledger's failed set into the working set
    pub retry_failed: bool,

    /// Normalize file names before upload
    pub clean_filenames: bool,

    /// Print one progress line per record
    pub verbose: bool,

    /// Halt at the first failed record
    pub stop_on_error: bool,

    /// Trigger statistics aggregation after the run
    pub aggregate: bool,

    /// Aggregation window start (defaults to the earliest creation this run)
    pub start_date: Option<NaiveDate>,

    /// Aggregation window end (defaults to the day of invocation)
    pub end_date: Option<NaiveDate>,
}

impl LoadOptions {
    /// Checks option combinations
    ///
    /// # Errors
    ///
    /// Returns [`ImporterError::Usage`] if the aggregation window is
    /// inverted.
    pub fn validate(&self) -> Result<()> {
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if start > end {
                return Err(ImporterError::Usage(format!(
                    "--start-date {start} is after --end-date {end}"
                )));
            }
        }

        if !self.aggregate && (self.start_date.is_some() || self.end_date.is_some()) {
            tracing::warn!("--start-date/--end-date have no effect without --aggregate");
        }

        Ok(())
    }
}

/// Parses a `YYYY-MM-DD` command-line date
///
/// # Errors
///
/// Returns [`ImporterError::Usage`] on any other format.
pub fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|e| ImporterError::Usage(format!("invalid date '{value}' (expected YYYY-MM-DD): {e}")))
}
