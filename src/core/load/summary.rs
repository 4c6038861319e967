//! Load summary and reporting

use crate::core::aggregation::AggregationOutcome;
use crate::core::load::outcome::{LoadOutcome, LoadStatus};
use crate::core::selector::Locator;
use std::time::Duration;

/// Summary of a load run
#[derive(Debug, Clone, Default)]
pub struct LoadSummary {
    /// Number of records processed
    pub total: usize,

    /// Records created
    pub created: usize,

    /// Existing records updated
    pub updated: usize,

    /// Existing records skipped
    pub skipped: usize,

    /// Records that failed
    pub failed: usize,

    /// Whether the run stopped at the first failure
    pub halted: bool,

    /// Records left unprocessed after a halt
    pub remaining: usize,

    /// Previously failed locators that no longer resolve
    pub dropped: Vec<Locator>,

    /// Outcomes in processing order
    pub outcomes: Vec<LoadOutcome>,

    /// Duration of the run
    pub duration: Duration,

    /// Aggregation result, when aggregation was requested
    pub aggregation: Option<AggregationOutcome>,
}

impl LoadSummary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Tallies one outcome
    pub fn add(&mut self, outcome: LoadOutcome) {
        self.total += 1;
        match outcome.status {
            LoadStatus::Created => self.created += 1,
            LoadStatus::Updated => self.updated += 1,
            LoadStatus::Skipped => self.skipped += 1,
            LoadStatus::Failed => self.failed += 1,
        }
        self.outcomes.push(outcome);
    }

    /// Outcomes that ended in failure
    pub fn failures(&self) -> impl Iterator<Item = &LoadOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }

    /// Check if the run had no failed records
    pub fn is_successful(&self) -> bool {
        self.failed == 0
    }

    /// Get success rate as a percentage
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            return 100.0;
        }
        ((self.total - self.failed) as f64 / self.total as f64) * 100.0
    }

    /// Log the summary
    pub fn log_summary(&self) {
        crate::log_load_complete!(self);

        for outcome in self.failures() {
            if let Some(error) = &outcome.error {
                tracing::warn!(
                    index = outcome.index,
                    kind = %error.kind,
                    stage = %error.stage,
                    message = %error.message,
                    "Load error"
                );
            }
        }

        if !self.dropped.is_empty() {
            tracing::warn!(
                dropped = self.dropped.len(),
                "Previously failed records no longer resolve and were skipped"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ids::{Doi, RecordId};
    use crate::domain::{LoadErrorDetail, LoadErrorKind, LoadStage};
    use chrono::Utc;

    #[test]
    fn test_tallies() {
        let mut summary = LoadSummary::new();
        summary.add(LoadOutcome::created(
            Locator::Index(1),
            1,
            Doi::new("10.1/a").unwrap(),
            RecordId::new("a").unwrap(),
            Utc::now(),
        ));
        summary.add(LoadOutcome::skipped(
            Locator::Index(2),
            2,
            Doi::new("10.1/b").unwrap(),
            RecordId::new("b").unwrap(),
        ));
        summary.add(LoadOutcome::failed(
            Locator::Index(3),
            3,
            None,
            LoadErrorDetail::new(LoadErrorKind::WriteFailed, LoadStage::Write, "500"),
        ));

        assert_eq!(summary.total, 3);
        assert_eq!((summary.created, summary.skipped, summary.failed), (1, 1, 1));
        assert!(!summary.is_successful());
        assert_eq!(summary.failures().count(), 1);
        assert!((summary.success_rate() - 66.666).abs() < 0.01);
    }

    #[test]
    fn test_empty_summary_is_successful() {
        let summary = LoadSummary::new();
        assert!(summary.is_successful());
        assert_eq!(summary.success_rate(), 100.0);
    }
}
