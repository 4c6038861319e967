//! Post-load statistics aggregation trigger

use crate::adapters::store::{AggregationReport, AggregationService};
use crate::core::load::outcome::{LoadOutcome, LoadStatus};
use crate::domain::ids::RecordId;
use chrono::{DateTime, NaiveDate, Utc};
use std::sync::Arc;

/// Result of the optional aggregation step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AggregationOutcome {
    /// The service aggregated the window
    Completed(AggregationReport),

    /// Nothing to aggregate
    Skipped(String),

    /// The service call failed; completed loads are unaffected
    Failed(String),
}

/// Requests usage-statistics recomputation once a run has finished
pub struct AggregationTrigger {
    service: Arc<dyn AggregationService>,
}

impl AggregationTrigger {
    pub fn new(service: Arc<dyn AggregationService>) -> Self {
        Self { service }
    }

    /// Aggregates the records created or updated in this run
    ///
    /// The window starts at `start` or, by default, the earliest creation
    /// time among records created this run, and ends at `end` or the day of
    /// `invoked_at`. Never fails: service errors are reported in the
    /// returned outcome.
    pub async fn run(
        &self,
        outcomes: &[LoadOutcome],
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        invoked_at: DateTime<Utc>,
    ) -> AggregationOutcome {
        let records: Vec<RecordId> = outcomes
            .iter()
            .filter(|o| matches!(o.status, LoadStatus::Created | LoadStatus::Updated))
            .filter_map(|o| o.record_id.clone())
            .collect();

        if records.is_empty() {
            return AggregationOutcome::Skipped("no records were written in this run".to_string());
        }

        let Some(start) = start.or_else(|| earliest_creation(outcomes)) else {
            return AggregationOutcome::Skipped(
                "no records were created in this run; pass --start-date".to_string(),
            );
        };
        let end = end.unwrap_or_else(|| invoked_at.date_naive());

        if start > end {
            return AggregationOutcome::Failed(format!(
                "window start {start} is after end {end}"
            ));
        }

        tracing::info!(
            records = records.len(),
            start = %start,
            end = %end,
            "Triggering statistics aggregation"
        );

        match self.service.aggregate(&records, start, end).await {
            Ok(report) => {
                tracing::info!(aggregated = report.record_count, "Aggregation completed");
                AggregationOutcome::Completed(report)
            }
            Err(e) => {
                tracing::error!(error = %e, "Aggregation failed");
                AggregationOutcome::Failed(e.to_string())
            }
        }
    }
}

fn earliest_creation(outcomes: &[LoadOutcome]) -> Option<NaiveDate> {
    outcomes
        .iter()
        .filter(|o| o.status == LoadStatus::Created)
        .filter_map(|o| o.created_at)
        .min()
        .map(|t| t.date_naive())
}
