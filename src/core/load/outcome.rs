//! Per-record load outcomes

use crate::core::selector::Locator;
use crate::domain::ids::{Doi, RecordId};
use crate::domain::LoadErrorDetail;
use chrono::{DateTime, Utc};
use std::fmt;

/// Terminal state of one record load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoadStatus {
    Created,
    Updated,
    Skipped,
    Failed,
}

impl LoadStatus {
    /// Every status except `Failed`
    pub fn is_success(&self) -> bool {
        !matches!(self, LoadStatus::Failed)
    }
}

impl fmt::Display for LoadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LoadStatus::Created => "created",
            LoadStatus::Updated => "updated",
            LoadStatus::Skipped => "skipped",
            LoadStatus::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Result of loading one record
#[derive(Debug, Clone)]
pub struct LoadOutcome {
    /// Locator the record was addressed by
    pub locator: Locator,

    /// Resolved 1-based dataset index
    pub index: usize,

    /// DOI, when the payload was readable
    pub doi: Option<Doi>,

    /// Target-store id of the written (or matched) record
    pub record_id: Option<RecordId>,

    /// Terminal status
    pub status: LoadStatus,

    /// Failure details for `Failed` outcomes
    pub error: Option<LoadErrorDetail>,

    /// Creation time reported by the store, for records created or updated
    pub created_at: Option<DateTime<Utc>>,

    /// When the record reached its terminal state
    pub timestamp: DateTime<Utc>,
}

impl LoadOutcome {
    fn new(locator: Locator, index: usize, status: LoadStatus) -> Self {
        Self {
            locator,
            index,
            doi: None,
            record_id: None,
            status,
            error: None,
            created_at: None,
            timestamp: Utc::now(),
        }
    }

    pub fn created(
        locator: Locator,
        index: usize,
        doi: Doi,
        record_id: RecordId,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            doi: Some(doi),
            record_id: Some(record_id),
            created_at: Some(created_at),
            ..Self::new(locator, index, LoadStatus::Created)
        }
    }

    pub fn updated(
        locator: Locator,
        index: usize,
        doi: Doi,
        record_id: RecordId,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            doi: Some(doi),
            record_id: Some(record_id),
            created_at: Some(created_at),
            ..Self::new(locator, index, LoadStatus::Updated)
        }
    }

    pub fn skipped(locator: Locator, index: usize, doi: Doi, record_id: RecordId) -> Self {
        Self {
            doi: Some(doi),
            record_id: Some(record_id),
            ..Self::new(locator, index, LoadStatus::Skipped)
        }
    }

    pub fn failed(
        locator: Locator,
        index: usize,
        doi: Option<Doi>,
        error: LoadErrorDetail,
    ) -> Self {
        Self {
            doi,
            error: Some(error),
            ..Self::new(locator, index, LoadStatus::Failed)
        }
    }

    /// Whether the record reached a non-failed terminal state
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// One-line progress report used in verbose mode
    pub fn progress_line(&self) -> String {
        let doi = self.doi.as_ref().map(|d| d.as_str()).unwrap_or("-");
        let mut line = format!("[{}] {} {}", self.locator, self.status, doi);
        if let Some(id) = &self.record_id {
            line.push_str(&format!(" -> {id}"));
        }
        if let Some(error) = &self.error {
            line.push_str(&format!(" ({error})"));
        }
        line
    }
}
