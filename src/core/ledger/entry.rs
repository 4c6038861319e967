//! Ledger entry types

use crate::domain::ids::{Doi, RecordId};
use crate::domain::{LoadErrorDetail, LoadErrorKind, LoadStage};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One line of the created-records log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatedEntry {
    /// 1-based dataset index (ledger key)
    pub index: usize,

    /// DOI of the record
    pub doi: Doi,

    /// Id assigned by the target store
    pub record_id: RecordId,

    /// When the record was created
    pub timestamp: DateTime<Utc>,
}

impl CreatedEntry {
    /// Creates a new created-log entry stamped now
    pub fn new(index: usize, doi: Doi, record_id: RecordId) -> Self {
        Self {
            index,
            doi,
            record_id,
            timestamp: Utc::now(),
        }
    }
}

/// One member of the failed-records set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailedEntry {
    /// 1-based dataset index (ledger key)
    pub index: usize,

    /// DOI, when the payload could be read far enough to know it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doi: Option<Doi>,

    /// Failure classification
    pub kind: LoadErrorKind,

    /// Stage of the most recent failure
    pub stage: LoadStage,

    /// Most recent error message
    pub error: String,

    /// Number of failed attempts so far
    #[serde(default = "default_attempts")]
    pub attempts: u32,

    /// Time of the most recent failure
    pub timestamp: DateTime<Utc>,
}

fn default_attempts() -> u32 {
    1
}

impl FailedEntry {
    /// First failure of a key
    pub fn first(index: usize, doi: Option<Doi>, error: &LoadErrorDetail) -> Self {
        Self {
            index,
            doi,
            kind: error.kind,
            stage: error.stage,
            error: error.message.clone(),
            attempts: 1,
            timestamp: Utc::now(),
        }
    }

    /// Replaces the error with a newer failure and bumps the attempt count
    pub fn record_retry(&mut self, doi: Option<Doi>, error: &LoadErrorDetail) {
        if doi.is_some() {
            self.doi = doi;
        }
        self.kind = error.kind;
        self.stage = error.stage;
        self.error = error.message.clone();
        self.attempts = self.attempts.saturating_add(1);
        self.timestamp = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_bumps_attempts_and_keeps_doi() {
        let doi = Doi::new("10.1000/keep").unwrap();
        let first = LoadErrorDetail::new(LoadErrorKind::WriteFailed, LoadStage::Write, "503");
        let mut entry = FailedEntry::first(3, Some(doi.clone()), &first);

        let second =
            LoadErrorDetail::new(LoadErrorKind::FetchFailed, LoadStage::Fetch, "invalid JSON");
        entry.record_retry(None, &second);

        assert_eq!(entry.attempts, 2);
        assert_eq!(entry.doi, Some(doi));
        assert_eq!(entry.kind, LoadErrorKind::FetchFailed);
        assert_eq!(entry.error, "invalid JSON");
    }

    #[test]
    fn test_failed_entry_wire_format() {
        let error = LoadErrorDetail::new(
            LoadErrorKind::ProvisioningFailed,
            LoadStage::Provision,
            "user",
        );
        let entry = FailedEntry::first(7, None, &error);
        let json = serde_json::to_value(&entry).unwrap();

        assert_eq!(json["kind"], "provisioning_failed");
        assert_eq!(json["stage"], "provision");
        assert!(json.get("doi").is_none());

        let legacy = r#"{"index":2,"kind":"write_failed","stage":"write","error":"x","timestamp":"2024-05-01T10:00:00Z"}"#;
        let parsed: FailedEntry = serde_json::from_str(legacy).unwrap();
        assert_eq!(parsed.attempts, 1);
    }
}
