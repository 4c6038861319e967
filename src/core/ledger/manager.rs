//! Outcome ledger manager
//!
//! Owns the in-memory view of the failed set and of the keys already in the
//! created log, and writes every terminal outcome through to the [`LedgerStorage`] backend before the next record
//! is processed, so an interrupted run loses at most the in-flight record.

use crate::adapters::ledger::traits::{DamagedLine, LedgerStorage};
use crate::core::ledger::entry::{CreatedEntry, FailedEntry};
use crate::core::load::outcome::{LoadOutcome, LoadStatus};
use crate::domain::{ImporterError, Result};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Ledger statistics for the `status` command
#[derive(Debug, Clone, Default)]
pub struct LedgerStats {
    /// Entries in the created log
    pub created: usize,

    /// Distinct keys in the created log
    pub created_keys: usize,

    /// Members of the failed set, ordered by index
    pub failed: Vec<FailedEntry>,

    /// Damaged created-log lines skipped while reading
    pub damaged_created: Vec<DamagedLine>,

    /// Damaged failed-set lines skipped while reading
    pub damaged_failed: Vec<DamagedLine>,
}

/// What the ledger already knows about one key
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LedgerHistory {
    /// The key is in the failed set
    pub failed: bool,

    /// The key has at least one created-log entry
    pub created: bool,
}

impl LedgerHistory {
    /// A create was attempted for this key but never completed
    pub fn unfinished_create(&self) -> bool {
        self.failed && !self.created
    }
}

/// Outcome ledger
pub struct LedgerManager {
    storage: Arc<dyn LedgerStorage>,
    failed: Mutex<BTreeMap<usize, FailedEntry>>,
    created: Mutex<BTreeSet<usize>>,
}

impl LedgerManager {
    /// Opens the ledger, loading the failed set and the created-log keys
    ///
    /// Damaged failed-set lines are dropped with a warning; they are
    /// removed from disk the next time the set is rewritten. Damaged
    /// created-log lines are skipped and left in place.
    ///
    /// # Errors
    ///
    /// Returns an error if either collection cannot be read at all.
    pub async fn open(storage: Arc<dyn LedgerStorage>) -> Result<Self> {
        let created_read = storage.load_created().await?;
        for damaged in &created_read.damaged {
            tracing::warn!(
                line = damaged.line,
                error = %damaged.error,
                "Skipping damaged created-ledger entry"
            );
        }
        let created: BTreeSet<usize> = created_read.entries.iter().map(|e| e.index).collect();

        let read = storage.load_failed().await?;
        for damaged in &read.damaged {
            tracing::warn!(
                line = damaged.line,
                error = %damaged.error,
                "Skipping damaged failed-ledger entry"
            );
        }

        // Later lines win if a key appears twice
        let failed: BTreeMap<usize, FailedEntry> = read
            .entries
            .into_iter()
            .map(|entry| (entry.index, entry))
            .collect();

        tracing::debug!(failed = failed.len(), created = created.len(), "Ledger opened");

        Ok(Self {
            storage,
            failed: Mutex::new(failed),
            created: Mutex::new(created),
        })
    }

    /// Indices in the failed set, ascending
    pub async fn failed_indices(&self) -> Vec<usize> {
        self.failed.lock().await.keys().copied().collect()
    }

    /// Members of the failed set, ordered by index
    pub async fn failed_entries(&self) -> Vec<FailedEntry> {
        self.failed.lock().await.values().cloned().collect()
    }

    /// Whether `index` is in the failed set
    pub async fn is_failed(&self, index: usize) -> bool {
        self.failed.lock().await.contains_key(&index)
    }

    /// The ledger's history for `index`
    pub async fn history(&self, index: usize) -> LedgerHistory {
        LedgerHistory {
            failed: self.failed.lock().await.contains_key(&index),
            created: self.created.lock().await.contains(&index),
        }
    }

    /// Removes keys from the failed set and rewrites it
    ///
    /// Used for failed entries whose index no longer resolves in the
    /// dataset. Returns how many keys were removed.
    ///
    /// # Errors
    ///
    /// Returns [`ImporterError::Ledger`] if the set cannot be rewritten.
    pub async fn prune_failed(&self, indices: &[usize]) -> Result<usize> {
        let mut failed = self.failed.lock().await;
        let removed = indices
            .iter()
            .filter(|index| failed.remove(*index).is_some())
            .count();
        if removed > 0 {
            self.flush_failed(&failed).await?;
            tracing::info!(removed, "Pruned failed-ledger entries outside the dataset");
        }
        Ok(removed)
    }

    /// Writes one terminal outcome through to storage
    ///
    /// - `Created` appends to the created log, then clears the key from the
    ///   failed set.
    /// - `Updated` and `Skipped` clear the key from the failed set.
    /// - `Failed` inserts the key or refreshes its entry, bumping the
    ///   attempt count.
    ///
    /// # Errors
    ///
    /// Returns [`ImporterError::Ledger`] if the outcome cannot be persisted.
    pub async fn record_outcome(&self, outcome: &LoadOutcome) -> Result<()> {
        let mut failed = self.failed.lock().await;

        match outcome.status {
            LoadStatus::Created => {
                let (Some(doi), Some(record_id)) = (&outcome.doi, &outcome.record_id) else {
                    return Err(ImporterError::Ledger(format!(
                        "created outcome for record {} has no DOI or record id",
                        outcome.index
                    )));
                };
                let mut entry = CreatedEntry::new(outcome.index, doi.clone(), record_id.clone());
                entry.timestamp = outcome.timestamp;
                self.storage.append_created(&entry).await?;
                self.created.lock().await.insert(outcome.index);

                if failed.remove(&outcome.index).is_some() {
                    self.flush_failed(&failed).await?;
                }
            }
            LoadStatus::Updated | LoadStatus::Skipped => {
                if failed.remove(&outcome.index).is_some() {
                    self.flush_failed(&failed).await?;
                }
            }
            LoadStatus::Failed => {
                let Some(error) = &outcome.error else {
                    return Err(ImporterError::Ledger(format!(
                        "failed outcome for record {} has no error detail",
                        outcome.index
                    )));
                };
                failed
                    .entry(outcome.index)
                    .and_modify(|entry| entry.record_retry(outcome.doi.clone(), error))
                    .or_insert_with(|| FailedEntry::first(outcome.index, outcome.doi.clone(), error));
                self.flush_failed(&failed).await?;
            }
        }

        Ok(())
    }

    /// Reads both collections for reporting
    ///
    /// # Errors
    ///
    /// Returns an error if either collection cannot be read.
    pub async fn stats(&self) -> Result<LedgerStats> {
        let created = self.storage.load_created().await?;
        let failed = self.storage.load_failed().await?;

        let mut keys: Vec<usize> = created.entries.iter().map(|e| e.index).collect();
        keys.sort_unstable();
        keys.dedup();

        let mut failed_entries = failed.entries;
        failed_entries.sort_by_key(|e| e.index);

        Ok(LedgerStats {
            created: created.entries.len(),
            created_keys: keys.len(),
            failed: failed_entries,
            damaged_created: created.damaged,
            damaged_failed: failed.damaged,
        })
    }

    async fn flush_failed(&self, failed: &BTreeMap<usize, FailedEntry>) -> Result<()> {
        let entries: Vec<FailedEntry> = failed.values().cloned().collect();
        self.storage.store_failed(&entries).await
    }
}
