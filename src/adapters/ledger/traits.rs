//! Ledger storage trait
//!
//! The outcome ledger is two durable collections: an append-only log of
//! created records and a rewritable set of failed records.

use crate::core::ledger::entry::{CreatedEntry, FailedEntry};
use crate::domain::Result;
use async_trait::async_trait;

/// A ledger line that could not be parsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DamagedLine {
    /// 1-based line number in the ledger file
    pub line: usize,

    /// Parse error
    pub error: String,
}

/// Entries read from a ledger collection plus any lines that were skipped
#[derive(Debug, Clone)]
pub struct LedgerRead<T> {
    pub entries: Vec<T>,
    pub damaged: Vec<DamagedLine>,
}

impl<T> Default for LedgerRead<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            damaged: Vec::new(),
        }
    }
}

/// Durable storage for the outcome ledger
///
/// Implementations assume a single writer.
#[async_trait]
pub trait LedgerStorage: Send + Sync {
    /// Appends one entry to the created log
    async fn append_created(&self, entry: &CreatedEntry) -> Result<()>;

    /// Reads the created log, skipping damaged lines
    async fn load_created(&self) -> Result<LedgerRead<CreatedEntry>>;

    /// Reads the failed set, skipping damaged lines
    async fn load_failed(&self) -> Result<LedgerRead<FailedEntry>>;

    /// Replaces the failed set with `entries`
    async fn store_failed(&self, entries: &[FailedEntry]) -> Result<()>;
}
