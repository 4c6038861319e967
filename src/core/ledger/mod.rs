//! Outcome ledger
//!
//! Durable cross-run record of per-record outcomes: an append-only log of
//! created records and a rewritable set of failed records, keyed by the
//! record's 1-based dataset index.

pub mod entry;
pub mod manager;

pub use entry::{CreatedEntry, FailedEntry};
pub use manager::{LedgerHistory, LedgerManager, LedgerStats};
