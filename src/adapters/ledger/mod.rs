//! Outcome ledger persistence
//!
//! [`LedgerStorage`] abstracts the two ledger collections;
//! [`JsonlLedgerStorage`] keeps them in newline-delimited JSON files.

pub mod jsonl;
pub mod traits;

pub use jsonl::JsonlLedgerStorage;
pub use traits::{DamagedLine, LedgerRead, LedgerStorage};
