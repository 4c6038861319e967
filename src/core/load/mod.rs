//! Load orchestration
//!
//! This module provides the load logic, including:
//! - Run coordination (working-set resolution, ledger write-through, halting)
//! - Per-record loading (fetch, existence check, provisioning, write)
//! - The create / update / skip decision policy
//! - File manifest preparation and filename cleaning
//! - Outcomes and the run summary

pub mod coordinator;
pub mod decision;
pub mod files;
pub mod options;
pub mod outcome;
pub mod record_loader;
pub mod summary;

pub use coordinator::LoadCoordinator;
pub use decision::{decide_action, LoadAction};
pub use files::{clean_filename, prepare_uploads};
pub use options::{parse_date, LoadOptions};
pub use outcome::{LoadOutcome, LoadStatus};
pub use record_loader::RecordLoader;
pub use summary::LoadSummary;
