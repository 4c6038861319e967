//! External system integrations.
//!
//! - [`store`] - target record-management store (records, communities,
//!   users, identity links, statistics aggregation)
//! - [`ledger`] - durable outcome ledger storage
//!
//! The core only sees the traits exported here; concrete implementations
//! are chosen by the CLI layer and replaced by in-memory doubles in tests.

pub mod ledger;
pub mod store;
