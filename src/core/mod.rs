//! Core business logic for the importer.
//!
//! # Modules
//!
//! - [`selector`] - CLI tokens to record locators
//! - [`dataset`] - Serialized dataset access and locator resolution
//! - [`load`] - Load orchestration, decision policy and reporting
//! - [`provisioning`] - On-demand communities and users
//! - [`ledger`] - Durable per-record outcomes across runs
//! - [`aggregation`] - Post-load statistics aggregation
//!
//! # Load Workflow
//!
//! 1. **Select**: Parse locator tokens into a [`selector::Selection`]
//! 2. **Plan**: Resolve locators against the dataset, merging in the
//!    ledger's failed set when retrying
//! 3. **Load**: For each record, fetch, check for an existing DOI match,
//!    provision its community and owner, write and transfer ownership
//! 4. **Record**: Write the outcome through to the ledger
//! 5. **Aggregate** (optional): Recompute statistics for the written records
//!
//! # Example
//!
//! ```rust,no_run
//! use record_importer::adapters::store::{StoreHttpClient, StoreServices};
//! use record_importer::config::load_config;
//! use record_importer::core::load::{LoadCoordinator, LoadOptions};
//! use record_importer::core::selector::Selection;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("importer.toml")?;
//! let client = StoreHttpClient::new(config.store.clone())?;
//! let services = StoreServices::from_backend(Arc::new(client));
//!
//! let coordinator =
//!     LoadCoordinator::from_config(&config, &services, LoadOptions::default()).await?;
//! let summary = coordinator.execute_load(&Selection::All).await?;
//!
//! println!("Created: {}", summary.created);
//! println!("Failed: {}", summary.failed);
//! # Ok(())
//! # }
//! ```

pub mod aggregation;
pub mod dataset;
pub mod ledger;
pub mod load;
pub mod provisioning;
pub mod selector;
