// Record Importer - Legacy deposit migration tool
// Copyright (c) 2025 Record Importer Contributors
// Licensed under the MIT License

//! # Record Importer
//!
//! Loads legacy deposit records, already serialized one JSON object per
//! line, into a record-management store through its REST API.
//!
//! ## Overview
//!
//! This library provides the core functionality for:
//! - **Selecting** records by line index, index range or source identifier
//! - **Deciding** per record whether to create, update or skip, keyed by DOI
//! - **Provisioning** the communities and users a record depends on
//! - **Recording** every outcome in a durable ledger so re-runs are safe and
//!   retries are targeted
//! - **Aggregating** usage statistics for the written records
//!
//! ## Architecture
//!
//! The importer follows a layered architecture:
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Business logic (selection, load orchestration, provisioning, ledger)
//! - [`adapters`] - External integrations (target store REST API, ledger files)
//! - [`domain`] - Core domain types and errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use record_importer::adapters::store::{StoreHttpClient, StoreServices};
//! use record_importer::config::load_config;
//! use record_importer::core::load::{LoadCoordinator, LoadOptions};
//! use record_importer::core::selector::Selection;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("importer.toml")?;
//!     let services = StoreServices::from_backend(Arc::new(StoreHttpClient::new(
//!         config.store.clone(),
//!     )?));
//!
//!     let options = LoadOptions {
//!         no_updates: true,
//!         ..Default::default()
//!     };
//!     let coordinator = LoadCoordinator::from_config(&config, &services, options).await?;
//!
//!     // Records 2 to the end of the dataset
//!     let selection = Selection::parse(&["2-".to_string()], None)?;
//!     let summary = coordinator.execute_load(&selection).await?;
//!
//!     println!("Created {}, failed {}", summary.created, summary.failed);
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Library functions return [`domain::Result`], whose error type is
//! [`domain::ImporterError`]. Per-record failures during a load do not
//! propagate; they are captured in a [`core::load::LoadOutcome`] and the
//! ledger's failed set.

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
