//! Configuration management for the importer.
//!
//! TOML configuration with `${VAR_NAME}` substitution, defaults for
//! optional settings, `RECORD_IMPORTER_*` environment overrides and
//! validation on load.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use record_importer::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("importer.toml")?;
//! println!("Dataset: {}", config.dataset.serialized_path().display());
//! println!("Store: {}", config.store.base_url);
//! # Ok(())
//! # }
//! ```
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [dataset]
//! data_dir = "/srv/importer/data"
//!
//! [ledger]
//! logs_location = "/srv/importer/logs"
//!
//! [store]
//! base_url = "https://works.example.org"
//! api_token = "${RECORD_IMPORTER_API_TOKEN}"
//! admin_email = "admin@example.org"
//!
//! [provisioning]
//! default_origin = "knowledgeCommons"
//! default_scheme = "hclegacy-pid"
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

pub use loader::load_config;
pub use schema::{
    ApplicationConfig, DatasetConfig, Environment, ImporterConfig, LedgerConfig, LoggingConfig,
    ProvisioningConfig, RetryConfig, StoreConfig,
};
pub use secret::{secret_string, SecretString, SecretValue};
