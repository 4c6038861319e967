//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the importer configuration file.

use crate::config::load_config;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Also check that the dataset and file-storage paths exist
    #[arg(long)]
    pub check_paths: bool,
}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // load_config validates before returning
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Configuration is invalid");
                println!("   Error: {e}");
                return Ok(2); // Configuration error exit code
            }
        };

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Environment: {:?}", config.environment);
        println!("  Log Level: {}", config.application.log_level);
        println!("  Target Store: {}", config.store.base_url);
        println!("  Admin Email: {}", config.store.admin_email);
        println!("  TLS Verify: {}", config.store.tls_verify);
        println!(
            "  Serialized Dataset: {}",
            config.dataset.serialized_path().display()
        );
        println!("  Raw Dataset: {}", config.dataset.raw_path().display());
        println!("  File Storage: {}", config.dataset.files_location().display());
        println!(
            "  Created Ledger: {}",
            config.ledger.created_log_path().display()
        );
        println!("  Failed Ledger: {}", config.ledger.failed_log_path().display());
        println!("  Default Origin: {}", config.provisioning.default_origin);
        println!("  Default Scheme: {}", config.provisioning.default_scheme);
        println!();

        if self.check_paths {
            let mut missing = 0;
            for path in [
                config.dataset.serialized_path(),
                config.dataset.files_location(),
            ] {
                if path.exists() {
                    println!("✅ {} exists", path.display());
                } else {
                    println!("❌ {} does not exist", path.display());
                    missing += 1;
                }
            }
            println!();
            if missing > 0 {
                return Ok(2);
            }
        }

        Ok(0)
    }
}
