//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "importer.toml")]
    pub output: String,

    /// Include example values and comments
    #[arg(long)]
    pub with_examples: bool,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing importer configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(2); // Configuration error exit code
        }

        let config_content = if self.with_examples {
            Self::generate_config_with_examples()
        } else {
            Self::generate_minimal_config()
        };

        match fs::write(&self.output, config_content) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your settings", self.output);
                println!("  2. Create a .env file with RECORD_IMPORTER_API_TOKEN=<admin token>");
                println!("  3. Validate configuration: record-importer validate-config");
                println!("  4. Check the dataset: record-importer count");
                println!("  5. Run a load: record-importer load");
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {e}");
                Ok(5) // Fatal error exit code
            }
        }
    }

    /// Generate minimal configuration
    fn generate_minimal_config() -> String {
        r#"# Record Importer Configuration File

environment = "development"

[application]
log_level = "info"

[dataset]
data_dir = "/srv/record-importer/data"

[ledger]
logs_location = "/srv/record-importer/logs"

[store]
base_url = "https://works.example.org"
api_token = "${RECORD_IMPORTER_API_TOKEN}"
admin_email = "admin@example.org"
timeout_seconds = 60

[provisioning]
default_origin = "knowledgeCommons"
default_scheme = "hclegacy-pid"

[logging]
local_enabled = true
local_rotation = "daily"
"#
        .to_string()
    }

    /// Generate configuration with examples and comments
    fn generate_config_with_examples() -> String {
        r#"# Record Importer Configuration File
#
# Loads serialized legacy deposits into the target record store.
# Values of the form ${VAR} are read from the environment (or .env).
# Every path can also be overridden with a RECORD_IMPORTER_* variable.

# Runtime environment: development | staging | production
environment = "development"

# ============================================================================
# Application Settings
# ============================================================================
[application]
# Log level (trace, debug, info, warn, error)
log_level = "info"

# ============================================================================
# Dataset
# ============================================================================
[dataset]
# Base data directory
data_dir = "/srv/record-importer/data"

# Serialized records, one JSON object per line
# (default: <data_dir>/record_importer_serialized_records.jsonl)
# serialized_path = "/srv/record-importer/data/record_importer_serialized_records.jsonl"

# Raw export, line-aligned with the serialized file (used by `read --raw-input`)
# (default: <data_dir>/record_importer_raw_records.jsonl)
# raw_path = "/srv/record-importer/data/record_importer_raw_records.jsonl"

# Directory holding the files named in record manifests
# (default: <data_dir>/import_files)
# files_location = "/srv/record-importer/data/import_files"

# ============================================================================
# Outcome Ledger
# ============================================================================
[ledger]
# Directory for the ledger files
logs_location = "/srv/record-importer/logs"

# Append-only log of created records
# (default: <logs_location>/record_importer_created_records.jsonl)
# created_log_path = "/srv/record-importer/logs/record_importer_created_records.jsonl"

# Set of failed records, rewritten after every failure or repair
# (default: <logs_location>/record_importer_failed_records.jsonl)
# failed_log_path = "/srv/record-importer/logs/record_importer_failed_records.jsonl"

# ============================================================================
# Target Store
# ============================================================================
[store]
# Base URL of the target store
base_url = "https://works.example.org"

# Admin API token (use an environment variable)
api_token = "${RECORD_IMPORTER_API_TOKEN}"

# Email of the importing admin account
admin_email = "admin@example.org"

# Request timeout in seconds
timeout_seconds = 60

# TLS certificate verification (cannot be disabled in production)
tls_verify = true

# Retry policy for transient failures (connection errors, timeouts, 429, 5xx)
[store.retry]
max_retries = 3
initial_delay_ms = 1000
max_delay_ms = 30000
backoff_multiplier = 2.0

# ============================================================================
# Provisioning
# ============================================================================
[provisioning]
# Identity provider assumed when a record's owner names none
default_origin = "knowledgeCommons"

# Identifier scheme used by --use-sourceids when --scheme is not given
default_scheme = "hclegacy-pid"

# Communities created on demand: visibility (public | restricted) and type
community_visibility = "public"
community_type = "organization"

# ============================================================================
# Logging Configuration
# ============================================================================
[logging]
# Enable JSON file logging in addition to the console
local_enabled = true

# Directory for record_importer.log (default: ledger.logs_location)
# local_path = "/var/log/record-importer"

# Log rotation: daily | hourly | never
local_rotation = "daily"
"#
        .to_string()
    }
}
