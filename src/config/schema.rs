//! Configuration schema types
//!
//! This module defines the configuration structure for the importer.

use crate::config::SecretString;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Runtime environment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Development environment
    #[default]
    Development,
    /// Staging environment
    Staging,
    /// Production environment
    Production,
}

/// Main importer configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImporterConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Runtime environment (development, staging, production)
    #[serde(default)]
    pub environment: Environment,

    /// Serialized dataset and file storage locations
    pub dataset: DatasetConfig,

    /// Outcome ledger locations
    #[serde(default)]
    pub ledger: LedgerConfig,

    /// Target store connection
    pub store: StoreConfig,

    /// Community and user provisioning defaults
    #[serde(default)]
    pub provisioning: ProvisioningConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ImporterConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.dataset.validate()?;
        self.ledger.validate()?;
        self.store.validate(&self.environment)?;
        self.provisioning.validate()?;
        self.logging.validate()?;
        Ok(())
    }

    /// Directory for the rolling log file
    pub fn log_directory(&self) -> PathBuf {
        self.logging
            .local_path
            .clone()
            .unwrap_or_else(|| self.ledger.logs_location.clone())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

/// Serialized dataset locations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// Base data directory
    pub data_dir: PathBuf,

    /// Serialized records file (JSONL)
    #[serde(default)]
    pub serialized_path: Option<PathBuf>,

    /// Raw export file (JSONL), line-aligned with the serialized file
    #[serde(default)]
    pub raw_path: Option<PathBuf>,

    /// Directory holding the files referenced by record manifests
    #[serde(default)]
    pub files_location: Option<PathBuf>,
}

impl DatasetConfig {
    /// Creates a dataset configuration rooted at `data_dir`
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            serialized_path: None,
            raw_path: None,
            files_location: None,
        }
    }

    /// Resolved path of the serialized records file
    pub fn serialized_path(&self) -> PathBuf {
        self.serialized_path
            .clone()
            .unwrap_or_else(|| self.data_dir.join("record_importer_serialized_records.jsonl"))
    }

    /// Resolved path of the raw export file
    pub fn raw_path(&self) -> PathBuf {
        self.raw_path
            .clone()
            .unwrap_or_else(|| self.data_dir.join("record_importer_raw_records.jsonl"))
    }

    /// Resolved file-storage directory
    pub fn files_location(&self) -> PathBuf {
        self.files_location
            .clone()
            .unwrap_or_else(|| self.data_dir.join("import_files"))
    }

    fn validate(&self) -> Result<(), String> {
        if self.data_dir.as_os_str().is_empty() {
            return Err("dataset.data_dir cannot be empty".to_string());
        }
        Ok(())
    }
}

/// Outcome ledger locations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Directory holding the ledger files
    #[serde(default = "default_logs_location")]
    pub logs_location: PathBuf,

    /// Created-records log
    #[serde(default)]
    pub created_log_path: Option<PathBuf>,

    /// Failed-records set
    #[serde(default)]
    pub failed_log_path: Option<PathBuf>,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            logs_location: default_logs_location(),
            created_log_path: None,
            failed_log_path: None,
        }
    }
}

impl LedgerConfig {
    /// Creates a ledger configuration rooted at `logs_location`
    pub fn new(logs_location: impl Into<PathBuf>) -> Self {
        Self {
            logs_location: logs_location.into(),
            created_log_path: None,
            failed_log_path: None,
        }
    }

    /// Resolved path of the created-records log
    pub fn created_log_path(&self) -> PathBuf {
        self.created_log_path.clone().unwrap_or_else(|| {
            self.logs_location
                .join("record_importer_created_records.jsonl")
        })
    }

    /// Resolved path of the failed-records set
    pub fn failed_log_path(&self) -> PathBuf {
        self.failed_log_path.clone().unwrap_or_else(|| {
            self.logs_location
                .join("record_importer_failed_records.jsonl")
        })
    }

    fn validate(&self) -> Result<(), String> {
        if self.logs_location.as_os_str().is_empty() {
            return Err("ledger.logs_location cannot be empty".to_string());
        }
        if self.created_log_path() == self.failed_log_path() {
            return Err(
                "ledger.created_log_path and ledger.failed_log_path must differ".to_string(),
            );
        }
        Ok(())
    }
}

/// Retry configuration for target-store requests
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of retry attempts
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,

    /// Initial delay in milliseconds
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,

    /// Maximum delay in milliseconds
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    /// Backoff multiplier
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            backoff_multiplier: default_backoff_multiplier(),
        }
    }
}

impl RetryConfig {
    fn validate(&self) -> Result<(), String> {
        if self.max_retries > 10 {
            return Err("store.retry.max_retries must be <= 10".to_string());
        }
        if self.initial_delay_ms > self.max_delay_ms {
            return Err(
                "store.retry.initial_delay_ms must not exceed store.retry.max_delay_ms".to_string(),
            );
        }
        if self.backoff_multiplier < 1.0 {
            return Err("store.retry.backoff_multiplier must be >= 1.0".to_string());
        }
        Ok(())
    }
}

/// Target store connection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Base URL of the target store (e.g. `https://works.example.org`)
    pub base_url: String,

    /// Admin API token
    /// Stored securely in memory and automatically zeroized on drop
    pub api_token: SecretString,

    /// Email of the importing admin account
    pub admin_email: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// TLS certificate verification enabled
    #[serde(default = "default_true")]
    pub tls_verify: bool,

    /// Retry policy for transient failures
    #[serde(default)]
    pub retry: RetryConfig,
}

impl StoreConfig {
    fn validate(&self, environment: &Environment) -> Result<(), String> {
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(format!(
                "store.base_url must start with http:// or https://, got '{}'",
                self.base_url
            ));
        }
        url::Url::parse(&self.base_url)
            .map_err(|e| format!("store.base_url is not a valid URL: {e}"))?;

        if self.api_token.expose_secret().is_empty() {
            return Err("store.api_token cannot be empty".to_string());
        }

        if !self.admin_email.contains('@') {
            return Err(format!(
                "store.admin_email must be an email address, got '{}'",
                self.admin_email
            ));
        }

        if self.timeout_seconds == 0 {
            return Err("store.timeout_seconds must be greater than 0".to_string());
        }

        if !self.tls_verify && *environment == Environment::Production {
            return Err(
                "TLS certificate verification cannot be disabled in production".to_string(),
            );
        }

        self.retry.validate()
    }
}

/// Community and user provisioning defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvisioningConfig {
    /// Identity provider assumed when an owner directive names none
    #[serde(default = "default_origin")]
    pub default_origin: String,

    /// Identifier scheme used by `--use-sourceids` when `--scheme` is absent
    #[serde(default = "default_scheme")]
    pub default_scheme: String,

    /// Visibility of communities created on demand
    #[serde(default = "default_community_visibility")]
    pub community_visibility: String,

    /// Type of communities created on demand
    #[serde(default = "default_community_type")]
    pub community_type: String,
}

impl Default for ProvisioningConfig {
    fn default() -> Self {
        Self {
            default_origin: default_origin(),
            default_scheme: default_scheme(),
            community_visibility: default_community_visibility(),
            community_type: default_community_type(),
        }
    }
}

impl ProvisioningConfig {
    fn validate(&self) -> Result<(), String> {
        if self.default_origin.trim().is_empty() {
            return Err("provisioning.default_origin cannot be empty".to_string());
        }
        if self.default_scheme.trim().is_empty() {
            return Err("provisioning.default_scheme cannot be empty".to_string());
        }
        let valid_visibility = ["public", "restricted"];
        if !valid_visibility.contains(&self.community_visibility.as_str()) {
            return Err(format!(
                "Invalid provisioning.community_visibility '{}'. Must be one of: {}",
                self.community_visibility,
                valid_visibility.join(", ")
            ));
        }
        Ok(())
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local file logging
    #[serde(default = "default_true")]
    pub local_enabled: bool,

    /// Directory for the log file (defaults to `ledger.logs_location`)
    #[serde(default)]
    pub local_path: Option<PathBuf>,

    /// Log rotation strategy
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }
        if self
            .local_path
            .as_deref()
            .is_some_and(|p| p == Path::new(""))
        {
            return Err("logging.local_path cannot be empty".to_string());
        }
        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: true,
            local_path: None,
            local_rotation: default_local_rotation(),
        }
    }
}

// Default value functions

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_logs_location() -> PathBuf {
    PathBuf::from("logs")
}

fn default_timeout_seconds() -> u64 {
    60
}

fn default_max_retries() -> usize {
    3
}

fn default_initial_delay_ms() -> u64 {
    1000
}

fn default_max_delay_ms() -> u64 {
    30000
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_origin() -> String {
    "knowledgeCommons".to_string()
}

fn default_scheme() -> String {
    "hclegacy-pid".to_string()
}

fn default_community_visibility() -> String {
    "public".to_string()
}

fn default_community_type() -> String {
    "organization".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}
