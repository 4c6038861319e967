//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::ImporterConfig;
use super::secret_string;
use crate::domain::errors::ImporterError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into ImporterConfig
/// 4. Applies environment variable overrides (RECORD_IMPORTER_* names)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns [`ImporterError::Configuration`] if the file cannot be read or
/// parsed, a referenced environment variable is unset, or validation fails.
///
/// # Examples
///
/// ```no_run
/// use record_importer::config::loader::load_config;
///
/// let config = load_config("importer.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<ImporterConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ImporterError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        ImporterError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let mut config: ImporterConfig = toml::from_str(&contents)
        .map_err(|e| ImporterError::Configuration(format!("Failed to parse TOML: {e}")))?;

    apply_env_overrides(&mut config);

    config.validate().map_err(|e| {
        ImporterError::Configuration(format!("Configuration validation failed: {e}"))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are copied unchanged.
///
/// # Errors
///
/// Returns an error listing every referenced variable that is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| ImporterError::Configuration(format!("Invalid substitution pattern: {e}")))?;
    let mut lines = Vec::new();
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            lines.push(line.to_string());
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    processed_line = processed_line.replace(&format!("${{{var_name}}}"), &value);
                }
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        lines.push(processed_line);
    }

    if !missing_vars.is_empty() {
        return Err(ImporterError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(lines.join("\n"))
}

/// Applies environment variable overrides using the RECORD_IMPORTER_* names
fn apply_env_overrides(config: &mut ImporterConfig) {
    let var = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());
    let path_var = |name: &str| var(name).map(PathBuf::from);

    if let Some(val) = var("RECORD_IMPORTER_LOG_LEVEL") {
        config.application.log_level = val;
    }

    // Dataset
    if let Some(val) = path_var("RECORD_IMPORTER_DATA_DIR") {
        config.dataset.data_dir = val;
    }
    if let Some(val) = path_var("RECORD_IMPORTER_SERIALIZED_PATH") {
        config.dataset.serialized_path = Some(val);
    }
    if let Some(val) = path_var("RECORD_IMPORTER_RAW_PATH") {
        config.dataset.raw_path = Some(val);
    }
    if let Some(val) = path_var("RECORD_IMPORTER_FILES_LOCATION") {
        config.dataset.files_location = Some(val);
    }

    // Ledger
    if let Some(val) = path_var("RECORD_IMPORTER_LOGS_LOCATION") {
        config.ledger.logs_location = val;
    }
    if let Some(val) = path_var("RECORD_IMPORTER_CREATED_LOG_PATH") {
        config.ledger.created_log_path = Some(val);
    }
    if let Some(val) = path_var("RECORD_IMPORTER_FAILED_LOG_PATH") {
        config.ledger.failed_log_path = Some(val);
    }

    // Store
    if let Some(val) = var("RECORD_IMPORTER_BASE_URL") {
        config.store.base_url = val;
    }
    if let Some(val) = var("RECORD_IMPORTER_API_TOKEN") {
        config.store.api_token = secret_string(val);
    }
    if let Some(val) = var("RECORD_IMPORTER_ADMIN_EMAIL") {
        config.store.admin_email = val;
    }
}
