//! CLI command implementations
//!
//! Every command returns its process exit code:
//!
//! | Code | Meaning |
//! |------|---------|
//! | 0 | Success |
//! | 1 | Completed, but some records or entries failed |
//! | 2 | Usage or configuration error |
//! | 3 | An explicit locator did not resolve |
//! | 4 | Target store unreachable or rejected the connection |
//! | 5 | Fatal error |

pub mod count;
pub mod create_user;
pub mod delete;
pub mod init;
pub mod load;
pub mod read;
pub mod status;
pub mod validate;

use crate::adapters::store::{StoreHttpClient, StoreServices};
use crate::config::{load_config, ImporterConfig};
use crate::core::selector::Selection;
use crate::domain::ImporterError;
use std::sync::Arc;

/// Exit code for an error that ended a command
pub fn exit_code_for(err: &ImporterError) -> i32 {
    match err {
        ImporterError::Configuration(_) | ImporterError::Usage(_) => 2,
        ImporterError::NotFound(_) => 3,
        ImporterError::Store(_) => 4,
        _ => 5,
    }
}

/// Loads the configuration, printing the error on failure
fn load_or_report(config_path: &str) -> Result<ImporterConfig, i32> {
    load_config(config_path).map_err(|e| {
        tracing::error!(error = %e, "Failed to load configuration");
        eprintln!("❌ Failed to load configuration file");
        eprintln!("   Error: {e}");
        2
    })
}

/// Builds the HTTP store client, printing the error on failure
fn connect_or_report(config: &ImporterConfig) -> Result<StoreServices, i32> {
    StoreHttpClient::new(config.store.clone())
        .map(|client| StoreServices::from_backend(Arc::new(client)))
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to create store client");
            eprintln!("❌ Failed to create target store client");
            eprintln!("   Error: {e}");
            4
        })
}

/// Parses locator tokens, printing usage errors
///
/// `--scheme` selects the source-id scheme and only has an effect together
/// with `--use-sourceids`.
fn selection_or_report(
    tokens: &[String],
    use_sourceids: bool,
    scheme: Option<&str>,
    default_scheme: &str,
) -> Result<Selection, i32> {
    if scheme.is_some() && !use_sourceids {
        tracing::warn!("--scheme has no effect without --use-sourceids");
    }
    let source_scheme = use_sourceids.then(|| scheme.unwrap_or(default_scheme));

    Selection::parse(tokens, source_scheme).map_err(|e| {
        eprintln!("❌ {e}");
        exit_code_for(&e)
    })
}

/// Prints an error that ended a command and returns its exit code
fn report(context: &str, err: &ImporterError) -> i32 {
    tracing::error!(error = %err, "{context}");
    eprintln!("❌ {context}");
    eprintln!("   Error: {err}");
    exit_code_for(err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::StoreError;

    #[test]
    fn test_exit_codes() {
        assert_eq!(exit_code_for(&ImporterError::Usage("x".into())), 2);
        assert_eq!(exit_code_for(&ImporterError::NotFound("x".into())), 3);
        assert_eq!(
            exit_code_for(&ImporterError::Store(StoreError::Timeout("x".into()))),
            4
        );
        assert_eq!(exit_code_for(&ImporterError::Ledger("x".into())), 5);
    }

    #[test]
    fn test_selection_source_ids_use_default_scheme() {
        let tokens = vec!["hc:1".to_string()];
        let selection = selection_or_report(&tokens, true, None, "hclegacy-pid").unwrap();
        assert_eq!(
            selection,
            Selection::SourceIds {
                scheme: "hclegacy-pid".to_string(),
                identifiers: vec!["hc:1".to_string()],
            }
        );
    }

    #[test]
    fn test_selection_range_with_source_ids_is_usage_error() {
        let tokens = vec!["2-5".to_string()];
        assert_eq!(selection_or_report(&tokens, true, None, "doi"), Err(2));
    }

    #[test]
    fn test_usage_errors_need_no_configuration() {
        let non_numeric = vec!["abc".to_string()];
        assert_eq!(selection_or_report(&non_numeric, false, None, ""), Err(2));

        let mixed = vec!["2-5".to_string(), "7".to_string()];
        assert_eq!(selection_or_report(&mixed, false, None, ""), Err(2));

        // Source ids parse without a scheme and take the default later
        let ids = vec!["hc:9".to_string()];
        let selection = selection_or_report(&ids, true, None, "").unwrap();
        assert_eq!(
            selection.with_default_scheme("hclegacy-pid"),
            Selection::SourceIds {
                scheme: "hclegacy-pid".to_string(),
                identifiers: ids,
            }
        );
    }
}
