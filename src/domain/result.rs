//! Result type alias for the importer

use super::errors::ImporterError;

/// Result type alias for importer operations
///
/// # Examples
///
/// ```
/// use record_importer::domain::result::Result;
/// use record_importer::domain::errors::ImporterError;
///
/// fn parse_index(token: &str) -> Result<usize> {
///     token
///         .parse()
///         .map_err(|_| ImporterError::Usage(format!("not an index: {token}")))
/// }
///
/// assert!(parse_index("3").is_ok());
/// assert!(parse_index("x").is_err());
/// ```
pub type Result<T> = std::result::Result<T, ImporterError>;
