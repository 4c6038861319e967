//! Domain error types
//!
//! This module defines the error hierarchy for the importer. All errors are
//! domain-specific and don't expose third-party types.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Main importer error type
///
/// This is the primary error type used throughout the application.
/// It wraps specific error types and provides context for error handling.
#[derive(Debug, Error)]
pub enum ImporterError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Invalid combination of command-line arguments
    #[error("Usage error: {0}")]
    Usage(String),

    /// A locator did not resolve to a record in the dataset
    #[error("Not found: {0}")]
    NotFound(String),

    /// Serialized payload could not be read or failed validation
    #[error("Fetch failed: {0}")]
    FetchFailed(String),

    /// The target store rejected a create or update
    #[error("Write failed: {0}")]
    WriteFailed(String),

    /// Community or user dependency resolution failed
    #[error("Provisioning failed: {0}")]
    ProvisioningFailed(String),

    /// Target store errors
    #[error("Target store error: {0}")]
    Store(#[from] StoreError),

    /// Outcome ledger errors
    #[error("Ledger error: {0}")]
    Ledger(String),

    /// Aggregation service errors
    #[error("Aggregation error: {0}")]
    Aggregation(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

/// Target store errors
///
/// Errors that occur when talking to the target store's REST API.
/// These errors don't expose third-party HTTP client types.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Failed to connect to the store
    #[error("Failed to connect to target store: {0}")]
    ConnectionFailed(String),

    /// Token rejected
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Entity not found (404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Client error (4xx)
    #[error("Client error: {status} - {message}")]
    ClientError { status: u16, message: String },

    /// Server error (5xx)
    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    /// Rate limit exceeded (429)
    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    /// Response body could not be interpreted
    #[error("Invalid response from server: {0}")]
    InvalidResponse(String),

    /// Timeout
    #[error("Request timeout: {0}")]
    Timeout(String),
}

impl StoreError {
    /// Whether retrying the same request may succeed
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            StoreError::ConnectionFailed(_)
                | StoreError::ServerError { .. }
                | StoreError::RateLimited(_)
                | StoreError::Timeout(_)
        )
    }
}

impl ImporterError {
    /// Whether a transient store failure caused this error
    pub fn is_transient(&self) -> bool {
        matches!(self, ImporterError::Store(e) if e.is_transient())
    }
}

/// Classification of a per-record failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadErrorKind {
    /// Payload unreadable or invalid
    FetchFailed,
    /// Target store rejected the create/update
    WriteFailed,
    /// Community or user could not be resolved
    ProvisioningFailed,
}

impl LoadErrorKind {
    /// Whether a retry can succeed without fixing the dataset
    pub fn is_retryable(&self) -> bool {
        !matches!(self, LoadErrorKind::FetchFailed)
    }
}

impl fmt::Display for LoadErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LoadErrorKind::FetchFailed => "fetch_failed",
            LoadErrorKind::WriteFailed => "write_failed",
            LoadErrorKind::ProvisioningFailed => "provisioning_failed",
        };
        f.write_str(name)
    }
}

/// Stage of the per-record pipeline at which a failure happened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadStage {
    Fetch,
    ExistsCheck,
    Provision,
    Write,
    OwnershipTransfer,
}

impl fmt::Display for LoadStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LoadStage::Fetch => "fetch",
            LoadStage::ExistsCheck => "exists_check",
            LoadStage::Provision => "provision",
            LoadStage::Write => "write",
            LoadStage::OwnershipTransfer => "ownership_transfer",
        };
        f.write_str(name)
    }
}

/// Per-record error details
///
/// Captured inside a load outcome rather than propagated, so one bad
/// record does not abort the run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadErrorDetail {
    /// Failure classification
    pub kind: LoadErrorKind,

    /// Pipeline stage that failed
    pub stage: LoadStage,

    /// Error message
    pub message: String,
}

impl LoadErrorDetail {
    /// Creates a new error detail
    pub fn new(kind: LoadErrorKind, stage: LoadStage, message: impl Into<String>) -> Self {
        Self {
            kind,
            stage,
            message: message.into(),
        }
    }

    /// Classifies an importer error raised at `stage`
    pub fn from_error(stage: LoadStage, err: &ImporterError) -> Self {
        let kind = match err {
            ImporterError::FetchFailed(_) | ImporterError::NotFound(_) => {
                LoadErrorKind::FetchFailed
            }
            ImporterError::ProvisioningFailed(_) => LoadErrorKind::ProvisioningFailed,
            _ => match stage {
                LoadStage::Fetch => LoadErrorKind::FetchFailed,
                LoadStage::Provision => LoadErrorKind::ProvisioningFailed,
                _ => LoadErrorKind::WriteFailed,
            },
        };
        Self::new(kind, stage, err.to_string())
    }

    /// Whether the failure can be retried without fixing the dataset
    pub fn retryable(&self) -> bool {
        self.kind.is_retryable()
    }
}

impl fmt::Display for LoadErrorDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}: {}", self.kind, self.stage, self.message)
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for ImporterError {
    fn from(err: std::io::Error) -> Self {
        ImporterError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for ImporterError {
    fn from(err: serde_json::Error) -> Self {
        ImporterError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for ImporterError {
    fn from(err: toml::de::Error) -> Self {
        ImporterError::Configuration(format!("TOML parse error: {err}"))
    }
}
