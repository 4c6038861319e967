//! Domain models and types for the importer.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Strongly-typed identifiers** ([`Doi`], [`RecordId`], [`CommunityId`], [`UserId`])
//! - **Domain models** ([`SerializedRecord`], [`Community`], [`ImportedUser`])
//! - **Error types** ([`ImporterError`], [`StoreError`], [`LoadErrorDetail`])
//! - **Result type alias** ([`Result`])
//!
//! # Type Safety
//!
//! Identifiers use the newtype pattern so a store record id can never be
//! passed where a DOI is expected:
//!
//! ```rust
//! use record_importer::domain::{Doi, RecordId};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let doi = Doi::new("10.17613/abc-1")?;
//! let record_id = RecordId::new("abcd-1234")?;
//! # Ok(())
//! # }
//! ```

pub mod community;
pub mod context;
pub mod errors;
pub mod ids;
pub mod record;
pub mod result;
pub mod user;

// Re-export commonly used types for convenience
pub use community::{Community, NewCommunity};
pub use errors::{ImporterError, LoadErrorDetail, LoadErrorKind, LoadStage, StoreError};
pub use ids::{CommunityId, Doi, RecordId, UserId};
pub use record::{
    CommunityDirective, FileEntry, OwnerDirective, SerializedRecord, SourceIdentifier,
};
pub use result::Result;
pub use user::{IdentityLink, ImportedUser, NewUser, UserResolution};
