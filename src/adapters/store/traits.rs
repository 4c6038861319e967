//! Target-store capability traits
//!
//! The load orchestrator and the provisioning subsystem are written against
//! these traits only. [`super::StoreHttpClient`] implements all of them
//! against the store's REST API; tests substitute an in-memory store.

use crate::domain::ids::{CommunityId, Doi, RecordId, UserId};
use crate::domain::{Community, IdentityLink, ImportedUser, NewCommunity, NewUser, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A record already present in the target store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExistingRecord {
    /// Store record id
    pub id: RecordId,

    /// Whether the record has a published version (false for a bare draft)
    pub is_published: bool,

    /// Communities the record already belongs to
    pub communities: Vec<CommunityId>,
}

/// A record version returned by a publish
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedRecord {
    /// Store record id
    pub id: RecordId,

    /// Creation timestamp reported by the store
    pub created: DateTime<Utc>,
}

/// A local file ready for upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    /// Key the file is stored under (possibly cleaned)
    pub key: String,

    /// Absolute local path
    pub path: PathBuf,

    /// Size in bytes
    pub size: u64,
}

/// Result reported by the aggregation service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregationReport {
    /// Number of records the service aggregated
    pub record_count: usize,

    /// First day of the window
    pub start_date: NaiveDate,

    /// Last day of the window
    pub end_date: NaiveDate,
}

/// Record write API of the target store
#[async_trait]
pub trait RecordStoreClient: Send + Sync {
    /// Looks up the record carrying `doi`, published or draft
    async fn find_by_doi(&self, doi: &Doi) -> Result<Option<ExistingRecord>>;

    /// Creates a new draft from `payload` and returns its id
    async fn create_draft(&self, payload: &serde_json::Value) -> Result<RecordId>;

    /// Opens a new draft for an already-published record
    async fn edit_published(&self, id: &RecordId) -> Result<()>;

    /// Replaces the draft's metadata with `payload`
    async fn update_draft(&self, id: &RecordId, payload: &serde_json::Value) -> Result<()>;

    /// Uploads `files` to the draft, replacing files with the same key
    async fn upload_files(&self, id: &RecordId, files: &[UploadFile]) -> Result<()>;

    /// Submits the draft to `community`
    async fn submit_to_community(&self, id: &RecordId, community: &CommunityId) -> Result<()>;

    /// Publishes the current draft
    async fn publish(&self, id: &RecordId) -> Result<PublishedRecord>;

    /// Reassigns ownership of the record to `owner`
    async fn transfer_ownership(&self, id: &RecordId, owner: &UserId) -> Result<()>;

    /// Deletes the record
    async fn delete_record(&self, id: &RecordId) -> Result<()>;
}

/// Community API of the target store
#[async_trait]
pub trait CommunityService: Send + Sync {
    /// Finds a community by slug or UUID
    async fn find_community(&self, reference: &str) -> Result<Option<Community>>;

    /// Creates a community
    async fn create_community(&self, request: &NewCommunity) -> Result<Community>;

    /// Adds `user` as an owner of `community`
    async fn add_community_owner(&self, community: &CommunityId, user: &UserId) -> Result<()>;
}

/// User account API of the target store
#[async_trait]
pub trait UserService: Send + Sync {
    /// Finds the user linked to an external identity
    async fn find_user_by_identity(&self, link: &IdentityLink) -> Result<Option<ImportedUser>>;

    /// Finds a user by email
    async fn find_user_by_email(&self, email: &str) -> Result<Option<ImportedUser>>;

    /// Creates a user account
    async fn create_user(&self, request: &NewUser) -> Result<ImportedUser>;
}

/// External identity linking
#[async_trait]
pub trait IdentityLinkService: Send + Sync {
    /// Attaches `link` to `user`
    async fn link_identity(&self, user: &UserId, link: &IdentityLink) -> Result<()>;
}

/// Usage-statistics aggregation
#[async_trait]
pub trait AggregationService: Send + Sync {
    /// Recomputes statistics for `records` over `[start, end]`
    async fn aggregate(
        &self,
        records: &[RecordId],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<AggregationReport>;
}
