//! Wire models for the target store's REST API

use crate::adapters::store::traits::ExistingRecord;
use crate::domain::ids::{CommunityId, RecordId, UserId};
use crate::domain::{Community, ImportedUser, StoreError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Search envelope (`{"hits": {"hits": [...], "total": n}}`)
#[derive(Debug, Deserialize)]
pub struct SearchResponse<T> {
    pub hits: SearchHits<T>,
}

#[derive(Debug, Deserialize)]
pub struct SearchHits<T> {
    #[serde(default = "Vec::new")]
    pub hits: Vec<T>,
}

impl<T> SearchResponse<T> {
    /// First hit, if any
    pub fn into_first(self) -> Option<T> {
        self.hits.hits.into_iter().next()
    }
}

#[derive(Debug, Deserialize)]
pub struct RecordHit {
    #[serde(deserialize_with = "id_as_string")]
    pub id: String,

    #[serde(default)]
    pub is_published: bool,

    #[serde(default)]
    pub parent: Option<ParentHit>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ParentHit {
    #[serde(default)]
    pub communities: Option<ParentCommunities>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ParentCommunities {
    #[serde(default)]
    pub ids: Vec<String>,
}

impl TryFrom<RecordHit> for ExistingRecord {
    type Error = StoreError;

    fn try_from(hit: RecordHit) -> Result<Self, Self::Error> {
        let communities = hit
            .parent
            .and_then(|p| p.communities)
            .map(|c| c.ids)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|id| CommunityId::new(id).ok())
            .collect();

        Ok(ExistingRecord {
            id: RecordId::new(hit.id).map_err(StoreError::InvalidResponse)?,
            is_published: hit.is_published,
            communities,
        })
    }
}

/// Body of draft create/read responses
#[derive(Debug, Deserialize)]
pub struct DraftResponse {
    #[serde(deserialize_with = "id_as_string")]
    pub id: String,
}

/// Body of a publish response
#[derive(Debug, Deserialize)]
pub struct PublishResponse {
    #[serde(deserialize_with = "id_as_string")]
    pub id: String,

    pub created: DateTime<Utc>,
}

/// Body of a review submission response
#[derive(Debug, Deserialize)]
pub struct ReviewResponse {
    #[serde(default)]
    pub id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CommunityResponse {
    #[serde(deserialize_with = "id_as_string")]
    pub id: String,

    pub slug: String,

    #[serde(default)]
    pub metadata: Option<CommunityMetadata>,

    #[serde(default)]
    pub parent: Option<CommunityParent>,
}

#[derive(Debug, Deserialize)]
pub struct CommunityMetadata {
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CommunityParent {
    #[serde(deserialize_with = "id_as_string")]
    pub id: String,
}

impl TryFrom<CommunityResponse> for Community {
    type Error = StoreError;

    fn try_from(resp: CommunityResponse) -> Result<Self, Self::Error> {
        Ok(Community {
            id: CommunityId::new(resp.id).map_err(StoreError::InvalidResponse)?,
            slug: resp.slug,
            title: resp.metadata.and_then(|m| m.title),
            parent: resp.parent.and_then(|p| CommunityId::new(p.id).ok()),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct UserResponse {
    #[serde(deserialize_with = "id_as_string")]
    pub id: String,

    pub email: String,

    #[serde(default)]
    pub profile: Option<UserProfile>,
}

#[derive(Debug, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub full_name: Option<String>,
}

impl TryFrom<UserResponse> for ImportedUser {
    type Error = StoreError;

    fn try_from(resp: UserResponse) -> Result<Self, Self::Error> {
        Ok(ImportedUser {
            id: UserId::new(resp.id).map_err(StoreError::InvalidResponse)?,
            email: resp.email,
            full_name: resp.profile.and_then(|p| p.full_name),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct AggregationResponse {
    #[serde(default)]
    pub aggregated: usize,
}

/// Store ids are strings for records and numbers for users
fn id_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {other}"
        ))),
    }
}
