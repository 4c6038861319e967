//! Community domain model
//!
//! Communities group records in the target store. The importer looks them
//! up by slug and creates missing ones with a default policy.

use super::ids::CommunityId;
use serde::{Deserialize, Serialize};

/// A community that exists in the target store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Community {
    /// Store-assigned identifier (a UUID)
    pub id: CommunityId,

    /// URL slug, unique per store
    pub slug: String,

    /// Display title
    #[serde(default)]
    pub title: Option<String>,

    /// Identifier of the parent community for sub-communities
    #[serde(default)]
    pub parent: Option<CommunityId>,
}

impl Community {
    /// Creates a top-level community value
    pub fn new(id: CommunityId, slug: impl Into<String>) -> Self {
        Self {
            id,
            slug: slug.into(),
            title: None,
            parent: None,
        }
    }
}

/// Request to create a community
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCommunity {
    /// URL slug
    pub slug: String,

    /// Display title
    pub title: String,

    /// `public` or `restricted`
    pub visibility: String,

    /// Community type (e.g. `organization`, `topic`)
    pub community_type: String,

    /// Parent community for sub-communities
    pub parent: Option<CommunityId>,
}

impl NewCommunity {
    /// Returns a builder for a community creation request
    pub fn builder(slug: impl Into<String>) -> NewCommunityBuilder {
        NewCommunityBuilder {
            slug: slug.into(),
            ..NewCommunityBuilder::default()
        }
    }
}

/// Builder for [`NewCommunity`]
#[derive(Debug, Default)]
pub struct NewCommunityBuilder {
    slug: String,
    title: Option<String>,
    visibility: Option<String>,
    community_type: Option<String>,
    parent: Option<CommunityId>,
}

impl NewCommunityBuilder {
    /// Sets the display title (defaults to the slug)
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets the visibility
    pub fn visibility(mut self, visibility: impl Into<String>) -> Self {
        self.visibility = Some(visibility.into());
        self
    }

    /// Sets the community type
    pub fn community_type(mut self, community_type: impl Into<String>) -> Self {
        self.community_type = Some(community_type.into());
        self
    }

    /// Places the new community beneath `parent`
    pub fn parent(mut self, parent: CommunityId) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Builds the request
    ///
    /// # Errors
    ///
    /// Returns an error if the slug is empty
    pub fn build(self) -> Result<NewCommunity, String> {
        let slug = self.slug.trim().to_string();
        if slug.is_empty() {
            return Err("community slug is required".to_string());
        }
        Ok(NewCommunity {
            title: self.title.unwrap_or_else(|| slug.clone()),
            slug,
            visibility: self.visibility.unwrap_or_else(|| "public".to_string()),
            community_type: self
                .community_type
                .unwrap_or_else(|| "organization".to_string()),
            parent: self.parent,
        })
    }
}

/// Whether a community reference is a store UUID rather than a slug
pub fn is_community_uuid(reference: &str) -> bool {
    uuid::Uuid::parse_str(reference.trim()).is_ok()
}
