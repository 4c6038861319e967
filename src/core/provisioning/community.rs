//! Community resolution and ownership assignment

use crate::adapters::store::CommunityService;
use crate::config::ProvisioningConfig;
use crate::domain::community::is_community_uuid;
use crate::domain::ids::{CommunityId, UserId};
use crate::domain::record::CommunityDirective;
use crate::domain::{Community, ImporterError, NewCommunity, Result};
use std::sync::Arc;

/// Community a record is to be submitted to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCommunity {
    /// The sub-community if one was declared, otherwise the domain community
    pub community: Community,

    /// Slugs of the communities created by this resolution
    pub created: Vec<String>,
}

/// Result of one community-ownership assignment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnershipAssignment {
    /// Community reference as given (slug or UUID)
    pub reference: String,

    /// Resolved community id on success
    pub community: Option<CommunityId>,

    /// Failure message
    pub error: Option<String>,
}

impl OwnershipAssignment {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Resolves and creates communities on demand
pub struct CommunityProvisioner {
    service: Arc<dyn CommunityService>,
    config: ProvisioningConfig,
}

impl CommunityProvisioner {
    pub fn new(service: Arc<dyn CommunityService>, config: ProvisioningConfig) -> Self {
        Self { service, config }
    }

    /// Ensures the directive's domain community and sub-community exist
    ///
    /// The domain community is created first; a sub-community is created
    /// beneath it. A community created before a later step fails is left in
    /// place.
    ///
    /// # Errors
    ///
    /// Returns [`ImporterError::ProvisioningFailed`] if a lookup or create
    /// fails, or the directive names no domain community.
    pub async fn ensure(&self, directive: &CommunityDirective) -> Result<ResolvedCommunity> {
        let Some(domain_slug) = directive.domain.as_deref() else {
            return Err(ImporterError::ProvisioningFailed(
                "community directive has no domain community".to_string(),
            ));
        };

        let mut created = Vec::new();
        let domain = self.find_or_create(domain_slug, None, &mut created).await?;

        let community = match directive.sub_community.as_deref() {
            Some(sub_slug) => {
                self.find_or_create(sub_slug, Some(domain.id.clone()), &mut created)
                    .await?
            }
            None => domain,
        };

        Ok(ResolvedCommunity { community, created })
    }

    async fn find_or_create(
        &self,
        slug: &str,
        parent: Option<CommunityId>,
        created: &mut Vec<String>,
    ) -> Result<Community> {
        let existing = self.service.find_community(slug).await.map_err(|e| {
            ImporterError::ProvisioningFailed(format!("community lookup for '{slug}': {e}"))
        })?;
        if let Some(community) = existing {
            return Ok(community);
        }

        let mut builder = NewCommunity::builder(slug)
            .visibility(&self.config.community_visibility)
            .community_type(&self.config.community_type);
        if let Some(parent) = parent {
            builder = builder.parent(parent);
        }
        let request = builder
            .build()
            .map_err(|e| ImporterError::ProvisioningFailed(format!("community '{slug}': {e}")))?;

        let community = self.service.create_community(&request).await.map_err(|e| {
            ImporterError::ProvisioningFailed(format!("creating community '{slug}': {e}"))
        })?;

        tracing::info!(
            slug = %community.slug,
            id = %community.id,
            parent = ?community.parent.as_ref().map(|p| p.as_str()),
            "Community created"
        );
        created.push(community.slug.clone());
        Ok(community)
    }

    /// Adds `user` as owner of each referenced community
    ///
    /// References are slugs or UUIDs. Communities are never created here:
    /// a reference that does not resolve fails that entry only.
    pub async fn assign_owner(
        &self,
        user: &UserId,
        references: &[String],
    ) -> Vec<OwnershipAssignment> {
        let mut results = Vec::with_capacity(references.len());

        for reference in references {
            let reference = reference.trim();
            let result = self.assign_one(user, reference).await;
            let assignment = match result {
                Ok(id) => OwnershipAssignment {
                    reference: reference.to_string(),
                    community: Some(id),
                    error: None,
                },
                Err(e) => {
                    tracing::warn!(community = reference, error = %e, "Ownership assignment failed");
                    OwnershipAssignment {
                        reference: reference.to_string(),
                        community: None,
                        error: Some(e.to_string()),
                    }
                }
            };
            results.push(assignment);
        }

        results
    }

    async fn assign_one(&self, user: &UserId, reference: &str) -> Result<CommunityId> {
        let kind = if is_community_uuid(reference) { "id" } else { "slug" };
        let community = self
            .service
            .find_community(reference)
            .await?
            .ok_or_else(|| {
                ImporterError::NotFound(format!("no community with {kind} '{reference}'"))
            })?;

        self.service
            .add_community_owner(&community.id, user)
            .await?;

        tracing::info!(community = %community.slug, user = %user, "Community owner added");
        Ok(community.id)
    }
}
