//! Provisioning of the communities and users a record depends on
//!
//! - [`community`] - domain/sub-community resolution and ownership assignment
//! - [`user`] - user lookup by natural key and on-demand creation

pub mod community;
pub mod user;

pub use community::{CommunityProvisioner, OwnershipAssignment, ResolvedCommunity};
pub use user::{UserProvisioner, UserRequest};

use crate::adapters::store::StoreServices;
use crate::config::ProvisioningConfig;
use crate::domain::record::SerializedRecord;
use crate::domain::{Result, UserResolution};

/// Dependencies resolved for one record
#[derive(Debug, Clone, Default)]
pub struct ProvisionedDependencies {
    /// Community to submit the record to
    pub community: Option<ResolvedCommunity>,

    /// Owner to transfer the record to once written
    pub owner: Option<UserResolution>,
}

/// Report of a `create_user` call
#[derive(Debug, Clone)]
pub struct CreateUserReport {
    pub resolution: UserResolution,
    pub assignments: Vec<OwnershipAssignment>,
}

impl CreateUserReport {
    /// Whether every requested ownership assignment succeeded
    pub fn all_assigned(&self) -> bool {
        self.assignments.iter().all(OwnershipAssignment::is_success)
    }
}

/// Provisioning subsystem
pub struct Provisioner {
    communities: CommunityProvisioner,
    users: UserProvisioner,
    default_origin: String,
}

impl Provisioner {
    pub fn new(services: &StoreServices, config: ProvisioningConfig) -> Self {
        let default_origin = config.default_origin.clone();
        Self {
            communities: CommunityProvisioner::new(services.communities.clone(), config),
            users: UserProvisioner::new(services.users.clone(), services.identities.clone()),
            default_origin,
        }
    }

    /// Identity provider assumed when none is given
    pub fn default_origin(&self) -> &str {
        &self.default_origin
    }

    /// Resolves the community and owner a record declares
    ///
    /// The community is resolved before the user; if the user step fails the
    /// whole call fails and any community created on the way is kept.
    ///
    /// # Errors
    ///
    /// Returns [`crate::domain::ImporterError::ProvisioningFailed`] if either
    /// dependency cannot be resolved.
    pub async fn provision_record(
        &self,
        record: &SerializedRecord,
    ) -> Result<ProvisionedDependencies> {
        let community = match record.community_directive() {
            Some(directive) => Some(self.communities.ensure(directive).await?),
            None => None,
        };

        let owner = match &record.owner {
            Some(owner) => {
                let request = UserRequest::from_directive(owner, &self.default_origin);
                Some(self.users.ensure(&request).await?)
            }
            None => None,
        };

        Ok(ProvisionedDependencies { community, owner })
    }

    /// Finds or creates a user, then assigns community ownership
    ///
    /// Idempotent on `(origin, source_username)`: a repeat call reports the
    /// user as already existing and still processes `community_owner`.
    ///
    /// # Errors
    ///
    /// Returns an error if the user cannot be resolved. Ownership failures
    /// are reported per community in the returned report.
    pub async fn create_user(
        &self,
        request: &UserRequest,
        community_owner: &[String],
    ) -> Result<CreateUserReport> {
        let resolution = self.users.ensure(request).await?;
        let assignments = self
            .communities
            .assign_owner(&resolution.user().id, community_owner)
            .await;

        Ok(CreateUserReport {
            resolution,
            assignments,
        })
    }
}
