//! User resolution and creation

use crate::adapters::store::{IdentityLinkService, UserService};
use crate::domain::record::OwnerDirective;
use crate::domain::{IdentityLink, ImporterError, ImportedUser, NewUser, Result, UserResolution};
use std::sync::Arc;

/// A request to resolve (and if necessary create) a user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRequest {
    /// Identity provider of `source_username`
    pub origin: String,

    /// Username in the source system
    pub source_username: Option<String>,

    /// Email address
    pub email: Option<String>,

    /// Display name
    pub full_name: Option<String>,
}

impl UserRequest {
    /// Builds a request from a record's owner directive
    pub fn from_directive(owner: &OwnerDirective, default_origin: &str) -> Self {
        let clean = |v: &Option<String>| {
            v.as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        Self {
            origin: clean(&owner.origin).unwrap_or_else(|| default_origin.to_string()),
            source_username: clean(&owner.source_username),
            email: clean(&owner.email),
            full_name: clean(&owner.full_name),
        }
    }

    /// The `(origin, source_username)` natural key, if a username is known
    pub fn identity(&self) -> Option<IdentityLink> {
        self.source_username
            .as_ref()
            .map(|username| IdentityLink::new(&self.origin, username))
    }
}

/// Resolves users by natural key and creates them on demand
pub struct UserProvisioner {
    users: Arc<dyn UserService>,
    identities: Arc<dyn IdentityLinkService>,
}

impl UserProvisioner {
    pub fn new(users: Arc<dyn UserService>, identities: Arc<dyn IdentityLinkService>) -> Self {
        Self { users, identities }
    }

    /// Finds or creates the user described by `request`
    ///
    /// Lookup order is the `(origin, source_username)` identity, then the
    /// email. A user found by email gets the identity attached so later
    /// lookups hit the natural key. A new user is created from the email
    /// and full name and linked to the identity.
    ///
    /// # Errors
    ///
    /// Returns [`ImporterError::ProvisioningFailed`] if a store call fails
    /// or a new user would have no email.
    pub async fn ensure(&self, request: &UserRequest) -> Result<UserResolution> {
        let identity = request.identity();

        if let Some(link) = &identity {
            let found = self
                .users
                .find_user_by_identity(link)
                .await
                .map_err(|e| provisioning(format!("user lookup for {}: {e}", describe(link))))?;
            if let Some(user) = found {
                tracing::debug!(user = %user.id, "User found by identity");
                return Ok(UserResolution::Existing(user));
            }
        }

        let Some(email) = request.email.as_deref() else {
            return Err(provisioning(format!(
                "user {} not found and no email to create one",
                identity.as_ref().map(describe).unwrap_or_default()
            )));
        };

        let found = self
            .users
            .find_user_by_email(email)
            .await
            .map_err(|e| provisioning(format!("user lookup for {email}: {e}")))?;
        if let Some(user) = found {
            if let Some(link) = &identity {
                self.link(&user, link).await?;
            }
            tracing::debug!(user = %user.id, "User found by email");
            return Ok(UserResolution::Existing(user));
        }

        let new_user = NewUser::new(email)
            .with_full_name(request.full_name.clone())
            .with_username(request.source_username.clone());
        let user = self
            .users
            .create_user(&new_user)
            .await
            .map_err(|e| provisioning(format!("creating user {email}: {e}")))?;
        tracing::info!(user = %user.id, email = %user.email, "User created");

        if let Some(link) = &identity {
            self.link(&user, link).await?;
        }

        Ok(UserResolution::Created(user))
    }

    async fn link(&self, user: &ImportedUser, link: &IdentityLink) -> Result<()> {
        self.identities
            .link_identity(&user.id, link)
            .await
            .map_err(|e| provisioning(format!("linking {} to user {}: {e}", describe(link), user.id)))
    }
}

fn describe(link: &IdentityLink) -> String {
    format!("{}:{}", link.origin, link.source_username)
}

fn provisioning(message: String) -> ImporterError {
    ImporterError::ProvisioningFailed(message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_from_directive_defaults_origin() {
        let owner = OwnerDirective {
            origin: Some(" ".to_string()),
            source_username: Some("jdoe".to_string()),
            email: Some("jdoe@example.org".to_string()),
            full_name: None,
        };
        let request = UserRequest::from_directive(&owner, "knowledgeCommons");

        assert_eq!(request.origin, "knowledgeCommons");
        assert_eq!(
            request.identity(),
            Some(IdentityLink::new("knowledgeCommons", "jdoe"))
        );
    }

    #[test]
    fn test_request_without_username_has_no_identity() {
        let owner = OwnerDirective {
            email: Some("a@example.org".to_string()),
            ..Default::default()
        };
        assert!(UserRequest::from_directive(&owner, "kc").identity().is_none());
    }
}
