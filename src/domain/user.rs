//! Imported user domain model

use super::ids::UserId;
use serde::{Deserialize, Serialize};

/// A user account in the target store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportedUser {
    /// Store-assigned identifier
    pub id: UserId,

    /// Account email
    pub email: String,

    /// Display name from the user profile
    #[serde(default)]
    pub full_name: Option<String>,
}

/// External identity attached to a store user
///
/// `(origin, source_username)` is the natural key used to find a user
/// again on later runs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdentityLink {
    /// Identity provider name
    pub origin: String,

    /// Username at that provider
    pub source_username: String,
}

impl IdentityLink {
    /// Creates a new identity link
    pub fn new(origin: impl Into<String>, source_username: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            source_username: source_username.into(),
        }
    }
}

/// Request to create a store user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    /// Account email
    pub email: String,

    /// Profile display name
    pub full_name: Option<String>,

    /// Preferred username in the store
    pub username: Option<String>,
}

impl NewUser {
    /// Creates a request for `email`
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            full_name: None,
            username: None,
        }
    }

    /// Sets the display name
    pub fn with_full_name(mut self, full_name: Option<String>) -> Self {
        self.full_name = full_name.filter(|n| !n.trim().is_empty());
        self
    }

    /// Sets the preferred username
    pub fn with_username(mut self, username: Option<String>) -> Self {
        self.username = username.filter(|n| !n.trim().is_empty());
        self
    }
}

/// Result of resolving a user on demand
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserResolution {
    /// The user was created by this call
    Created(ImportedUser),
    /// The user was already present
    Existing(ImportedUser),
}

impl UserResolution {
    /// The resolved user
    pub fn user(&self) -> &ImportedUser {
        match self {
            UserResolution::Created(user) | UserResolution::Existing(user) => user,
        }
    }

    /// Consumes self and returns the user
    pub fn into_user(self) -> ImportedUser {
        match self {
            UserResolution::Created(user) | UserResolution::Existing(user) => user,
        }
    }

    /// Whether the user already existed
    pub fn already_existed(&self) -> bool {
        matches!(self, UserResolution::Existing(_))
    }
}
