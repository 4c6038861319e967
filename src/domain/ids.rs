//! Domain identifier types with validation
//!
//! This module provides newtype wrappers for the identifiers the importer
//! handles. Each type ensures type safety and validates its format.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// DOI newtype wrapper
///
/// The DOI is the natural dedup key for target-store records: at most one
/// record may carry a given DOI after a successful run.
///
/// # Examples
///
/// ```
/// use record_importer::domain::ids::Doi;
/// use std::str::FromStr;
///
/// let doi = Doi::from_str("10.17613/abc-123").unwrap();
/// assert_eq!(doi.prefix(), "10.17613");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Doi(String);

impl Doi {
    /// Creates a new Doi from a string
    ///
    /// A `https://doi.org/` or `doi:` prefix is stripped. The remaining
    /// value must look like `10.<registrant>/<suffix>`.
    pub fn new(doi: impl Into<String>) -> Result<Self, String> {
        let doi = doi.into();
        let trimmed = doi.trim();
        let bare = trimmed
            .strip_prefix("https://doi.org/")
            .or_else(|| trimmed.strip_prefix("doi:"))
            .unwrap_or(trimmed);

        if bare.is_empty() {
            return Err("DOI cannot be empty".to_string());
        }

        match bare.split_once('/') {
            Some((prefix, suffix)) if prefix.starts_with("10.") && !suffix.is_empty() => {
                Ok(Self(bare.to_string()))
            }
            _ => Err(format!(
                "Invalid DOI format. Expected format: 10.<registrant>/<suffix>, got: {doi}"
            )),
        }
    }

    /// Returns the DOI as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Registrant prefix (the part before the first `/`)
    pub fn prefix(&self) -> &str {
        self.0.split('/').next().unwrap_or(&self.0)
    }
}

impl fmt::Display for Doi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Doi {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Doi {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Doi> for String {
    fn from(doi: Doi) -> Self {
        doi.0
    }
}

impl AsRef<str> for Doi {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// Opaque target-store identifiers only need to be non-empty.
macro_rules! opaque_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            #[doc = concat!("Creates a new ", $label, " from a string")]
            pub fn new(id: impl Into<String>) -> Result<Self, String> {
                let id = id.into();
                if id.trim().is_empty() {
                    return Err(format!("{} cannot be empty", $label));
                }
                Ok(Self(id))
            }

            #[doc = concat!("Returns the ", $label, " as a string slice")]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consumes self and returns the inner String
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

opaque_id!(
    /// Target-store record identifier (e.g. `abcd-1234`)
    RecordId,
    "Record ID"
);

opaque_id!(
    /// Target-store community identifier (a UUID in practice)
    CommunityId,
    "Community ID"
);

opaque_id!(
    /// Target-store user identifier
    UserId,
    "User ID"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_doi_valid() {
        let doi = Doi::new("10.17613/xyz-42").unwrap();
        assert_eq!(doi.as_str(), "10.17613/xyz-42");
        assert_eq!(doi.prefix(), "10.17613");
    }

    #[test]
    fn test_doi_strips_resolver_prefix() {
        let doi = Doi::new("https://doi.org/10.17613/xyz-42").unwrap();
        assert_eq!(doi.as_str(), "10.17613/xyz-42");

        let doi = Doi::new("doi:10.17613/xyz-42").unwrap();
        assert_eq!(doi.as_str(), "10.17613/xyz-42");
    }

    #[test]
    fn test_doi_invalid() {
        assert!(Doi::new("").is_err());
        assert!(Doi::new("   ").is_err());
        assert!(Doi::new("11.17613/xyz").is_err());
        assert!(Doi::new("10.17613").is_err());
        assert!(Doi::new("10.17613/").is_err());
    }

    #[test]
    fn test_doi_serde_validates() {
        let doi: Doi = serde_json::from_str("\"10.1000/abc\"").unwrap();
        assert_eq!(doi.as_str(), "10.1000/abc");
        assert!(serde_json::from_str::<Doi>("\"not-a-doi\"").is_err());
    }

    #[test]
    fn test_opaque_ids() {
        let record_id = RecordId::new("abcd-1234").unwrap();
        assert_eq!(record_id.to_string(), "abcd-1234");
        assert!(RecordId::new("").is_err());
        assert!(CommunityId::from_str(" ").is_err());
        assert_eq!(UserId::new("42").unwrap().into_inner(), "42");
    }
}
