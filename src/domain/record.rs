//! Serialized record model
//!
//! A [`SerializedRecord`] is the canonical payload produced by the
//! serializer, one per dataset line. The loader treats most of it as an
//! opaque payload that is forwarded to the target store; only the DOI,
//! the source identifiers, the file list and the community/owner
//! directives are interpreted.

use crate::domain::ids::Doi;
use crate::domain::{ImporterError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Identifier of the record in a source system
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceIdentifier {
    /// Identifier scheme (e.g. `hclegacy-pid`)
    pub scheme: String,

    /// Identifier value in that scheme
    pub identifier: String,
}

impl SourceIdentifier {
    /// Creates a new source identifier
    pub fn new(scheme: impl Into<String>, identifier: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into(),
            identifier: identifier.into(),
        }
    }
}

/// One file of the record's manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    /// File name as it should appear in the target store
    pub filename: String,

    /// Path relative to the file-storage directory (defaults to `filename`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// Declared size in bytes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

impl FileEntry {
    /// Local path of the file, relative to the file-storage directory
    pub fn local_path(&self) -> &str {
        self.path.as_deref().unwrap_or(&self.filename)
    }
}

/// Community-assignment directive
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommunityDirective {
    /// Slug of the top-level domain community
    #[serde(default)]
    pub domain: Option<String>,

    /// Slug of a sub-community beneath the domain community
    #[serde(default)]
    pub sub_community: Option<String>,
}

impl CommunityDirective {
    /// Whether the directive asks for any community at all
    pub fn is_empty(&self) -> bool {
        self.domain.is_none() && self.sub_community.is_none()
    }
}

/// Owner directive naming the uploader of the legacy deposit
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerDirective {
    /// Identity provider the username belongs to
    #[serde(default)]
    pub origin: Option<String>,

    /// Username in the source system
    #[serde(default)]
    pub source_username: Option<String>,

    /// Email address
    #[serde(default)]
    pub email: Option<String>,

    /// Display name
    #[serde(default)]
    pub full_name: Option<String>,
}

/// Canonical record payload ready for ingestion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerializedRecord {
    /// External identifier and dedup key
    pub doi: Doi,

    /// Descriptive metadata, forwarded as-is
    pub metadata: Value,

    /// Identifiers of this record in source systems
    #[serde(default)]
    pub identifiers: Vec<SourceIdentifier>,

    /// File manifest
    #[serde(default)]
    pub files: Vec<FileEntry>,

    /// Community assignment
    #[serde(default)]
    pub community: Option<CommunityDirective>,

    /// Owner assignment
    #[serde(default)]
    pub owner: Option<OwnerDirective>,

    /// Access settings, forwarded as-is
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access: Option<Value>,

    /// Any further payload fields (custom fields etc.)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SerializedRecord {
    /// Parses and validates one dataset line
    ///
    /// # Errors
    ///
    /// Returns [`ImporterError::FetchFailed`] if the line is not valid JSON
    /// or the payload is missing required fields.
    pub fn from_json_line(line: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(line)
            .map_err(|e| ImporterError::FetchFailed(format!("invalid JSON: {e}")))?;
        Self::from_value(value)
    }

    /// Builds and validates a record from an already-parsed JSON value
    pub fn from_value(value: Value) -> Result<Self> {
        let record: SerializedRecord = serde_json::from_value(value)
            .map_err(|e| ImporterError::FetchFailed(format!("invalid record payload: {e}")))?;
        record.validate()?;
        Ok(record)
    }

    /// Checks the fields the loader relies on
    pub fn validate(&self) -> Result<()> {
        let title = self
            .metadata
            .get("title")
            .and_then(Value::as_str)
            .map(str::trim)
            .unwrap_or_default();
        if !self.metadata.is_object() || title.is_empty() {
            return Err(ImporterError::FetchFailed(format!(
                "record {} is missing metadata.title",
                self.doi
            )));
        }

        for file in &self.files {
            if file.filename.trim().is_empty() {
                return Err(ImporterError::FetchFailed(format!(
                    "record {} has a file entry without a filename",
                    self.doi
                )));
            }
        }

        if let Some(community) = &self.community {
            let blank = |slug: &Option<String>| slug.as_deref().is_some_and(|s| s.trim().is_empty());
            if blank(&community.domain) || blank(&community.sub_community) {
                return Err(ImporterError::FetchFailed(format!(
                    "record {} has an empty community slug",
                    self.doi
                )));
            }
            if community.sub_community.is_some() && community.domain.is_none() {
                return Err(ImporterError::FetchFailed(format!(
                    "record {} declares a sub-community without a domain community",
                    self.doi
                )));
            }
        }

        if let Some(owner) = &self.owner {
            let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
            if !present(&owner.source_username) && !present(&owner.email) {
                return Err(ImporterError::FetchFailed(format!(
                    "record {} owner needs a source_username or an email",
                    self.doi
                )));
            }
        }

        Ok(())
    }

    /// Record title
    pub fn title(&self) -> &str {
        self.metadata
            .get("title")
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    /// Value of the identifier in `scheme`, if the record has one
    pub fn source_id(&self, scheme: &str) -> Option<&str> {
        self.identifiers
            .iter()
            .find(|id| id.scheme == scheme)
            .map(|id| id.identifier.as_str())
    }

    /// Community directive, if it names any community
    pub fn community_directive(&self) -> Option<&CommunityDirective> {
        self.community.as_ref().filter(|c| !c.is_empty())
    }

    /// Draft payload sent to the target store on create and update
    ///
    /// Directives consumed by the loader itself are not forwarded; the file
    /// list is replaced by the store's `files.enabled` switch.
    pub fn draft_payload(&self) -> Value {
        let mut payload = self.extra.clone();
        payload.insert("metadata".to_string(), self.metadata.clone());
        payload.insert(
            "pids".to_string(),
            json!({
                "doi": {
                    "identifier": self.doi.as_str(),
                    "provider": "external",
                }
            }),
        );
        payload.insert(
            "files".to_string(),
            json!({ "enabled": !self.files.is_empty() }),
        );
        if let Some(access) = &self.access {
            payload.insert("access".to_string(), access.clone());
        }
        Value::Object(payload)
    }
}

/// Reads a dot-separated field path out of a JSON value
///
/// Objects are walked by key and arrays by numeric index. An empty path
/// returns the whole value; a missing segment yields `Value::Null`.
pub fn extract_field_path(value: &Value, path: &str) -> Value {
    if path.trim().is_empty() {
        return value.clone();
    }

    let mut current = value;
    for segment in path.split('.') {
        let next = match current {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        };
        match next {
            Some(v) => current = v,
            None => return Value::Null,
        }
    }
    current.clone()
}
