//! Serialized dataset access
//!
//! The dataset is a JSONL file; line N (1-based) is record N. Locators are
//! resolved here, and records are fetched and validated on demand.

use crate::core::selector::Locator;
use crate::domain::context::ResultExt;
use crate::domain::record::{extract_field_path, SerializedRecord};
use crate::domain::{ImporterError, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

type IdentifierIndex = HashMap<(String, String), usize>;

/// A newline-delimited dataset held in memory
#[derive(Debug)]
pub struct Dataset {
    path: PathBuf,
    lines: Vec<String>,
    identifiers: OnceLock<IdentifierIndex>,
}

impl Dataset {
    /// Reads the dataset file
    ///
    /// # Errors
    ///
    /// Returns [`ImporterError::Io`] if the file cannot be read.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = tokio::fs::read_to_string(path).await.map_err(|e| {
            ImporterError::Io(format!("Cannot read dataset {}: {e}", path.display()))
        })?;
        Ok(Self::from_contents(path, &contents))
    }

    /// Builds a dataset from file contents already in memory
    pub fn from_contents(path: impl Into<PathBuf>, contents: &str) -> Self {
        let mut lines: Vec<String> = contents.lines().map(str::to_string).collect();
        while lines.last().is_some_and(|l| l.trim().is_empty()) {
            lines.pop();
        }
        Self {
            path: path.into(),
            lines,
            identifiers: OnceLock::new(),
        }
    }

    /// Path the dataset was read from
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the dataset has no records
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Resolves a locator to a 1-based index
    ///
    /// # Errors
    ///
    /// Returns [`ImporterError::NotFound`] if the locator names no record.
    pub fn resolve(&self, locator: &Locator) -> Result<usize> {
        match locator {
            Locator::Index(index) if (1..=self.len()).contains(index) => Ok(*index),
            Locator::Index(index) => Err(ImporterError::NotFound(format!(
                "Record {index} is outside the dataset (1-{})",
                self.len()
            ))),
            Locator::SourceId { scheme, identifier } => self
                .find_by_identifier(scheme, identifier)
                .ok_or_else(|| {
                    ImporterError::NotFound(format!(
                        "No record with {scheme} identifier '{identifier}'"
                    ))
                }),
        }
    }

    /// Finds the first record carrying `(scheme, value)`
    ///
    /// Scheme `doi` also matches the record DOI.
    pub fn find_by_identifier(&self, scheme: &str, value: &str) -> Option<usize> {
        self.identifiers
            .get_or_init(|| build_identifier_index(&self.lines))
            .get(&(scheme.to_string(), value.to_string()))
            .copied()
    }

    /// Fetches and validates record `index`
    ///
    /// # Errors
    ///
    /// Returns [`ImporterError::NotFound`] for an index outside the dataset
    /// and [`ImporterError::FetchFailed`] for an unreadable payload.
    pub fn fetch(&self, index: usize) -> Result<SerializedRecord> {
        SerializedRecord::from_json_line(self.line(index)?)
            .with_context(|| format!("record {index}"))
    }

    /// Reads record `index` as raw JSON, optionally narrowed to a field path
    pub fn read_value(&self, index: usize, field_path: Option<&str>) -> Result<Value> {
        let value: Value = serde_json::from_str(self.line(index)?).map_err(|e| {
            ImporterError::FetchFailed(format!("record {index} is not valid JSON: {e}"))
        })?;
        Ok(match field_path {
            Some(path) => extract_field_path(&value, path),
            None => value,
        })
    }

    fn line(&self, index: usize) -> Result<&str> {
        index
            .checked_sub(1)
            .and_then(|i| self.lines.get(i))
            .map(String::as_str)
            .ok_or_else(|| {
                ImporterError::NotFound(format!(
                    "Record {index} is outside the dataset (1-{})",
                    self.len()
                ))
            })
    }
}

fn build_identifier_index(lines: &[String]) -> IdentifierIndex {
    let mut index = IdentifierIndex::new();
    for (i, line) in lines.iter().enumerate() {
        let Ok(value) = serde_json::from_str::<Value>(line) else {
            continue;
        };

        if let Some(doi) = value.get("doi").and_then(Value::as_str) {
            index.entry(("doi".to_string(), doi.to_string())).or_insert(i + 1);
        }

        let identifiers = value
            .get("identifiers")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();
        for id in identifiers {
            if let (Some(scheme), Some(identifier)) = (
                id.get("scheme").and_then(Value::as_str),
                id.get("identifier").and_then(Value::as_str),
            ) {
                index
                    .entry((scheme.to_string(), identifier.to_string()))
                    .or_insert(i + 1);
            }
        }
    }
    index
}
