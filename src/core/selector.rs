//! Record selection
//!
//! Turns positional CLI tokens into an ordered, duplicate-free list of
//! record locators. Tokens are either 1-based dataset line indices (with
//! `A-B` / `A-` range syntax) or, in source-id mode, identifiers in a
//! source-system scheme.

use crate::domain::{ImporterError, Result};
use regex::Regex;
use std::fmt;

/// Address of one record in the serialized dataset
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Locator {
    /// 1-based line index
    Index(usize),
    /// Identifier in a source-system scheme
    SourceId { scheme: String, identifier: String },
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Index(index) => write!(f, "{index}"),
            Locator::SourceId { scheme, identifier } => write!(f, "{scheme}:{identifier}"),
        }
    }
}

/// Parsed selection, before it is resolved against a dataset
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Every record in dataset order
    All,
    /// Discrete indices in the given order
    Indices(Vec<usize>),
    /// Inclusive range; `end = None` runs to the end of the dataset
    Range { start: usize, end: Option<usize> },
    /// Source identifiers in one scheme
    SourceIds {
        scheme: String,
        identifiers: Vec<String>,
    },
}

impl Selection {
    /// Parses positional tokens
    ///
    /// `source_scheme` switches to source-id mode.
    ///
    /// # Errors
    ///
    /// Returns [`ImporterError::Usage`] for range syntax in source-id mode,
    /// a range mixed with other tokens, a malformed range, or a non-numeric
    /// index.
    pub fn parse(tokens: &[String], source_scheme: Option<&str>) -> Result<Self> {
        if tokens.is_empty() {
            return Ok(Selection::All);
        }

        match source_scheme {
            Some(scheme) => parse_source_ids(tokens, scheme),
            None => parse_indices(tokens),
        }
    }

    /// Fills in the scheme of a source-id selection parsed with an empty one
    ///
    /// Lets locator tokens be checked before the configuration holding the
    /// default scheme is read.
    pub fn with_default_scheme(self, default_scheme: &str) -> Self {
        match self {
            Selection::SourceIds {
                scheme,
                identifiers,
            } if scheme.is_empty() => Selection::SourceIds {
                scheme: default_scheme.to_string(),
                identifiers,
            },
            other => other,
        }
    }

    /// Whether the selection names records explicitly
    pub fn is_explicit(&self) -> bool {
        !matches!(self, Selection::All)
    }

    /// Expands the selection for a dataset of `len` records
    ///
    /// Indices are not checked against `len` here, except that an
    /// open-ended range stops at `len`.
    pub fn locators(&self, len: usize) -> Vec<Locator> {
        match self {
            Selection::All => (1..=len).map(Locator::Index).collect(),
            Selection::Indices(indices) => dedup(indices.iter().copied().map(Locator::Index)),
            Selection::Range { start, end } => {
                let end = end.unwrap_or(len);
                (*start..=end).map(Locator::Index).collect()
            }
            Selection::SourceIds {
                scheme,
                identifiers,
            } => dedup(identifiers.iter().map(|identifier| Locator::SourceId {
                scheme: scheme.clone(),
                identifier: identifier.clone(),
            })),
        }
    }
}

fn parse_indices(tokens: &[String]) -> Result<Selection> {
    let range_tokens = tokens.iter().filter(|t| t.contains('-')).count();
    if range_tokens > 0 {
        if tokens.len() > 1 {
            return Err(ImporterError::Usage(
                "A range cannot be combined with other record locators".to_string(),
            ));
        }
        return parse_range(&tokens[0]);
    }

    let indices = tokens
        .iter()
        .map(|token| parse_index(token))
        .collect::<Result<Vec<_>>>()?;
    Ok(Selection::Indices(indices))
}

fn parse_range(token: &str) -> Result<Selection> {
    let (start, end) = token
        .split_once('-')
        .ok_or_else(|| ImporterError::Usage(format!("Invalid range '{token}'")))?;

    let start = parse_index(start)
        .map_err(|_| ImporterError::Usage(format!("Invalid range '{token}'")))?;
    let end = if end.trim().is_empty() {
        None
    } else {
        let end = parse_index(end)
            .map_err(|_| ImporterError::Usage(format!("Invalid range '{token}'")))?;
        if end < start {
            return Err(ImporterError::Usage(format!(
                "Invalid range '{token}': end is before start"
            )));
        }
        Some(end)
    };

    Ok(Selection::Range { start, end })
}

fn parse_index(token: &str) -> Result<usize> {
    match token.trim().parse::<usize>() {
        Ok(0) => Err(ImporterError::Usage(
            "Record indices start at 1".to_string(),
        )),
        Ok(index) => Ok(index),
        Err(_) => Err(ImporterError::Usage(format!(
            "Record index '{token}' is not a number (use --use-sourceids for source identifiers)"
        ))),
    }
}

fn parse_source_ids(tokens: &[String], scheme: &str) -> Result<Selection> {
    let range = Regex::new(r"^\d+-\d*$")
        .map_err(|e| ImporterError::Other(format!("Invalid range pattern: {e}")))?;

    let mut identifiers = Vec::with_capacity(tokens.len());
    for token in tokens {
        let token = token.trim();
        if range.is_match(token) {
            return Err(ImporterError::Usage(format!(
                "Ranges like '{token}' can only be used with record indices, not source ids"
            )));
        }
        let identifier = token.replace("\\-", "-");
        if identifier.is_empty() {
            return Err(ImporterError::Usage("Empty source identifier".to_string()));
        }
        identifiers.push(identifier);
    }

    Ok(Selection::SourceIds {
        scheme: scheme.to_string(),
        identifiers,
    })
}

fn dedup(locators: impl Iterator<Item = Locator>) -> Vec<Locator> {
    let mut seen = std::collections::HashSet::new();
    locators.filter(|l| seen.insert(l.clone())).collect()
}
