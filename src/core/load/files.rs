//! File manifest preparation and filename cleaning

use crate::adapters::store::UploadFile;
use crate::domain::record::FileEntry;
use crate::domain::{ImporterError, Result};
use std::collections::HashSet;
use std::path::{Component, Path};

/// Normalizes a file name for the target store
///
/// Characters outside `[A-Za-z0-9._-]` become `_`, runs of `_` collapse,
/// and `_`/`.` are trimmed from both ends of the stem and the extension.
/// An empty stem becomes `file`.
pub fn clean_filename(name: &str) -> String {
    let mut collapsed = String::with_capacity(name.len());
    for c in name.chars() {
        let c = if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
            c
        } else {
            '_'
        };
        if c == '_' && collapsed.ends_with('_') {
            continue;
        }
        collapsed.push(c);
    }

    let trim = |s: &str| s.trim_matches(|c| c == '_' || c == '.').to_string();
    let (stem, ext) = match collapsed.rfind('.') {
        Some(pos) if pos > 0 => (trim(&collapsed[..pos]), trim(&collapsed[pos + 1..])),
        _ => (trim(&collapsed), String::new()),
    };

    let stem = if stem.is_empty() { "file".to_string() } else { stem };
    if ext.is_empty() {
        stem
    } else {
        format!("{stem}.{ext}")
    }
}

/// Resolves a record's file manifest against the file-storage directory
///
/// Every file must exist locally. Keys are cleaned when `clean` is set,
/// and keys that collide get a numeric suffix.
///
/// # Errors
///
/// Returns [`ImporterError::FetchFailed`] if a path escapes the storage
/// directory or a file is missing.
pub async fn prepare_uploads(
    files: &[FileEntry],
    files_root: &Path,
    clean: bool,
) -> Result<Vec<UploadFile>> {
    let mut uploads = Vec::with_capacity(files.len());
    let mut keys = HashSet::new();

    for entry in files {
        let relative = Path::new(entry.local_path());
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return Err(ImporterError::FetchFailed(format!(
                "file path '{}' must be relative to the file-storage directory",
                entry.local_path()
            )));
        }

        let path = files_root.join(relative);
        let metadata = tokio::fs::metadata(&path).await.map_err(|e| {
            ImporterError::FetchFailed(format!("file {} is not readable: {e}", path.display()))
        })?;
        if !metadata.is_file() {
            return Err(ImporterError::FetchFailed(format!(
                "{} is not a regular file",
                path.display()
            )));
        }

        if let Some(declared) = entry.size {
            if declared != metadata.len() {
                tracing::warn!(
                    file = %path.display(),
                    declared,
                    actual = metadata.len(),
                    "File size differs from manifest"
                );
            }
        }

        let key = if clean {
            clean_filename(&entry.filename)
        } else {
            entry.filename.clone()
        };
        let key = unique_key(key, &mut keys);

        uploads.push(UploadFile {
            key,
            path,
            size: metadata.len(),
        });
    }

    Ok(uploads)
}

fn unique_key(key: String, taken: &mut HashSet<String>) -> String {
    if taken.insert(key.clone()) {
        return key;
    }

    let (stem, ext) = match key.rfind('.') {
        Some(pos) if pos > 0 => (&key[..pos], &key[pos..]),
        _ => (key.as_str(), ""),
    };
    let mut n = 2;
    loop {
        let candidate = format!("{stem}_{n}{ext}");
        if taken.insert(candidate.clone()) {
            tracing::warn!(original = %key, renamed = %candidate, "Duplicate file key renamed");
            return candidate;
        }
        n += 1;
    }
}
