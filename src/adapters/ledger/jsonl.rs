//! JSONL file implementation of [`LedgerStorage`]

use super::traits::{DamagedLine, LedgerRead, LedgerStorage};
use crate::config::LedgerConfig;
use crate::core::ledger::entry::{CreatedEntry, FailedEntry};
use crate::domain::{ImporterError, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

/// Ledger kept in two newline-delimited JSON files
#[derive(Debug, Clone)]
pub struct JsonlLedgerStorage {
    created_path: PathBuf,
    failed_path: PathBuf,
}

impl JsonlLedgerStorage {
    /// Creates a storage over explicit file paths
    pub fn new(created_path: impl Into<PathBuf>, failed_path: impl Into<PathBuf>) -> Self {
        Self {
            created_path: created_path.into(),
            failed_path: failed_path.into(),
        }
    }

    /// Creates a storage from the `[ledger]` configuration
    pub fn from_config(config: &LedgerConfig) -> Self {
        Self::new(config.created_log_path(), config.failed_log_path())
    }

    /// Path of the created-records log
    pub fn created_path(&self) -> &Path {
        &self.created_path
    }

    /// Path of the failed-records set
    pub fn failed_path(&self) -> &Path {
        &self.failed_path
    }
}

#[async_trait]
impl LedgerStorage for JsonlLedgerStorage {
    async fn append_created(&self, entry: &CreatedEntry) -> Result<()> {
        ensure_parent(&self.created_path).await?;

        let mut line = serde_json::to_string(entry)?;
        line.push('\n');

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.created_path)
            .await
            .map_err(|e| ledger_io("open", &self.created_path, e))?;
        file.write_all(line.as_bytes())
            .await
            .map_err(|e| ledger_io("append to", &self.created_path, e))?;
        file.sync_data()
            .await
            .map_err(|e| ledger_io("sync", &self.created_path, e))?;
        Ok(())
    }

    async fn load_created(&self) -> Result<LedgerRead<CreatedEntry>> {
        read_jsonl(&self.created_path).await
    }

    async fn load_failed(&self) -> Result<LedgerRead<FailedEntry>> {
        read_jsonl(&self.failed_path).await
    }

    async fn store_failed(&self, entries: &[FailedEntry]) -> Result<()> {
        ensure_parent(&self.failed_path).await?;

        let mut contents = String::new();
        for entry in entries {
            contents.push_str(&serde_json::to_string(entry)?);
            contents.push('\n');
        }

        let tmp_path = tmp_path_for(&self.failed_path);
        let mut file = tokio::fs::File::create(&tmp_path)
            .await
            .map_err(|e| ledger_io("create", &tmp_path, e))?;
        file.write_all(contents.as_bytes())
            .await
            .map_err(|e| ledger_io("write", &tmp_path, e))?;
        file.sync_all()
            .await
            .map_err(|e| ledger_io("sync", &tmp_path, e))?;
        drop(file);

        tokio::fs::rename(&tmp_path, &self.failed_path)
            .await
            .map_err(|e| ledger_io("replace", &self.failed_path, e))?;
        Ok(())
    }
}

async fn read_jsonl<T: DeserializeOwned>(path: &Path) -> Result<LedgerRead<T>> {
    let contents = match tokio::fs::read_to_string(path).await {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(LedgerRead::default()),
        Err(e) => return Err(ledger_io("read", path, e)),
    };

    let mut read = LedgerRead::default();
    for (i, line) in contents.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<T>(line) {
            Ok(entry) => read.entries.push(entry),
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    line = i + 1,
                    error = %e,
                    "Skipping damaged ledger entry"
                );
                read.damaged.push(DamagedLine {
                    line: i + 1,
                    error: e.to_string(),
                });
            }
        }
    }
    Ok(read)
}

async fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| ledger_io("create directory", parent, e))?;
    }
    Ok(())
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

fn ledger_io(action: &str, path: &Path, err: std::io::Error) -> ImporterError {
    ImporterError::Ledger(format!("Failed to {action} {}: {err}", path.display()))
}
