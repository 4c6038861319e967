//! Status command implementation
//!
//! This module implements the `status` command for displaying the outcome
//! ledger.

use super::{load_or_report, report};
use crate::adapters::ledger::JsonlLedgerStorage;
use crate::core::ledger::LedgerManager;
use crate::domain::LoadErrorKind;
use clap::Args;
use std::sync::Arc;

/// Arguments for the status command
#[derive(Args, Debug, Default)]
pub struct StatusArgs {
    /// Only list failures of this kind (fetch_failed, write_failed, provisioning_failed)
    #[arg(long, value_name = "KIND")]
    pub kind: Option<String>,

    /// Maximum number of failed entries to list
    #[arg(long, default_value_t = 50)]
    pub limit: usize,
}

impl StatusArgs {
    /// Execute the status command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!("Checking load status");

        println!("📊 Load Status");
        println!();

        let config = match load_or_report(config_path) {
            Ok(c) => c,
            Err(code) => return Ok(code),
        };

        let kind = match self.kind.as_deref().map(parse_kind).transpose() {
            Ok(k) => k,
            Err(message) => {
                eprintln!("❌ {message}");
                return Ok(2);
            }
        };

        let storage = Arc::new(JsonlLedgerStorage::from_config(&config.ledger));
        println!("Created log: {}", storage.created_path().display());
        println!("Failed log:  {}", storage.failed_path().display());
        println!();

        let ledger = match LedgerManager::open(storage).await {
            Ok(l) => l,
            Err(e) => return Ok(report("Failed to open ledger", &e)),
        };
        let stats = match ledger.stats().await {
            Ok(s) => s,
            Err(e) => return Ok(report("Failed to read ledger", &e)),
        };

        println!(
            "Created: {} entries ({} distinct records)",
            stats.created, stats.created_keys
        );
        println!("Failed:  {}", stats.failed.len());

        let damaged = stats.damaged_created.len() + stats.damaged_failed.len();
        if damaged > 0 {
            println!("⚠️  Damaged ledger lines skipped: {damaged}");
            for line in &stats.damaged_created {
                println!("    created log line {}: {}", line.line, line.error);
            }
            for line in &stats.damaged_failed {
                println!("    failed log line {}: {}", line.line, line.error);
            }
        }

        let failed: Vec<_> = stats
            .failed
            .iter()
            .filter(|e| kind.map_or(true, |k| e.kind == k))
            .collect();

        if failed.is_empty() {
            println!();
            println!("No failed records.");
            return Ok(0);
        }

        println!();
        println!(
            "{:<8} {:<30} {:<20} {:<9} {:<20} Last error",
            "Index", "DOI", "Kind", "Attempts", "Last attempt"
        );
        println!("{}", "-".repeat(120));
        for entry in failed.iter().take(self.limit) {
            println!(
                "{:<8} {:<30} {:<20} {:<9} {:<20} {}",
                entry.index,
                entry.doi.as_ref().map(|d| d.as_str()).unwrap_or("-"),
                entry.kind.to_string(),
                entry.attempts,
                entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
                entry.error
            );
        }
        if failed.len() > self.limit {
            println!("... and {} more", failed.len() - self.limit);
        }
        println!();

        Ok(0)
    }
}

fn parse_kind(value: &str) -> Result<LoadErrorKind, String> {
    match value {
        "fetch_failed" => Ok(LoadErrorKind::FetchFailed),
        "write_failed" => Ok(LoadErrorKind::WriteFailed),
        "provisioning_failed" => Ok(LoadErrorKind::ProvisioningFailed),
        other => Err(format!("Unknown failure kind '{other}'")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_kind() {
        assert_eq!(parse_kind("write_failed"), Ok(LoadErrorKind::WriteFailed));
        assert!(parse_kind("oops").is_err());
    }
}
