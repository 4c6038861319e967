//! Delete command implementation
//!
//! This module implements the `delete` command for removing records from
//! the target store.

use super::{connect_or_report, load_or_report, report, selection_or_report};
use crate::adapters::store::RecordStoreClient;
use crate::core::dataset::Dataset;
use crate::domain::ids::RecordId;
use crate::domain::Result;
use clap::Args;

/// Arguments for the delete command
#[derive(Args, Debug, Default)]
pub struct DeleteArgs {
    /// Records to delete: dataset locators, or store record ids with --record-ids
    #[arg(required = true)]
    pub locators: Vec<String>,

    /// Treat locators as target-store record ids
    #[arg(long, conflicts_with = "use_sourceids")]
    pub record_ids: bool,

    /// Treat locators as source-system identifiers
    #[arg(long)]
    pub use_sourceids: bool,

    /// Identifier scheme for --use-sourceids (default from configuration)
    #[arg(long, value_name = "SCHEME")]
    pub scheme: Option<String>,
}

impl DeleteArgs {
    /// Execute the delete command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(count = self.locators.len(), "Starting delete command");

        let config = match load_or_report(config_path) {
            Ok(c) => c,
            Err(code) => return Ok(code),
        };

        let targets = if self.record_ids {
            let mut ids = Vec::new();
            for token in &self.locators {
                match RecordId::new(token.trim()) {
                    Ok(id) => ids.push(Target::Id(id)),
                    Err(e) => {
                        eprintln!("❌ Invalid record id '{token}': {e}");
                        return Ok(2);
                    }
                }
            }
            ids
        } else {
            let selection = match selection_or_report(
                &self.locators,
                self.use_sourceids,
                self.scheme.as_deref(),
                &config.provisioning.default_scheme,
            ) {
                Ok(s) => s,
                Err(code) => return Ok(code),
            };

            let dataset = match Dataset::open(config.dataset.serialized_path()).await {
                Ok(d) => d,
                Err(e) => return Ok(report("Failed to open serialized dataset", &e)),
            };

            let mut indices = Vec::new();
            for locator in selection.locators(dataset.len()) {
                match dataset.resolve(&locator) {
                    Ok(index) => indices.push(index),
                    Err(e) => return Ok(report("Record not found", &e)),
                }
            }

            let mut targets = Vec::new();
            for index in indices {
                match dataset.fetch(index) {
                    Ok(record) => targets.push(Target::Doi(index, record.doi)),
                    Err(e) => return Ok(report("Cannot read record", &e)),
                }
            }
            targets
        };

        let services = match connect_or_report(&config) {
            Ok(s) => s,
            Err(code) => return Ok(code),
        };

        let mut failures = 0;
        for target in &targets {
            match delete_target(services.records.as_ref(), target).await {
                Ok(Some(id)) => println!("🗑️  {target}: deleted {id}"),
                Ok(None) => println!("➖ {target}: not in the target store"),
                Err(e) => {
                    failures += 1;
                    tracing::error!(record = %target, error = %e, "Delete failed");
                    println!("❌ {target}: {e}");
                }
            }
        }

        Ok(if failures > 0 { 1 } else { 0 })
    }
}

/// What a delete token resolved to
enum Target {
    Id(RecordId),
    Doi(usize, crate::domain::ids::Doi),
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Target::Id(id) => write!(f, "{id}"),
            Target::Doi(index, doi) => write!(f, "record {index} ({doi})"),
        }
    }
}

/// Deletes one target, returning the deleted store id or `None` when
/// nothing matched
async fn delete_target(records: &dyn RecordStoreClient, target: &Target) -> Result<Option<RecordId>> {
    let id = match target {
        Target::Id(id) => id.clone(),
        Target::Doi(_, doi) => match records.find_by_doi(doi).await? {
            Some(existing) => existing.id,
            None => return Ok(None),
        },
    };
    records.delete_record(&id).await?;
    tracing::info!(record_id = %id, "Record deleted");
    Ok(Some(id))
}
