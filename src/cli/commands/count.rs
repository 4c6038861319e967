//! Count command implementation

use super::{load_or_report, report};
use crate::core::dataset::Dataset;
use clap::Args;

/// Arguments for the count command
#[derive(Args, Debug)]
pub struct CountArgs {}

impl CountArgs {
    /// Execute the count command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let config = match load_or_report(config_path) {
            Ok(c) => c,
            Err(code) => return Ok(code),
        };

        let path = config.dataset.serialized_path();
        match Dataset::open(&path).await {
            Ok(dataset) => {
                println!("{} records in {}", dataset.len(), path.display());
                Ok(0)
            }
            Err(e) => Ok(report("Failed to open serialized dataset", &e)),
        }
    }
}
