//! Read command implementation
//!
//! This module implements the `read` command for printing records from the
//! serialized dataset or the raw export.

use super::{load_or_report, report, selection_or_report};
use crate::core::dataset::Dataset;
use clap::Args;

/// Arguments for the read command
#[derive(Args, Debug, Default)]
pub struct ReadArgs {
    /// Records to print (same syntax as `load`). All records when omitted.
    pub locators: Vec<String>,

    /// Treat locators as source-system identifiers
    #[arg(long)]
    pub use_sourceids: bool,

    /// Identifier scheme for --use-sourceids (default: doi)
    #[arg(long, value_name = "SCHEME")]
    pub scheme: Option<String>,

    /// Print the raw export record instead of the serialized one
    #[arg(long)]
    pub raw_input: bool,

    /// Dot-separated path to print instead of the whole record (e.g. metadata.title)
    #[arg(long, value_name = "PATH")]
    pub field_path: Option<String>,
}

impl ReadArgs {
    /// Execute the read command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let config = match load_or_report(config_path) {
            Ok(c) => c,
            Err(code) => return Ok(code),
        };

        let selection = match selection_or_report(
            &self.locators,
            self.use_sourceids,
            self.scheme.as_deref(),
            "doi",
        ) {
            Ok(s) => s,
            Err(code) => return Ok(code),
        };

        // Locators always resolve against the serialized dataset
        let serialized = match Dataset::open(config.dataset.serialized_path()).await {
            Ok(d) => d,
            Err(e) => return Ok(report("Failed to open serialized dataset", &e)),
        };
        let raw = if self.raw_input {
            match Dataset::open(config.dataset.raw_path()).await {
                Ok(d) => Some(d),
                Err(e) => return Ok(report("Failed to open raw dataset", &e)),
            }
        } else {
            None
        };
        let source = raw.as_ref().unwrap_or(&serialized);

        let mut indices = Vec::new();
        for locator in selection.locators(serialized.len()) {
            match serialized.resolve(&locator) {
                Ok(index) => indices.push(index),
                Err(e) => return Ok(report("Record not found", &e)),
            }
        }

        let mut failures = 0;
        for index in indices {
            match source.read_value(index, self.field_path.as_deref()) {
                Ok(value) => {
                    println!("# record {index}");
                    println!("{}", serde_json::to_string_pretty(&value)?);
                }
                Err(e) => {
                    failures += 1;
                    eprintln!("❌ record {index}: {e}");
                }
            }
        }

        Ok(if failures > 0 { 1 } else { 0 })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_args_defaults() {
        let args = ReadArgs::default();
        assert!(args.locators.is_empty());
        assert!(!args.raw_input);
        assert!(args.field_path.is_none());
    }
}
