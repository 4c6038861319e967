//! Load command implementation
//!
//! This module implements the `load` command for loading serialized
//! records into the target store.

use super::{connect_or_report, load_or_report, report, selection_or_report};
use crate::core::aggregation::AggregationOutcome;
use crate::core::load::{parse_date, LoadCoordinator, LoadOptions, LoadSummary};
use clap::Args;

/// Arguments for the load command
#[derive(Args, Debug, Default)]
pub struct LoadArgs {
    /// Records to load: indices (`3 7`), one range (`2-5`, `4-`) or, with
    /// --use-sourceids, source identifiers. All records when omitted.
    pub locators: Vec<String>,

    /// Skip records that already exist instead of updating them
    #[arg(long)]
    pub no_updates: bool,

    /// Also load every record recorded as failed by a previous run
    #[arg(long)]
    pub retry_failed: bool,

    /// Treat locators as source-system identifiers
    #[arg(long)]
    pub use_sourceids: bool,

    /// Identifier scheme for --use-sourceids (default from configuration)
    #[arg(long, value_name = "SCHEME")]
    pub scheme: Option<String>,

    /// Trigger usage-statistics aggregation after the run
    #[arg(long)]
    pub aggregate: bool,

    /// Aggregation window start (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub start_date: Option<String>,

    /// Aggregation window end (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub end_date: Option<String>,

    /// Normalize file names before upload
    #[arg(long)]
    pub clean_filenames: bool,

    /// Print one line per record
    #[arg(short, long)]
    pub verbose: bool,

    /// Stop at the first failed record
    #[arg(long)]
    pub stop_on_error: bool,
}

impl LoadArgs {
    /// Builds the run options, parsing the aggregation dates
    pub fn options(&self) -> crate::domain::Result<LoadOptions> {
        let options = LoadOptions {
            no_updates: self.no_updates,
            retry_failed: self.retry_failed,
            clean_filenames: self.clean_filenames,
            verbose: self.verbose,
            stop_on_error: self.stop_on_error,
            aggregate: self.aggregate,
            start_date: self.start_date.as_deref().map(parse_date).transpose()?,
            end_date: self.end_date.as_deref().map(parse_date).transpose()?,
        };
        options.validate()?;
        Ok(options)
    }

    /// Execute the load command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!("Starting load command");

        // Usage errors abort before any I/O; a source-id selection without
        // --scheme takes the configured default below
        let selection = match selection_or_report(
            &self.locators,
            self.use_sourceids,
            self.scheme.as_deref(),
            "",
        ) {
            Ok(s) => s,
            Err(code) => return Ok(code),
        };
        let options = match self.options() {
            Ok(o) => o,
            Err(e) => return Ok(report("Invalid load options", &e)),
        };

        let config = match load_or_report(config_path) {
            Ok(c) => c,
            Err(code) => return Ok(code),
        };
        let selection = selection.with_default_scheme(&config.provisioning.default_scheme);

        let services = match connect_or_report(&config) {
            Ok(s) => s,
            Err(code) => return Ok(code),
        };

        let coordinator = match LoadCoordinator::from_config(&config, &services, options).await {
            Ok(c) => c,
            Err(e) => return Ok(report("Failed to initialize load", &e)),
        };

        println!(
            "🚀 Loading from {} ({} records)",
            coordinator.dataset().path().display(),
            coordinator.dataset().len()
        );
        println!();

        let summary = match coordinator.execute_load(&selection).await {
            Ok(s) => s,
            Err(e) => return Ok(report("Load failed", &e)),
        };

        print_summary(&summary);

        let exit_code = if summary.is_successful() {
            println!("✅ Load completed successfully!");
            0
        } else {
            println!("⚠️  Load completed with failures");
            println!("   Run with --retry-failed to retry them.");
            1
        };

        Ok(exit_code)
    }
}

fn print_summary(summary: &LoadSummary) {
    println!();
    println!("📊 Load Summary:");
    println!("  Processed: {}", summary.total);
    println!("  Created: {}", summary.created);
    println!("  Updated: {}", summary.updated);
    println!("  Skipped: {}", summary.skipped);
    println!("  Failed: {}", summary.failed);
    println!("  Duration: {:.2}s", summary.duration.as_secs_f64());
    if summary.halted {
        println!(
            "  Halted at first failure; {} record(s) not processed",
            summary.remaining
        );
    }
    if !summary.dropped.is_empty() {
        println!(
            "  Previously failed records no longer in the dataset: {}",
            summary.dropped.len()
        );
    }
    println!();

    if summary.failed > 0 {
        println!("⚠️  Failed records:");
        for outcome in summary.failures().take(20) {
            if let Some(error) = &outcome.error {
                println!("  - [{}] {}", outcome.locator, error);
            }
        }
        if summary.failed > 20 {
            println!("  ... and {} more", summary.failed - 20);
        }
        println!();
    }

    match &summary.aggregation {
        Some(AggregationOutcome::Completed(report)) => {
            println!(
                "📈 Aggregated {} record(s) for {} to {}",
                report.record_count, report.start_date, report.end_date
            );
            println!();
        }
        Some(AggregationOutcome::Skipped(reason)) => {
            println!("📈 Aggregation skipped: {reason}");
            println!();
        }
        Some(AggregationOutcome::Failed(error)) => {
            println!("⚠️  Aggregation failed: {error}");
            println!();
        }
        None => {}
    }
}
