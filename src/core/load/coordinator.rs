//! Load coordinator - main orchestrator for a load run
//!
//! Resolves the working set of records, loads them one at a time, writes
//! each outcome through to the ledger and runs the optional aggregation
//! step once every record has reached a terminal state.

use crate::adapters::ledger::JsonlLedgerStorage;
use crate::adapters::store::StoreServices;
use crate::config::ImporterConfig;
use crate::core::aggregation::AggregationTrigger;
use crate::core::dataset::Dataset;
use crate::core::ledger::LedgerManager;
use crate::core::load::options::LoadOptions;
use crate::core::load::record_loader::RecordLoader;
use crate::core::load::summary::LoadSummary;
use crate::core::provisioning::Provisioner;
use crate::core::selector::{Locator, Selection};
use crate::domain::Result;
use chrono::Utc;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

/// Load coordinator
pub struct LoadCoordinator {
    dataset: Arc<Dataset>,
    loader: RecordLoader,
    ledger: Arc<LedgerManager>,
    aggregation: AggregationTrigger,
    options: LoadOptions,
}

impl LoadCoordinator {
    pub fn new(
        dataset: Arc<Dataset>,
        loader: RecordLoader,
        ledger: Arc<LedgerManager>,
        aggregation: AggregationTrigger,
        options: LoadOptions,
    ) -> Self {
        Self {
            dataset,
            loader,
            ledger,
            aggregation,
            options,
        }
    }

    /// Create a coordinator from configuration
    ///
    /// Opens the serialized dataset and the JSONL ledger named in `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the options are inconsistent, or the dataset or
    /// ledger cannot be read.
    pub async fn from_config(
        config: &ImporterConfig,
        services: &StoreServices,
        options: LoadOptions,
    ) -> Result<Self> {
        options.validate()?;

        let dataset = Arc::new(Dataset::open(config.dataset.serialized_path()).await?);
        let storage = Arc::new(JsonlLedgerStorage::from_config(&config.ledger));
        let ledger = Arc::new(LedgerManager::open(storage).await?);

        let provisioner = Provisioner::new(services, config.provisioning.clone());
        let loader = RecordLoader::new(
            services.records.clone(),
            provisioner,
            config.dataset.files_location(),
            options.clone(),
        );

        Ok(Self::new(
            dataset,
            loader,
            ledger,
            AggregationTrigger::new(services.aggregation.clone()),
            options,
        ))
    }

    /// The dataset being loaded
    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// Resolves the records to process, in order
    ///
    /// Explicit locators must all resolve. With `retry_failed`, the ledger's
    /// failed indices are appended in ascending order; those that no longer
    /// resolve are returned separately and skipped. Each record appears once.
    ///
    /// Planning reads the ledger but never changes it.
    ///
    /// # Errors
    ///
    /// Returns [`crate::domain::ImporterError::NotFound`] for an explicit
    /// locator that does not resolve. Nothing has been loaded at that point.
    pub async fn plan(&self, selection: &Selection) -> Result<(Vec<(Locator, usize)>, Vec<Locator>)> {
        let mut plan = Vec::new();
        let mut seen = HashSet::new();
        let mut dropped = Vec::new();

        // `retry-failed` without tokens processes the failed set only
        if !self.options.retry_failed || selection.is_explicit() {
            for locator in selection.locators(self.dataset.len()) {
                let index = self.dataset.resolve(&locator)?;
                if seen.insert(index) {
                    plan.push((locator, index));
                }
            }
        }

        if self.options.retry_failed {
            for index in self.ledger.failed_indices().await {
                let locator = Locator::Index(index);
                match self.dataset.resolve(&locator) {
                    Ok(index) => {
                        if seen.insert(index) {
                            plan.push((locator, index));
                        }
                    }
                    Err(e) => {
                        tracing::warn!(index, error = %e, "Failed ledger entry no longer resolves");
                        dropped.push(locator);
                    }
                }
            }
        }

        Ok((plan, dropped))
    }

    /// Execute a load run
    ///
    /// Per-record failures are recorded and counted; the run continues
    /// unless `stop_on_error` is set. Failed entries that no longer resolve
    /// are reported in the summary once and pruned from the failed set.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicit locator does not resolve, or the
    /// ledger cannot be written.
    pub async fn execute_load(&self, selection: &Selection) -> Result<LoadSummary> {
        let start_time = Instant::now();
        let invoked_at = Utc::now();

        let (plan, dropped) = self.plan(selection).await?;
        tracing::info!(
            dataset = %self.dataset.path().display(),
            records = plan.len(),
            retry_failed = self.options.retry_failed,
            no_updates = self.options.no_updates,
            "Starting load"
        );

        let stale: Vec<usize> = dropped
            .iter()
            .filter_map(|locator| match locator {
                Locator::Index(index) => Some(*index),
                _ => None,
            })
            .collect();
        self.ledger.prune_failed(&stale).await?;

        let mut summary = LoadSummary::new();
        summary.dropped = dropped;

        for (position, (locator, index)) in plan.iter().enumerate() {
            crate::log_record_start!(index, locator);

            let history = self.ledger.history(*index).await;
            let outcome = self
                .loader
                .load(&self.dataset, locator, *index, history)
                .await;
            crate::log_record_outcome!(outcome);
            if self.options.verbose {
                println!("{}", outcome.progress_line());
            }

            self.ledger.record_outcome(&outcome).await?;

            let failed = !outcome.is_success();
            summary.add(outcome);

            if failed && self.options.stop_on_error {
                summary.halted = true;
                summary.remaining = plan.len() - position - 1;
                tracing::warn!(
                    index,
                    remaining = summary.remaining,
                    "Stopping at first failure"
                );
                break;
            }
        }

        if self.options.aggregate {
            let outcome = self
                .aggregation
                .run(
                    &summary.outcomes,
                    self.options.start_date,
                    self.options.end_date,
                    invoked_at,
                )
                .await;
            summary.aggregation = Some(outcome);
        }

        let summary = summary.with_duration(start_time.elapsed());
        summary.log_summary();

        Ok(summary)
    }
}
