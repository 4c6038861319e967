//! Loading of a single record
//!
//! Runs one record through fetch, existence check, provisioning, write and
//! ownership transfer. Every failure is captured in the returned
//! [`LoadOutcome`]; nothing here aborts the run.
//!
//! A create that failed after its draft was written leaves a record in the
//! store. The next attempt finds it by DOI and, guided by the ledger
//! history, finishes it as a create rather than updating or skipping it.

use crate::adapters::store::{ExistingRecord, PublishedRecord, RecordStoreClient, UploadFile};
use crate::core::dataset::Dataset;
use crate::core::ledger::LedgerHistory;
use crate::core::load::decision::{decide_action, LoadAction};
use crate::core::load::files::prepare_uploads;
use crate::core::load::options::LoadOptions;
use crate::core::load::outcome::LoadOutcome;
use crate::core::provisioning::{ProvisionedDependencies, Provisioner};
use crate::core::selector::Locator;
use crate::domain::ids::{CommunityId, Doi};
use crate::domain::record::SerializedRecord;
use crate::domain::{ImporterError, LoadErrorDetail, LoadStage, Result};
use std::path::PathBuf;
use std::sync::Arc;

/// Loads one record into the target store
pub struct RecordLoader {
    records: Arc<dyn RecordStoreClient>,
    provisioner: Provisioner,
    files_root: PathBuf,
    options: LoadOptions,
}

impl RecordLoader {
    pub fn new(
        records: Arc<dyn RecordStoreClient>,
        provisioner: Provisioner,
        files_root: impl Into<PathBuf>,
        options: LoadOptions,
    ) -> Self {
        Self {
            records,
            provisioner,
            files_root: files_root.into(),
            options,
        }
    }

    /// Loads the record at `index`
    ///
    /// `history` is the ledger's record of earlier attempts for the key.
    pub async fn load(
        &self,
        dataset: &Dataset,
        locator: &Locator,
        index: usize,
        history: LedgerHistory,
    ) -> LoadOutcome {
        let fail = |doi: Option<Doi>, stage: LoadStage, err: &ImporterError| {
            LoadOutcome::failed(
                locator.clone(),
                index,
                doi,
                LoadErrorDetail::from_error(stage, err),
            )
        };

        let record = match dataset.fetch(index) {
            Ok(record) => record,
            Err(e) => return fail(None, LoadStage::Fetch, &e),
        };
        let doi = record.doi.clone();

        let existing = match self.records.find_by_doi(&doi).await {
            Ok(existing) => existing,
            Err(e) => return fail(Some(doi), LoadStage::ExistsCheck, &e),
        };

        let action = decide_action(existing, history, self.options.no_updates);
        tracing::debug!(index, doi = %doi, action = action.name(), "Decided load action");
        if let LoadAction::Resume(existing) = &action {
            tracing::info!(index, record_id = %existing.id, "Finishing interrupted create");
        }

        if let LoadAction::Skip(existing) = &action {
            return LoadOutcome::skipped(locator.clone(), index, doi, existing.id.clone());
        }

        // Local files are checked before anything is provisioned or written
        let uploads =
            match prepare_uploads(&record.files, &self.files_root, self.options.clean_filenames)
                .await
            {
                Ok(uploads) => uploads,
                Err(e) => return fail(Some(doi), LoadStage::Fetch, &e),
            };

        let deps = match self.provisioner.provision_record(&record).await {
            Ok(deps) => deps,
            Err(e) => return fail(Some(doi), LoadStage::Provision, &e),
        };

        let community = deps.community.as_ref().map(|c| &c.community.id);
        let written = match action.existing() {
            Some(existing) => self.update(existing, &record, &uploads, community).await,
            None => self.create(&record, &uploads, community).await,
        };
        let published = match written {
            Ok(published) => published,
            Err(e) => return fail(Some(doi), LoadStage::Write, &e),
        };

        if let Err(e) = self.transfer_ownership(&published, &deps).await {
            return fail(Some(doi), LoadStage::OwnershipTransfer, &e);
        }

        match action {
            LoadAction::Update(_) => {
                LoadOutcome::updated(locator.clone(), index, doi, published.id, published.created)
            }
            _ => LoadOutcome::created(locator.clone(), index, doi, published.id, published.created),
        }
    }

    /// Draft, files, community submission, publish
    async fn create(
        &self,
        record: &SerializedRecord,
        uploads: &[UploadFile],
        community: Option<&CommunityId>,
    ) -> Result<PublishedRecord> {
        let id = self.records.create_draft(&record.draft_payload()).await?;
        tracing::debug!(record_id = %id, "Draft created");

        if !uploads.is_empty() {
            self.records.upload_files(&id, uploads).await?;
        }
        if let Some(community) = community {
            self.records.submit_to_community(&id, community).await?;
        }
        self.records.publish(&id).await
    }

    /// Updates an unpublished draft in place, or opens a new draft of a
    /// published record and re-publishes it
    ///
    /// Also finishes an interrupted create: the draft is merged, submitted
    /// to its community if it is not yet a member, and published.
    async fn update(
        &self,
        existing: &ExistingRecord,
        record: &SerializedRecord,
        uploads: &[UploadFile],
        community: Option<&CommunityId>,
    ) -> Result<PublishedRecord> {
        let id = &existing.id;
        if existing.is_published {
            self.records.edit_published(id).await?;
        }
        self.records.update_draft(id, &record.draft_payload()).await?;

        if !uploads.is_empty() {
            self.records.upload_files(id, uploads).await?;
        }

        if let Some(community) = community {
            if existing.is_published {
                if !existing.communities.contains(community) {
                    tracing::warn!(
                        record_id = %id,
                        community = %community,
                        "Published record is not in its declared community; community left unchanged"
                    );
                }
            } else if !existing.communities.contains(community) {
                self.records.submit_to_community(id, community).await?;
            }
        }

        self.records.publish(id).await
    }

    async fn transfer_ownership(
        &self,
        published: &PublishedRecord,
        deps: &ProvisionedDependencies,
    ) -> Result<()> {
        let Some(owner) = &deps.owner else {
            return Ok(());
        };
        let user = owner.user();
        self.records
            .transfer_ownership(&published.id, &user.id)
            .await?;
        tracing::debug!(record_id = %published.id, owner = %user.id, "Ownership transferred");
        Ok(())
    }
}
