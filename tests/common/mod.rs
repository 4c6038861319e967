//! Shared fixtures: an in-memory target store and a dataset/ledger harness

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use record_importer::adapters::ledger::JsonlLedgerStorage;
use record_importer::adapters::store::{
    AggregationReport, AggregationService, CommunityService, ExistingRecord,
    IdentityLinkService, PublishedRecord, RecordStoreClient, StoreServices, UploadFile,
    UserService,
};
use record_importer::config::ProvisioningConfig;
use record_importer::core::aggregation::AggregationTrigger;
use record_importer::core::dataset::Dataset;
use record_importer::core::ledger::LedgerManager;
use record_importer::core::load::{LoadCoordinator, LoadOptions, RecordLoader};
use record_importer::core::provisioning::Provisioner;
use record_importer::domain::ids::{CommunityId, Doi, RecordId, UserId};
use record_importer::domain::{
    Community, IdentityLink, ImportedUser, NewCommunity, NewUser, Result, StoreError,
};
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// A record held by [`MemoryStore`]
#[derive(Debug, Clone)]
pub struct StoredRecord {
    pub id: RecordId,
    pub doi: String,
    pub payload: Value,
    pub is_published: bool,
    pub draft_open: bool,
    pub communities: Vec<CommunityId>,
    pub owner: Option<UserId>,
    pub files: Vec<String>,
    pub created: DateTime<Utc>,
    pub publish_count: usize,
}

#[derive(Default)]
struct State {
    next_id: u64,
    records: BTreeMap<String, StoredRecord>,
    communities: Vec<Community>,
    owners: Vec<(CommunityId, UserId)>,
    users: Vec<ImportedUser>,
    identities: Vec<(IdentityLink, UserId)>,
    aggregations: Vec<(usize, NaiveDate, NaiveDate)>,
    fail_writes: HashSet<String>,
    fail_publish: HashSet<String>,
    fail_ownership: HashSet<String>,
    fail_user_emails: HashSet<String>,
}

/// In-memory target store enforcing the draft/publish lifecycle
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

fn rejected(message: impl Into<String>) -> record_importer::domain::ImporterError {
    StoreError::ClientError {
        status: 400,
        message: message.into(),
    }
    .into()
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Makes every create/update of `doi` fail with a 500
    pub fn fail_writes_for(&self, doi: &str) {
        self.state.lock().unwrap().fail_writes.insert(doi.to_string());
    }

    /// Makes publishing `doi` fail with a 503 after its draft is written
    pub fn fail_publish_for(&self, doi: &str) {
        self.state.lock().unwrap().fail_publish.insert(doi.to_string());
    }

    /// Makes ownership transfer of the published `doi` fail with a 500
    pub fn fail_ownership_for(&self, doi: &str) {
        self.state
            .lock()
            .unwrap()
            .fail_ownership
            .insert(doi.to_string());
    }

    /// Makes user creation for `email` fail
    pub fn fail_user_creation_for(&self, email: &str) {
        self.state
            .lock()
            .unwrap()
            .fail_user_emails
            .insert(email.to_string());
    }

    pub fn clear_failures(&self) {
        let mut state = self.state.lock().unwrap();
        state.fail_writes.clear();
        state.fail_publish.clear();
        state.fail_ownership.clear();
        state.fail_user_emails.clear();
    }

    pub fn records_with_doi(&self, doi: &str) -> Vec<StoredRecord> {
        self.state
            .lock()
            .unwrap()
            .records
            .values()
            .filter(|r| r.doi == doi)
            .cloned()
            .collect()
    }

    pub fn record_count(&self) -> usize {
        self.state.lock().unwrap().records.len()
    }

    pub fn users(&self) -> Vec<ImportedUser> {
        self.state.lock().unwrap().users.clone()
    }

    pub fn communities(&self) -> Vec<Community> {
        self.state.lock().unwrap().communities.clone()
    }

    pub fn community(&self, slug: &str) -> Option<Community> {
        self.communities().into_iter().find(|c| c.slug == slug)
    }

    pub fn owners_of(&self, community: &CommunityId) -> Vec<UserId> {
        self.state
            .lock()
            .unwrap()
            .owners
            .iter()
            .filter(|(c, _)| c == community)
            .map(|(_, u)| u.clone())
            .collect()
    }

    pub fn aggregations(&self) -> Vec<(usize, NaiveDate, NaiveDate)> {
        self.state.lock().unwrap().aggregations.clone()
    }

    /// Seeds a community directly
    pub fn add_community(&self, slug: &str) -> Community {
        let community = Community::new(
            CommunityId::new(uuid::Uuid::new_v4().to_string()).unwrap(),
            slug,
        );
        self.state
            .lock()
            .unwrap()
            .communities
            .push(community.clone());
        community
    }

    fn with_draft<T>(
        &self,
        id: &RecordId,
        f: impl FnOnce(&mut StoredRecord) -> Result<T>,
    ) -> Result<T> {
        let mut state = self.state.lock().unwrap();
        let record = state
            .records
            .get_mut(id.as_str())
            .ok_or_else(|| StoreError::NotFound(format!("record {id}")))?;
        if !record.draft_open {
            return Err(rejected(format!("record {id} has no open draft")));
        }
        f(record)
    }
}

fn payload_doi(payload: &Value) -> String {
    payload["pids"]["doi"]["identifier"]
        .as_str()
        .unwrap_or_default()
        .to_string()
}

#[async_trait]
impl RecordStoreClient for MemoryStore {
    async fn find_by_doi(&self, doi: &Doi) -> Result<Option<ExistingRecord>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .records
            .values()
            .find(|r| r.doi == doi.as_str())
            .map(|r| ExistingRecord {
                id: r.id.clone(),
                is_published: r.is_published,
                communities: r.communities.clone(),
            }))
    }

    async fn create_draft(&self, payload: &Value) -> Result<RecordId> {
        let doi = payload_doi(payload);
        let mut state = self.state.lock().unwrap();
        if state.fail_writes.contains(&doi) {
            return Err(StoreError::ServerError {
                status: 500,
                message: format!("cannot create {doi}"),
            }
            .into());
        }

        state.next_id += 1;
        let id = RecordId::new(format!("rec-{:04}", state.next_id)).unwrap();
        state.records.insert(
            id.as_str().to_string(),
            StoredRecord {
                id: id.clone(),
                doi,
                payload: payload.clone(),
                is_published: false,
                draft_open: true,
                communities: Vec::new(),
                owner: None,
                files: Vec::new(),
                created: Utc::now(),
                publish_count: 0,
            },
        );
        Ok(id)
    }

    async fn edit_published(&self, id: &RecordId) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let record = state
            .records
            .get_mut(id.as_str())
            .ok_or_else(|| StoreError::NotFound(format!("record {id}")))?;
        if !record.is_published {
            return Err(rejected("record is not published"));
        }
        record.draft_open = true;
        Ok(())
    }

    async fn update_draft(&self, id: &RecordId, payload: &Value) -> Result<()> {
        let doi = payload_doi(payload);
        if self.state.lock().unwrap().fail_writes.contains(&doi) {
            return Err(StoreError::ServerError {
                status: 500,
                message: format!("cannot update {doi}"),
            }
            .into());
        }
        self.with_draft(id, |record| {
            record.payload = payload.clone();
            Ok(())
        })
    }

    async fn upload_files(&self, id: &RecordId, files: &[UploadFile]) -> Result<()> {
        for file in files {
            if !file.path.exists() {
                return Err(rejected(format!("{} missing", file.path.display())));
            }
        }
        self.with_draft(id, |record| {
            for file in files {
                if !record.files.contains(&file.key) {
                    record.files.push(file.key.clone());
                }
            }
            Ok(())
        })
    }

    async fn submit_to_community(&self, id: &RecordId, community: &CommunityId) -> Result<()> {
        self.with_draft(id, |record| {
            if record.is_published {
                return Err(rejected("published records cannot be submitted for review"));
            }
            if !record.communities.contains(community) {
                record.communities.push(community.clone());
            }
            Ok(())
        })
    }

    async fn publish(&self, id: &RecordId) -> Result<PublishedRecord> {
        {
            let state = self.state.lock().unwrap();
            if let Some(record) = state.records.get(id.as_str()) {
                if state.fail_publish.contains(&record.doi) {
                    return Err(StoreError::ServerError {
                        status: 503,
                        message: format!("cannot publish {}", record.doi),
                    }
                    .into());
                }
            }
        }
        self.with_draft(id, |record| {
            record.is_published = true;
            record.draft_open = false;
            record.publish_count += 1;
            Ok(PublishedRecord {
                id: record.id.clone(),
                created: record.created,
            })
        })
    }

    async fn transfer_ownership(&self, id: &RecordId, owner: &UserId) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let State {
            records,
            fail_ownership,
            ..
        } = &mut *state;
        let record = records
            .get_mut(id.as_str())
            .ok_or_else(|| StoreError::NotFound(format!("record {id}")))?;
        if fail_ownership.contains(&record.doi) {
            return Err(StoreError::ServerError {
                status: 500,
                message: format!("cannot transfer {}", record.doi),
            }
            .into());
        }
        record.owner = Some(owner.clone());
        Ok(())
    }

    async fn delete_record(&self, id: &RecordId) -> Result<()> {
        self.state
            .lock()
            .unwrap()
            .records
            .remove(id.as_str())
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(format!("record {id}")).into())
    }
}

#[async_trait]
impl CommunityService for MemoryStore {
    async fn find_community(&self, reference: &str) -> Result<Option<Community>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .communities
            .iter()
            .find(|c| c.slug == reference || c.id.as_str() == reference)
            .cloned())
    }

    async fn create_community(&self, request: &NewCommunity) -> Result<Community> {
        let mut state = self.state.lock().unwrap();
        if state.communities.iter().any(|c| c.slug == request.slug) {
            return Err(rejected(format!("slug {} taken", request.slug)));
        }
        let community = Community {
            id: CommunityId::new(uuid::Uuid::new_v4().to_string()).unwrap(),
            slug: request.slug.clone(),
            title: Some(request.title.clone()),
            parent: request.parent.clone(),
        };
        state.communities.push(community.clone());
        Ok(community)
    }

    async fn add_community_owner(&self, community: &CommunityId, user: &UserId) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let pair = (community.clone(), user.clone());
        if !state.owners.contains(&pair) {
            state.owners.push(pair);
        }
        Ok(())
    }
}

#[async_trait]
impl UserService for MemoryStore {
    async fn find_user_by_identity(&self, link: &IdentityLink) -> Result<Option<ImportedUser>> {
        let state = self.state.lock().unwrap();
        let id = state
            .identities
            .iter()
            .find(|(l, _)| l == link)
            .map(|(_, id)| id.clone());
        Ok(id.and_then(|id| state.users.iter().find(|u| u.id == id).cloned()))
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<ImportedUser>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .users
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn create_user(&self, request: &NewUser) -> Result<ImportedUser> {
        let mut state = self.state.lock().unwrap();
        if state.fail_user_emails.contains(&request.email) {
            return Err(StoreError::ServerError {
                status: 503,
                message: "user service unavailable".to_string(),
            }
            .into());
        }
        if state.users.iter().any(|u| u.email == request.email) {
            return Err(rejected("email already registered"));
        }
        let user = ImportedUser {
            id: UserId::new((state.users.len() + 100).to_string()).unwrap(),
            email: request.email.clone(),
            full_name: request.full_name.clone(),
        };
        state.users.push(user.clone());
        Ok(user)
    }
}

#[async_trait]
impl IdentityLinkService for MemoryStore {
    async fn link_identity(&self, user: &UserId, link: &IdentityLink) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if !state.identities.iter().any(|(l, _)| l == link) {
            state.identities.push((link.clone(), user.clone()));
        }
        Ok(())
    }
}

#[async_trait]
impl AggregationService for MemoryStore {
    async fn aggregate(
        &self,
        records: &[RecordId],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<AggregationReport> {
        self.state
            .lock()
            .unwrap()
            .aggregations
            .push((records.len(), start, end));
        Ok(AggregationReport {
            record_count: records.len(),
            start_date: start,
            end_date: end,
        })
    }
}

/// DOI of the `n`th fixture record
pub fn doi(n: usize) -> String {
    format!("10.17613/rec-{n}")
}

/// A valid serialized record line with an owner and a domain community
pub fn record_line(n: usize) -> String {
    record_value(n).to_string()
}

pub fn record_value(n: usize) -> Value {
    json!({
        "doi": doi(n),
        "metadata": {"title": format!("Deposit {n}"), "resource_type": {"id": "textDocument-journalArticle"}},
        "identifiers": [{"scheme": "hclegacy-pid", "identifier": format!("hc:{}", 1000 + n)}],
        "community": {"domain": "arlisna"},
        "owner": {"source_username": format!("user{n}"), "email": format!("user{n}@example.org"), "full_name": format!("User {n}")},
        "custom_fields": {"hclegacy:record_change_date": "2023-04-01"}
    })
}

/// Dataset, file storage and ledger in a temporary directory
pub struct Harness {
    pub dir: TempDir,
    pub store: Arc<MemoryStore>,
    pub dataset_path: PathBuf,
    pub files_dir: PathBuf,
    pub storage: Arc<JsonlLedgerStorage>,
}

impl Harness {
    pub fn new(lines: Vec<String>) -> Self {
        let dir = TempDir::new().unwrap();
        let dataset_path = dir.path().join("records.jsonl");
        std::fs::write(&dataset_path, lines.join("\n") + "\n").unwrap();

        let files_dir = dir.path().join("files");
        std::fs::create_dir_all(&files_dir).unwrap();

        let storage = Arc::new(JsonlLedgerStorage::new(
            dir.path().join("logs/created.jsonl"),
            dir.path().join("logs/failed.jsonl"),
        ));

        Self {
            dir,
            store: MemoryStore::new(),
            dataset_path,
            files_dir,
            storage,
        }
    }

    /// A dataset of `n` valid records
    pub fn with_records(n: usize) -> Self {
        Self::new((1..=n).map(record_line).collect())
    }

    pub fn services(&self) -> StoreServices {
        StoreServices::from_backend(self.store.clone())
    }

    /// Builds a coordinator as a fresh process would: dataset and ledger
    /// are re-read from disk
    pub async fn coordinator(&self, options: LoadOptions) -> LoadCoordinator {
        let services = self.services();
        let dataset = Arc::new(Dataset::open(&self.dataset_path).await.unwrap());
        let ledger = Arc::new(LedgerManager::open(self.storage.clone()).await.unwrap());
        let provisioner = Provisioner::new(&services, ProvisioningConfig::default());
        let loader = RecordLoader::new(
            services.records.clone(),
            provisioner,
            &self.files_dir,
            options.clone(),
        );
        LoadCoordinator::new(
            dataset,
            loader,
            ledger,
            AggregationTrigger::new(services.aggregation.clone()),
            options,
        )
    }

    pub async fn ledger(&self) -> LedgerManager {
        LedgerManager::open(self.storage.clone()).await.unwrap()
    }

    pub fn provisioner(&self) -> Provisioner {
        Provisioner::new(&self.services(), ProvisioningConfig::default())
    }
}
