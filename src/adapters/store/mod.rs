//! Target record-management store integration
//!
//! - [`traits`] - capability traits the core is written against
//! - [`http`] - REST implementation of every trait
//! - [`models`] - wire models of the REST API

pub mod http;
pub mod models;
pub mod traits;

pub use http::StoreHttpClient;
pub use traits::{
    AggregationReport, AggregationService, CommunityService, ExistingRecord,
    IdentityLinkService, PublishedRecord, RecordStoreClient, UploadFile, UserService,
};

use std::sync::Arc;

/// The set of store capabilities injected into the core
#[derive(Clone)]
pub struct StoreServices {
    pub records: Arc<dyn RecordStoreClient>,
    pub communities: Arc<dyn CommunityService>,
    pub users: Arc<dyn UserService>,
    pub identities: Arc<dyn IdentityLinkService>,
    pub aggregation: Arc<dyn AggregationService>,
}

impl StoreServices {
    /// Uses one backend for every capability
    pub fn from_backend<B>(backend: Arc<B>) -> Self
    where
        B: RecordStoreClient
            + CommunityService
            + UserService
            + IdentityLinkService
            + AggregationService
            + 'static,
    {
        Self {
            records: backend.clone(),
            communities: backend.clone(),
            users: backend.clone(),
            identities: backend.clone(),
            aggregation: backend,
        }
    }
}
