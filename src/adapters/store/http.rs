//! REST client for the target store
//!
//! One [`StoreHttpClient`] implements every capability trait. All calls go
//! through [`StoreHttpClient::execute`], which attaches the admin bearer
//! token, maps HTTP statuses onto [`StoreError`] and retries transient
//! failures with exponential backoff.

use super::models::{
    AggregationResponse, CommunityResponse, DraftResponse, PublishResponse, RecordHit,
    ReviewResponse, SearchResponse, UserResponse,
};
use super::traits::{
    AggregationReport, AggregationService, CommunityService, ExistingRecord,
    IdentityLinkService, PublishedRecord, RecordStoreClient, UploadFile, UserService,
};
use crate::config::{RetryConfig, StoreConfig};
use crate::domain::ids::{CommunityId, Doi, RecordId, UserId};
use crate::domain::{
    Community, IdentityLink, ImportedUser, ImporterError, NewCommunity, NewUser, Result,
    StoreError,
};
use crate::log_retry_attempt;
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::header::ACCEPT;
use reqwest::{Client, ClientBuilder, Method, Response, StatusCode};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::future::Future;
use std::time::Duration;
use url::Url;

/// Request body variants
#[derive(Clone, Copy)]
enum Body<'a> {
    Empty,
    Json(&'a Value),
    Bytes(&'a [u8]),
}

/// HTTP implementation of the store capability traits
pub struct StoreHttpClient {
    base_url: Url,
    client: Client,
    config: StoreConfig,
}

impl StoreHttpClient {
    /// Builds a client from the `[store]` configuration
    ///
    /// # Errors
    ///
    /// Returns [`ImporterError::Configuration`] if the base URL is invalid or
    /// the HTTP client cannot be constructed.
    pub fn new(config: StoreConfig) -> Result<Self> {
        let mut base = config.base_url.clone();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base).map_err(|e| {
            ImporterError::Configuration(format!("Invalid store.base_url '{}': {e}", config.base_url))
        })?;

        let mut client_builder = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(30));
        if !config.tls_verify {
            client_builder = client_builder.danger_accept_invalid_certs(true);
        }
        let client = client_builder.build().map_err(|e| {
            ImporterError::Configuration(format!("Failed to build HTTP client: {e}"))
        })?;

        Ok(Self {
            base_url,
            client,
            config,
        })
    }

    /// Base URL requests are resolved against
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Checks that the store answers with the configured token
    pub async fn health_check(&self) -> Result<()> {
        let mut url = self.endpoint("api/records")?;
        url.query_pairs_mut().append_pair("size", "1");
        self.execute(Method::GET, url, Body::Empty).await?;
        Ok(())
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url.join(path).map_err(|e| {
            ImporterError::Configuration(format!("Invalid store endpoint '{path}': {e}"))
        })
    }

    fn search_endpoint(&self, path: &str, query: &str) -> Result<Url> {
        let mut url = self.endpoint(path)?;
        url.query_pairs_mut()
            .append_pair("q", query)
            .append_pair("size", "1");
        Ok(url)
    }

    async fn execute(
        &self,
        method: Method,
        url: Url,
        body: Body<'_>,
    ) -> std::result::Result<Response, StoreError> {
        self.retry_request(|| async {
            let token = self.config.api_token.expose_secret();
            let mut request = self
                .client
                .request(method.clone(), url.clone())
                .bearer_auth(token.as_ref())
                .header(ACCEPT, "application/json");
            request = match body {
                Body::Empty => request,
                Body::Json(value) => request.json(value),
                Body::Bytes(bytes) => request
                    .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
                    .body(bytes.to_vec()),
            };

            let response = request.send().await.map_err(map_transport_error)?;
            check_status(response).await
        })
        .await
    }

    async fn execute_json<T: DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        body: Body<'_>,
    ) -> std::result::Result<T, StoreError> {
        let response = self.execute(method, url, body).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| StoreError::InvalidResponse(e.to_string()))
    }

    /// Retry a request with exponential backoff
    ///
    /// Only transient errors are retried; client errors return at once.
    async fn retry_request<F, T, Fut>(&self, operation: F) -> std::result::Result<T, StoreError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = std::result::Result<T, StoreError>>,
    {
        let retry = &self.config.retry;
        let mut attempt = 0;

        loop {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) if e.is_transient() && attempt < retry.max_retries => {
                    attempt += 1;
                    log_retry_attempt!(attempt, retry.max_retries, e);
                    tokio::time::sleep(backoff_delay(retry, attempt)).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn search_record(&self, path: &str, doi: &Doi) -> Result<Option<ExistingRecord>> {
        let url = self.search_endpoint(path, &format!("pids.doi.identifier:\"{doi}\""))?;
        let resp: SearchResponse<RecordHit> =
            self.execute_json(Method::GET, url, Body::Empty).await?;
        Ok(resp
            .into_first()
            .map(ExistingRecord::try_from)
            .transpose()?)
    }

    async fn search_user(&self, query: &str) -> Result<Option<ImportedUser>> {
        let url = self.search_endpoint("api/users", query)?;
        let resp: SearchResponse<UserResponse> =
            self.execute_json(Method::GET, url, Body::Empty).await?;
        Ok(resp.into_first().map(ImportedUser::try_from).transpose()?)
    }

    async fn upload_one(&self, id: &RecordId, file: &UploadFile) -> Result<()> {
        let content = tokio::fs::read(&file.path).await.map_err(|e| {
            ImporterError::FetchFailed(format!("Cannot read {}: {e}", file.path.display()))
        })?;

        let files_path = format!("api/records/{id}/draft/files");
        let key_path = format!("{files_path}/{}", encode_segment(&file.key));

        // Replace a previous upload under the same key
        match self
            .execute(Method::DELETE, self.endpoint(&key_path)?, Body::Empty)
            .await
        {
            Ok(_) | Err(StoreError::NotFound(_)) => {}
            Err(e) => return Err(e.into()),
        }

        let init = json!([{ "key": file.key, "size": file.size }]);
        self.execute(Method::POST, self.endpoint(&files_path)?, Body::Json(&init))
            .await?;
        self.execute(
            Method::PUT,
            self.endpoint(&format!("{key_path}/content"))?,
            Body::Bytes(&content),
        )
        .await?;
        self.execute(
            Method::POST,
            self.endpoint(&format!("{key_path}/commit"))?,
            Body::Empty,
        )
        .await?;

        tracing::debug!(record_id = %id, key = %file.key, size = file.size, "File uploaded");
        Ok(())
    }
}

#[async_trait]
impl RecordStoreClient for StoreHttpClient {
    async fn find_by_doi(&self, doi: &Doi) -> Result<Option<ExistingRecord>> {
        if let Some(mut record) = self.search_record("api/records", doi).await? {
            record.is_published = true;
            return Ok(Some(record));
        }
        self.search_record("api/user/records", doi).await
    }

    async fn create_draft(&self, payload: &Value) -> Result<RecordId> {
        let url = self.endpoint("api/records")?;
        let resp: DraftResponse = self
            .execute_json(Method::POST, url, Body::Json(payload))
            .await?;
        RecordId::new(resp.id).map_err(|e| StoreError::InvalidResponse(e).into())
    }

    async fn edit_published(&self, id: &RecordId) -> Result<()> {
        let url = self.endpoint(&format!("api/records/{id}/draft"))?;
        self.execute(Method::POST, url, Body::Empty).await?;
        Ok(())
    }

    async fn update_draft(&self, id: &RecordId, payload: &Value) -> Result<()> {
        let url = self.endpoint(&format!("api/records/{id}/draft"))?;
        self.execute(Method::PUT, url, Body::Json(payload)).await?;
        Ok(())
    }

    async fn upload_files(&self, id: &RecordId, files: &[UploadFile]) -> Result<()> {
        for file in files {
            self.upload_one(id, file).await?;
        }
        Ok(())
    }

    async fn submit_to_community(&self, id: &RecordId, community: &CommunityId) -> Result<()> {
        let review = json!({
            "receiver": { "community": community.as_str() },
            "type": "community-submission",
        });
        let url = self.endpoint(&format!("api/records/{id}/draft/review"))?;
        self.execute(Method::PUT, url, Body::Json(&review)).await?;

        let submit = json!({
            "payload": { "content": "Imported legacy deposit", "format": "html" }
        });
        let url = self.endpoint(&format!("api/records/{id}/draft/actions/submit-review"))?;
        let resp: ReviewResponse = self
            .execute_json(Method::POST, url, Body::Json(&submit))
            .await?;
        tracing::debug!(record_id = %id, community = %community, request = ?resp.id, "Submitted to community");
        Ok(())
    }

    async fn publish(&self, id: &RecordId) -> Result<PublishedRecord> {
        let url = self.endpoint(&format!("api/records/{id}/draft/actions/publish"))?;
        let resp: PublishResponse = self.execute_json(Method::POST, url, Body::Empty).await?;
        Ok(PublishedRecord {
            id: RecordId::new(resp.id).map_err(StoreError::InvalidResponse)?,
            created: resp.created,
        })
    }

    async fn transfer_ownership(&self, id: &RecordId, owner: &UserId) -> Result<()> {
        let body = json!({ "owned_by": { "user": owner.as_str() } });
        let url = self.endpoint(&format!("api/records/{id}/access/owner"))?;
        self.execute(Method::PUT, url, Body::Json(&body)).await?;
        Ok(())
    }

    async fn delete_record(&self, id: &RecordId) -> Result<()> {
        let url = self.endpoint(&format!("api/records/{id}"))?;
        self.execute(Method::DELETE, url, Body::Empty).await?;
        Ok(())
    }
}

#[async_trait]
impl CommunityService for StoreHttpClient {
    async fn find_community(&self, reference: &str) -> Result<Option<Community>> {
        let url = self.endpoint(&format!("api/communities/{}", encode_segment(reference)))?;
        match self
            .execute_json::<CommunityResponse>(Method::GET, url, Body::Empty)
            .await
        {
            Ok(resp) => Ok(Some(Community::try_from(resp)?)),
            Err(StoreError::NotFound(_)) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn create_community(&self, request: &NewCommunity) -> Result<Community> {
        let mut body = json!({
            "slug": request.slug,
            "metadata": {
                "title": request.title,
                "type": { "id": request.community_type },
            },
            "access": {
                "visibility": request.visibility,
                "member_policy": "open",
                "record_policy": "open",
            },
        });
        if let Some(parent) = &request.parent {
            body["parent"] = json!({ "id": parent.as_str() });
        }

        let url = self.endpoint("api/communities")?;
        let resp: CommunityResponse = self
            .execute_json(Method::POST, url, Body::Json(&body))
            .await?;
        Ok(Community::try_from(resp)?)
    }

    async fn add_community_owner(&self, community: &CommunityId, user: &UserId) -> Result<()> {
        let body = json!({
            "members": [{ "type": "user", "id": user.as_str() }],
            "role": "owner",
        });
        let url = self.endpoint(&format!("api/communities/{community}/members"))?;
        self.execute(Method::POST, url, Body::Json(&body)).await?;
        Ok(())
    }
}

#[async_trait]
impl UserService for StoreHttpClient {
    async fn find_user_by_identity(&self, link: &IdentityLink) -> Result<Option<ImportedUser>> {
        self.search_user(&format!(
            "identities.{}:\"{}\"",
            link.origin, link.source_username
        ))
        .await
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<ImportedUser>> {
        self.search_user(&format!("email:\"{email}\"")).await
    }

    async fn create_user(&self, request: &NewUser) -> Result<ImportedUser> {
        let mut body = json!({
            "email": request.email,
            "active": true,
            "confirmed": true,
            "profile": { "full_name": request.full_name.clone().unwrap_or_default() },
        });
        if let Some(username) = &request.username {
            body["username"] = json!(username);
        }

        let url = self.endpoint("api/users")?;
        let resp: UserResponse = self
            .execute_json(Method::POST, url, Body::Json(&body))
            .await?;
        Ok(ImportedUser::try_from(resp)?)
    }
}

#[async_trait]
impl IdentityLinkService for StoreHttpClient {
    async fn link_identity(&self, user: &UserId, link: &IdentityLink) -> Result<()> {
        let body = json!({ "method": link.origin, "id": link.source_username });
        let url = self.endpoint(&format!("api/users/{user}/identities"))?;
        self.execute(Method::POST, url, Body::Json(&body)).await?;
        Ok(())
    }
}

#[async_trait]
impl AggregationService for StoreHttpClient {
    async fn aggregate(
        &self,
        records: &[RecordId],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<AggregationReport> {
        let body = json!({
            "records": records.iter().map(RecordId::as_str).collect::<Vec<_>>(),
            "start_date": start.format("%Y-%m-%d").to_string(),
            "end_date": end.format("%Y-%m-%d").to_string(),
        });
        let url = self.endpoint("api/stats/aggregate")?;
        let resp: AggregationResponse = self
            .execute_json(Method::POST, url, Body::Json(&body))
            .await
            .map_err(|e| ImporterError::Aggregation(e.to_string()))?;
        Ok(AggregationReport {
            record_count: resp.aggregated,
            start_date: start,
            end_date: end,
        })
    }
}

fn backoff_delay(retry: &RetryConfig, attempt: usize) -> Duration {
    let exponent = i32::try_from(attempt.saturating_sub(1)).unwrap_or(i32::MAX);
    let delay_ms = retry.initial_delay_ms as f64 * retry.backoff_multiplier.powi(exponent);
    Duration::from_millis((delay_ms as u64).min(retry.max_delay_ms))
}

fn encode_segment(segment: &str) -> String {
    url::form_urlencoded::byte_serialize(segment.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

fn map_transport_error(err: reqwest::Error) -> StoreError {
    if err.is_timeout() {
        StoreError::Timeout(err.to_string())
    } else {
        StoreError::ConnectionFailed(err.to_string())
    }
}

async fn check_status(response: Response) -> std::result::Result<Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response.text().await.unwrap_or_default();
    Err(match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            StoreError::AuthenticationFailed(format!("{status}: {message}"))
        }
        StatusCode::NOT_FOUND => StoreError::NotFound(message),
        StatusCode::TOO_MANY_REQUESTS => StoreError::RateLimited(message),
        s if s.is_server_error() => StoreError::ServerError {
            status: s.as_u16(),
            message,
        },
        s => StoreError::ClientError {
            status: s.as_u16(),
            message,
        },
    })
}
