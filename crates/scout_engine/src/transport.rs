use std::time::Duration;

use bytes::Bytes;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use url::Url;
use scout_core::{
    ApiError, Business, BusinessPage, ExportRequest, ExportResult, JobSnapshot, PageQuery,
    SearchHistoryEntry, SearchKey,
};
use scout_logging::{scout_debug, scout_warn};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::wire::{DataEnvelope, ListEnvelope, PageEnvelope, StartJobBody};

pub const DEFAULT_API_URL: &str = "https://map-scraper-backend.onrender.com/api";

#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    /// Whole-request limit. `None` lets a hung call wait indefinitely.
    pub request_timeout: Option<Duration>,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: None,
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SetupError {
    #[error("invalid api url {url:?}: {message}")]
    InvalidBaseUrl { url: String, message: String },
    #[error("failed to build http client: {0}")]
    Client(String),
}

/// Logical operations of the remote scraping service.
///
/// One call per operation, no retries; failures come back as [`ApiError`].
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    async fn start_job(&self, key: &SearchKey) -> Result<JobSnapshot, ApiError>;

    async fn job_status(&self, key: &SearchKey) -> Result<JobSnapshot, ApiError>;

    async fn list_businesses(&self, query: &PageQuery) -> Result<BusinessPage, ApiError>;

    async fn search_businesses(&self, key: &SearchKey) -> Result<Vec<Business>, ApiError>;

    async fn delete_business(&self, id: &str) -> Result<(), ApiError>;

    async fn export_businesses(&self, request: &ExportRequest) -> Result<ExportResult, ApiError>;

    /// Health probe; the payload shape is up to the server.
    async fn probe(&self) -> Result<serde_json::Value, ApiError>;

    async fn search_history(&self) -> Result<Vec<SearchHistoryEntry>, ApiError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    base: Url,
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(settings: ApiSettings) -> Result<Self, SetupError> {
        let invalid = |message: String| SetupError::InvalidBaseUrl {
            url: settings.base_url.clone(),
            message,
        };
        let base = Url::parse(settings.base_url.trim()).map_err(|err| invalid(err.to_string()))?;
        if base.cannot_be_a_base() || !matches!(base.scheme(), "http" | "https") {
            return Err(invalid("expected an absolute http(s) url".to_string()));
        }

        let mut builder = reqwest::Client::builder().connect_timeout(settings.connect_timeout);
        if let Some(timeout) = settings.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|err| SetupError::Client(err.to_string()))?;

        Ok(Self { base, client })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::Network(format!("cannot extend {}", self.base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn with_key(mut url: Url, key: &SearchKey) -> Url {
        url.query_pairs_mut()
            .append_pair("keyword", &key.keyword)
            .append_pair("location", &key.location);
        url
    }

    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        let body = self.send(self.client.get(url.clone()), &url).await?;
        decode(&body)
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<T, ApiError> {
        let payload = serde_json::to_vec(body).map_err(|err| ApiError::Decode(err.to_string()))?;
        let request = self
            .client
            .post(url.clone())
            .header(CONTENT_TYPE, "application/json")
            .body(payload);
        let body = self.send(request, &url).await?;
        decode(&body)
    }

    async fn send(&self, request: reqwest::RequestBuilder, url: &Url) -> Result<Bytes, ApiError> {
        scout_debug!("request {}", url);
        let response = request
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|err| map_reqwest_error(url, err))?;

        let status = response.status();
        if !status.is_success() {
            scout_warn!("{} answered {}", url.path(), status);
            return Err(ApiError::HttpStatus {
                status: status.as_u16(),
            });
        }
        response
            .bytes()
            .await
            .map_err(|err| map_reqwest_error(url, err))
    }
}

#[async_trait::async_trait]
impl Transport for ReqwestTransport {
    async fn start_job(&self, key: &SearchKey) -> Result<JobSnapshot, ApiError> {
        let url = self.endpoint(&["scraper", "scrape"])?;
        let body = StartJobBody {
            keyword: &key.keyword,
            location: &key.location,
            run_async: true,
        };
        let envelope: DataEnvelope<JobSnapshot> = self.post(url, &body).await?;
        Ok(envelope.data)
    }

    async fn job_status(&self, key: &SearchKey) -> Result<JobSnapshot, ApiError> {
        let url = Self::with_key(self.endpoint(&["scraper", "status"])?, key);
        let envelope: DataEnvelope<JobSnapshot> = self.get(url).await?;
        Ok(envelope.data)
    }

    async fn list_businesses(&self, query: &PageQuery) -> Result<BusinessPage, ApiError> {
        let mut url = self.endpoint(&["businesses"])?;
        url.query_pairs_mut()
            .append_pair("page", &query.page.to_string())
            .append_pair("limit", &query.limit.to_string());
        if let Some(filter) = &query.filter {
            url = Self::with_key(url, filter);
        }
        let envelope: PageEnvelope = self.get(url).await?;
        Ok(BusinessPage {
            items: envelope.data,
            pagination: envelope.pagination,
        })
    }

    async fn search_businesses(&self, key: &SearchKey) -> Result<Vec<Business>, ApiError> {
        let url = Self::with_key(self.endpoint(&["businesses", "search"])?, key);
        let envelope: ListEnvelope<Business> = self.get(url).await?;
        Ok(envelope.data)
    }

    async fn delete_business(&self, id: &str) -> Result<(), ApiError> {
        let url = self.endpoint(&["businesses", id])?;
        // Any 2xx counts as an acknowledgement; the body is ignored.
        self.send(self.client.delete(url.clone()), &url).await?;
        Ok(())
    }

    async fn export_businesses(&self, request: &ExportRequest) -> Result<ExportResult, ApiError> {
        let url = self.endpoint(&["businesses", "export"])?;
        self.post(url, request).await
    }

    async fn probe(&self) -> Result<serde_json::Value, ApiError> {
        let url = self.endpoint(&["scraper", "test"])?;
        self.get(url).await
    }

    async fn search_history(&self) -> Result<Vec<SearchHistoryEntry>, ApiError> {
        let url = self.endpoint(&["businesses", "history", "searches"])?;
        let envelope: ListEnvelope<SearchHistoryEntry> = self.get(url).await?;
        Ok(envelope.data)
    }
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|err| ApiError::Decode(err.to_string()))
}

fn map_reqwest_error(url: &Url, err: reqwest::Error) -> ApiError {
    scout_warn!("request to {} failed: {}", url.path(), err);
    if err.is_decode() {
        return ApiError::Decode(err.to_string());
    }
    ApiError::Network(err.to_string())
}
