//! Record source contract + the HTTP listing-feed implementation.

use async_trait::async_trait;
use jobstat_core::JobRecord;
use jobstat_storage::{FetchError, HttpFetcher};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use thiserror::Error;
use tracing::{debug, warn};

pub const CRATE_NAME: &str = "jobstat-source";

pub const DEFAULT_BASE_URL: &str = "https://api.itjobs.pt/job/list.json";

/// One 1-based page of a paginated listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl PageRequest {
    pub fn new(page: u32, limit: u32) -> Self {
        Self { page, limit }
    }
}

/// A bounded page of records plus the feed's total-count hint.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RecordPage {
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub results: Vec<JobRecord>,
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("source rejected the request: {0}")]
    Rejected(String),
    #[error("{0}")]
    Message(String),
}

#[async_trait]
pub trait RecordSource: Send + Sync {
    fn source_id(&self) -> &str;

    async fn fetch_page(&self, request: PageRequest) -> Result<RecordPage, SourceError>;
}

/// Listing endpoint keyed by a static API credential.
#[derive(Debug)]
pub struct ItJobsSource {
    http: HttpFetcher,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct ListResponse {
    #[serde(default)]
    total: Option<u64>,
    #[serde(default)]
    results: Option<Vec<JsonValue>>,
    #[serde(default)]
    error: Option<JsonValue>,
}

impl ItJobsSource {
    pub fn new(http: HttpFetcher, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl RecordSource for ItJobsSource {
    fn source_id(&self) -> &str {
        "itjobs"
    }

    async fn fetch_page(&self, request: PageRequest) -> Result<RecordPage, SourceError> {
        let query = [
            ("api_key", self.api_key.clone()),
            ("limit", request.limit.to_string()),
            ("page", request.page.to_string()),
        ];
        let response: ListResponse = self.http.get_json(&self.base_url, &query).await?;
        if let Some(error) = response.error {
            return Err(SourceError::Rejected(describe_error(&error)));
        }
        let results = decode_records(response.results.unwrap_or_default());
        debug!(
            page = request.page,
            results = results.len(),
            total = ?response.total,
            "listing page decoded"
        );
        Ok(RecordPage {
            total: response.total,
            results,
        })
    }
}

/// Records that do not decode are logged and dropped; the rest of the page is kept.
fn decode_records(raw: Vec<JsonValue>) -> Vec<JobRecord> {
    raw.into_iter()
        .filter_map(|value| {
            let id = value.get("id").cloned();
            match serde_json::from_value::<JobRecord>(value) {
                Ok(record) => Some(record),
                Err(err) => {
                    warn!(id = ?id, error = %err, "skipping undecodable listing record");
                    None
                }
            }
        })
        .collect()
}

fn describe_error(error: &JsonValue) -> String {
    error
        .get("message")
        .and_then(|m| m.as_str())
        .map(str::to_string)
        .unwrap_or_else(|| error.to_string())
}
