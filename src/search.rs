//! Client for the Naver news search API.
//!
//! One call to [`NewsSearch::search`] makes exactly one HTTP request: no
//! retries, so a failing search surfaces to the user immediately. The client
//! distinguishes three failure kinds (see [`SearchError`]):
//!
//! - missing credentials, reported before any request is built;
//! - a structured rejection (`{"errorCode": …, "errorMessage": …}`), kept verbatim;
//! - everything else (network, unexpected status, malformed JSON), reported as
//!   a transport failure.

use crate::config::NaverCredentials;
use crate::error::SearchError;
use crate::models::{RawArticle, SearchQuery};
use crate::utils::truncate_for_log;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::{Duration, Instant};
use tracing::{error, info, instrument, warn};
use url::Url;

/// Number of results requested per search.
pub const DISPLAY: u32 = 10;
/// Sort mode sent upstream: relevance ("similarity") order.
pub const SORT: &str = "sim";

const HEADER_CLIENT_ID: &str = "X-Naver-Client-Id";
const HEADER_CLIENT_SECRET: &str = "X-Naver-Client-Secret";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// A source of news search results.
#[async_trait]
pub trait NewsSearch: Send + Sync {
    /// Search for `query`, returning articles in upstream order.
    async fn search(&self, query: &SearchQuery) -> Result<Vec<RawArticle>, SearchError>;
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<RawArticle>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiErrorBody {
    error_code: String,
    error_message: String,
}

/// [`NewsSearch`] backed by the Naver open API.
#[derive(Debug, Clone)]
pub struct NaverSearchClient {
    client: Client,
    endpoint: Url,
    credentials: NaverCredentials,
}

impl NaverSearchClient {
    pub fn new(endpoint: Url, credentials: NaverCredentials) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            endpoint,
            credentials,
        })
    }
}

#[async_trait]
impl NewsSearch for NaverSearchClient {
    #[instrument(level = "info", skip_all, fields(query = %query))]
    async fn search(&self, query: &SearchQuery) -> Result<Vec<RawArticle>, SearchError> {
        let (client_id, client_secret) = self.credentials.require().inspect_err(|e| {
            error!(error = %e, "Search requested without credentials");
        })?;

        let t0 = Instant::now();
        let response = self
            .client
            .get(self.endpoint.clone())
            .query(&[("query", query.as_str()), ("sort", SORT)])
            .query(&[("display", DISPLAY)])
            .header(HEADER_CLIENT_ID, client_id)
            .header(HEADER_CLIENT_SECRET, client_secret)
            .send()
            .await
            .inspect_err(|e| error!(error = %e, "Search request failed"))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .inspect_err(|e| error!(%status, error = %e, "Failed reading search response"))?;

        if !status.is_success() {
            return Err(match serde_json::from_str::<ApiErrorBody>(&body) {
                Ok(api_error) => {
                    warn!(
                        %status,
                        code = %api_error.error_code,
                        message = %api_error.error_message,
                        "Search API rejected the request"
                    );
                    SearchError::Upstream {
                        code: api_error.error_code,
                        message: api_error.error_message,
                    }
                }
                Err(_) => {
                    error!(%status, body = %truncate_for_log(&body, 300), "Search API failed without an error payload");
                    SearchError::Transport(format!("unexpected status {status}"))
                }
            });
        }

        let parsed: SearchResponse = serde_json::from_str(&body).map_err(|e| {
            error!(error = %e, body = %truncate_for_log(&body, 300), "Malformed search response");
            SearchError::Transport(format!("malformed search response: {e}"))
        })?;

        info!(
            count = parsed.items.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Search completed"
        );
        Ok(parsed.items)
    }
}
