//! Runtime settings, resolved once at startup and passed explicitly into components.
//!
//! Resolution order for every value: command line / environment, then the
//! optional YAML file, then the built-in default. Missing search credentials
//! are *not* a startup error: the server still runs and the search feature
//! reports a configuration error per request.

use crate::cli::Cli;
use crate::error::{ConfigError, SearchError};
use serde::Deserialize;
use std::net::SocketAddr;
use std::time::Duration;
use tracing::{info, instrument, warn};
use url::Url;

pub const DEFAULT_BIND: &str = "127.0.0.1:8001";
pub const DEFAULT_SEARCH_ENDPOINT: &str = "https://openapi.naver.com/v1/search/news.json";
pub const DEFAULT_THUMBNAIL_TIMEOUT_MS: u64 = 3000;

/// Client id / secret pair for the Naver search API.
///
/// Either half may be absent; [`NaverCredentials::require`] turns that into a
/// [`SearchError::Configuration`] before any request is built.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct NaverCredentials {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
}

impl NaverCredentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: Some(client_id.into()),
            client_secret: Some(client_secret.into()),
        }
    }

    /// Borrow both credentials, or fail with a configuration error.
    ///
    /// Blank strings count as missing.
    pub fn require(&self) -> Result<(&str, &str), SearchError> {
        let id = non_blank(self.client_id.as_deref());
        let secret = non_blank(self.client_secret.as_deref());
        match (id, secret) {
            (Some(id), Some(secret)) => Ok((id, secret)),
            (None, None) => Err(SearchError::Configuration(
                "client id and client secret are missing".to_string(),
            )),
            (None, Some(_)) => Err(SearchError::Configuration(
                "client id is missing".to_string(),
            )),
            (Some(_), None) => Err(SearchError::Configuration(
                "client secret is missing".to_string(),
            )),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.require().is_ok()
    }
}

// Secrets stay out of logs.
impl std::fmt::Debug for NaverCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NaverCredentials")
            .field("client_id", &self.client_id.as_ref().map(|_| "<set>"))
            .field("client_secret", &self.client_secret.as_ref().map(|_| "<set>"))
            .finish()
    }
}

fn non_blank(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

/// Shape of the optional YAML settings file.
///
/// ```yaml
/// bind: "0.0.0.0:8001"
/// thumbnail_timeout_ms: 3000
/// naver:
///   client_id: "abc"
///   client_secret: "xyz"
///   endpoint: "https://openapi.naver.com/v1/search/news.json"
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileSettings {
    pub bind: Option<String>,
    pub thumbnail_timeout_ms: Option<u64>,
    #[serde(default)]
    pub naver: FileNaverSettings,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileNaverSettings {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub endpoint: Option<String>,
}

impl FileSettings {
    /// Parse settings from YAML text. `path` is only used for error messages.
    pub fn from_yaml(text: &str, path: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_string(),
            source,
        })
    }

    #[instrument(level = "info")]
    pub async fn load(path: &str) -> Result<Self, ConfigError> {
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.to_string(),
                source,
            })?;
        let settings = Self::from_yaml(&text, path)?;
        info!(path, "Loaded settings file");
        Ok(settings)
    }
}

/// Fully resolved settings.
#[derive(Debug, Clone)]
pub struct Settings {
    pub bind: SocketAddr,
    pub credentials: NaverCredentials,
    pub search_endpoint: Url,
    pub thumbnail_timeout: Duration,
}

impl Settings {
    /// Merge CLI/env values over file values over defaults.
    pub fn resolve(cli: &Cli, file: FileSettings) -> Result<Self, ConfigError> {
        let bind_raw = cli
            .bind
            .clone()
            .or(file.bind)
            .unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind = bind_raw
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::Invalid {
                field: "bind",
                reason: format!("{bind_raw}: {e}"),
            })?;

        let endpoint_raw = cli
            .search_endpoint
            .clone()
            .or(file.naver.endpoint)
            .unwrap_or_else(|| DEFAULT_SEARCH_ENDPOINT.to_string());
        let search_endpoint = Url::parse(&endpoint_raw).map_err(|e| ConfigError::Invalid {
            field: "search_endpoint",
            reason: format!("{endpoint_raw}: {e}"),
        })?;

        let timeout_ms = cli
            .thumbnail_timeout_ms
            .or(file.thumbnail_timeout_ms)
            .unwrap_or(DEFAULT_THUMBNAIL_TIMEOUT_MS);
        if timeout_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "thumbnail_timeout_ms",
                reason: "must be greater than zero".to_string(),
            });
        }

        let credentials = NaverCredentials {
            client_id: cli.naver_client_id.clone().or(file.naver.client_id),
            client_secret: cli.naver_client_secret.clone().or(file.naver.client_secret),
        };
        if !credentials.is_complete() {
            warn!("Naver credentials are incomplete; news search will report a configuration error");
        }

        Ok(Self {
            bind,
            credentials,
            search_endpoint,
            thumbnail_timeout: Duration::from_millis(timeout_ms),
        })
    }
}
