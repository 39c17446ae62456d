//! Error types for the search feature and for settings resolution.
//!
//! Thumbnail failures deliberately have no type here: they are absorbed into
//! `None` inside the [`crate::thumbnail`] module and only ever logged.

use thiserror::Error;

/// Errors surfaced by the search client and, unchanged, by the pipeline.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SearchError {
    /// Credentials are missing. Detected before any network access.
    #[error("search is not configured: {0}")]
    Configuration(String),

    /// The search API rejected the request with a structured error payload.
    #[error("Naver API error: {message} (code: {code})")]
    Upstream { code: String, message: String },

    /// Any other failure reaching or decoding the search API.
    ///
    /// The payload is diagnostic detail for logs only; see [`SearchError::user_message`].
    #[error("search transport failure: {0}")]
    Transport(String),
}

impl SearchError {
    /// Text that is safe to show to an end user.
    ///
    /// Upstream errors keep their code and message verbatim; transport errors
    /// are reduced to a generic sentence so internal detail is not leaked.
    pub fn user_message(&self) -> String {
        match self {
            SearchError::Configuration(_) => {
                "Set NAVER_CLIENT_ID and NAVER_CLIENT_SECRET to enable news search.".to_string()
            }
            SearchError::Upstream { .. } => self.to_string(),
            SearchError::Transport(_) => {
                "An unknown error occurred while fetching news.".to_string()
            }
        }
    }
}

impl From<reqwest::Error> for SearchError {
    fn from(e: reqwest::Error) -> Self {
        SearchError::Transport(e.to_string())
    }
}

/// Errors raised while resolving [`crate::config::Settings`] at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}
