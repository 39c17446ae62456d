//! Data models for news search results and their enriched representations.
//!
//! This module defines the core data structures used throughout the application:
//! - [`SearchQuery`]: A validated, non-empty search string
//! - [`RawArticle`]: One result item exactly as returned by the search API
//! - [`EnrichedArticle`]: A raw article plus an optional thumbnail URL
//! - [`NewsPage`]: The payload handed to the presentation layer
//! - [`SearchOutcome`]: Either "no query" or an ordered list of enriched articles
//!
//! The search API uses camelCase / run-together field names (`originallink`,
//! `pubDate`), which are kept on the wire through serde renames.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A non-empty, whitespace-trimmed search string.
///
/// Construct with [`SearchQuery::parse`]; blank or absent input yields `None`,
/// which callers treat as "redirect to the empty view" rather than an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery(String);

impl SearchQuery {
    /// Parse an optional raw query string.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// assert!(SearchQuery::parse(Some("  election ")).is_some());
    /// assert!(SearchQuery::parse(Some("   ")).is_none());
    /// assert!(SearchQuery::parse(None).is_none());
    /// ```
    pub fn parse(raw: Option<&str>) -> Option<Self> {
        let trimmed = raw?.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SearchQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One news item as returned by the search API.
///
/// All fields are kept as the upstream sends them (titles and descriptions may
/// contain `<b>` highlight markup). Missing fields decode to empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct RawArticle {
    /// Headline of the article.
    #[serde(default)]
    pub title: String,
    /// Link to the publisher's own page for the article.
    #[serde(default)]
    pub originallink: String,
    /// Link to the aggregator's copy of the article.
    #[serde(default)]
    pub link: String,
    /// Short snippet of the article body.
    #[serde(default)]
    pub description: String,
    /// Publication timestamp, RFC 2822 style as sent upstream.
    #[serde(default, rename = "pubDate")]
    pub pub_date: String,
}

/// A [`RawArticle`] plus the thumbnail resolved for it, if any.
///
/// Serializes flat: the raw fields followed by `"thumbnail": "…" | null`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct EnrichedArticle {
    #[serde(flatten)]
    pub article: RawArticle,
    pub thumbnail: Option<String>,
}

impl EnrichedArticle {
    pub fn new(article: RawArticle, thumbnail: Option<String>) -> Self {
        Self { article, thumbnail }
    }
}

/// View payload produced for the presentation layer.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct NewsPage {
    pub articles: Vec<EnrichedArticle>,
    pub query: String,
}

impl NewsPage {
    /// The page shown before any search has been made.
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Result of running the aggregation pipeline for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// The caller supplied no usable query; show the empty view.
    NoQuery,
    /// Enriched results, in the order the search API returned them.
    Found {
        query: SearchQuery,
        articles: Vec<EnrichedArticle>,
    },
}
