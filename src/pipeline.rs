//! Search-then-enrich aggregation.
//!
//! [`NewsPipeline::search_with_thumbnails`] runs one search, then fans out one
//! thumbnail fetch per result as independent tokio tasks and waits for every
//! task to settle. Each task's settlement is inspected on its own: a fetch
//! that panics or is cancelled becomes a missing thumbnail and never disturbs
//! its siblings or the response. Outcomes are zipped back onto the articles by
//! position, so the output order is exactly the search order.

use crate::error::SearchError;
use crate::models::{EnrichedArticle, RawArticle, SearchOutcome, SearchQuery};
use crate::search::NewsSearch;
use crate::thumbnail::ThumbnailFetcher;
use futures::future::join_all;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinHandle;
use tracing::{error, info, instrument};

pub struct NewsPipeline<S, T> {
    search: S,
    thumbnails: Arc<T>,
}

impl<S, T> NewsPipeline<S, T>
where
    S: NewsSearch,
    T: ThumbnailFetcher + 'static,
{
    pub fn new(search: S, thumbnails: T) -> Self {
        Self {
            search,
            thumbnails: Arc::new(thumbnails),
        }
    }

    /// Search for `query` and attach a thumbnail to every result.
    ///
    /// # Returns
    ///
    /// - `Ok(SearchOutcome::NoQuery)` when `query` is absent or blank; nothing is fetched.
    /// - `Ok(SearchOutcome::Found { .. })` with one entry per search result, in
    ///   search order, even if every thumbnail came back empty.
    ///
    /// # Errors
    ///
    /// Search failures are returned unchanged, and no thumbnail is fetched.
    #[instrument(level = "info", skip(self))]
    pub async fn search_with_thumbnails(
        &self,
        query: Option<&str>,
    ) -> Result<SearchOutcome, SearchError> {
        let Some(query) = SearchQuery::parse(query) else {
            info!("No query given");
            return Ok(SearchOutcome::NoQuery);
        };

        let raw = self.search.search(&query).await?;
        let articles = self.enrich(raw).await;

        Ok(SearchOutcome::Found { query, articles })
    }

    /// Fetch thumbnails for `articles` concurrently and merge them back in order.
    pub async fn enrich(&self, articles: Vec<RawArticle>) -> Vec<EnrichedArticle> {
        let t0 = Instant::now();

        // the publisher's own page, not the aggregator copy in `link`
        let tasks: Vec<JoinHandle<Option<String>>> = articles
            .iter()
            .map(|article| {
                let fetcher = Arc::clone(&self.thumbnails);
                let target = article.originallink.clone();
                tokio::spawn(async move { fetcher.fetch_thumbnail(Some(&target)).await })
            })
            .collect();

        let settled = join_all(tasks).await;

        let enriched: Vec<EnrichedArticle> = articles
            .into_iter()
            .zip(settled)
            .enumerate()
            .map(|(index, (article, outcome))| {
                let thumbnail = outcome.unwrap_or_else(|e| {
                    error!(index, url = %article.originallink, error = %e, "Thumbnail task did not complete");
                    None
                });
                EnrichedArticle::new(article, thumbnail)
            })
            .collect();

        info!(
            total = enriched.len(),
            with_thumbnail = enriched.iter().filter(|a| a.thumbnail.is_some()).count(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Thumbnail enrichment complete"
        );
        enriched
    }
}
