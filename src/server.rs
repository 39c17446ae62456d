//! HTTP surface: news routes, chat socket, and error mapping.
//!
//! | Route | Behavior |
//! |-------|----------|
//! | `GET /news` | Empty results view `{"articles": [], "query": ""}` |
//! | `GET /news/search?query=…` | Enriched results, or `303` to `/news` without a query |
//! | `GET /chat` | Websocket upgrade into the chat room |
//! | `GET /health` | Liveness probe |

use crate::chat::{ChatRoom, chat_socket};
use crate::error::SearchError;
use crate::models::{NewsPage, SearchOutcome};
use crate::pipeline::NewsPipeline;
use crate::search::NewsSearch;
use crate::thumbnail::ThumbnailFetcher;
use axum::{
    Json, Router,
    extract::{FromRef, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::get,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::debug;

pub struct AppState<S, T> {
    pub pipeline: Arc<NewsPipeline<S, T>>,
    pub chat: ChatRoom,
}

impl<S, T> AppState<S, T> {
    pub fn new(pipeline: NewsPipeline<S, T>, chat: ChatRoom) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            chat,
        }
    }
}

// manual impl: cloning the state must not require S: Clone or T: Clone
impl<S, T> Clone for AppState<S, T> {
    fn clone(&self) -> Self {
        Self {
            pipeline: Arc::clone(&self.pipeline),
            chat: self.chat.clone(),
        }
    }
}

impl<S, T> FromRef<AppState<S, T>> for ChatRoom {
    fn from_ref(state: &AppState<S, T>) -> Self {
        state.chat.clone()
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub query: Option<String>,
}

pub fn router<S, T>(state: AppState<S, T>) -> Router
where
    S: NewsSearch + 'static,
    T: ThumbnailFetcher + 'static,
{
    Router::new()
        .route("/news", get(news_home))
        .route("/news/search", get(search_news::<S, T>))
        .route("/chat", get(chat_socket))
        .route("/health", get(|| async { "ok" }))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn news_home() -> Json<NewsPage> {
    Json(NewsPage::empty())
}

async fn search_news<S, T>(
    State(state): State<AppState<S, T>>,
    Query(params): Query<SearchParams>,
) -> Response
where
    S: NewsSearch + 'static,
    T: ThumbnailFetcher + 'static,
{
    match state
        .pipeline
        .search_with_thumbnails(params.query.as_deref())
        .await
    {
        Ok(SearchOutcome::NoQuery) => Redirect::to("/news").into_response(),
        Ok(SearchOutcome::Found { query, articles }) => Json(NewsPage {
            articles,
            query: query.to_string(),
        })
        .into_response(),
        Err(e) => e.into_response(),
    }
}

impl IntoResponse for SearchError {
    fn into_response(self) -> Response {
        let status = match &self {
            SearchError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            SearchError::Upstream { .. } | SearchError::Transport(_) => StatusCode::BAD_GATEWAY,
        };
        // the search client already logged the cause
        debug!(%status, error = %self, "News search failed");
        (status, Json(json!({ "error": self.user_message() }))).into_response()
    }
}
