//! # News Thumbs
//!
//! A small web service that proxies news searches to the Naver search API and
//! decorates every result with a thumbnail scraped from the publisher's own
//! page, plus a broadcast chat room.
//!
//! ## Usage
//!
//! ```sh
//! NAVER_CLIENT_ID=... NAVER_CLIENT_SECRET=... news_thumbs --bind 127.0.0.1:8001
//! ```
//!
//! ## Architecture
//!
//! A search request flows through a short pipeline:
//! 1. **Search**: one call to the news API, results kept in API order
//! 2. **Enrichment**: one concurrent thumbnail fetch per result (3s timeout each)
//! 3. **Merge**: thumbnails zipped back by position; failed fetches become `null`
//!
//! The server keeps running without credentials; searches then answer with a
//! configuration error while the chat room stays available.

use clap::Parser;
use std::error::Error;
use tokio::net::TcpListener;
use tracing::{debug, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod chat;
mod cli;
mod config;
mod error;
mod models;
mod pipeline;
mod search;
mod server;
#[cfg(test)]
mod test_support;
mod thumbnail;
mod utils;

use chat::ChatRoom;
use cli::Cli;
use config::{FileSettings, Settings};
use pipeline::NewsPipeline;
use search::NaverSearchClient;
use server::AppState;
use thumbnail::HttpThumbnailFetcher;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    info!("news_thumbs starting up");

    let args = Cli::parse();
    debug!(?args.bind, ?args.config, "Parsed CLI arguments");

    // ---- Settings ----
    let file_settings = match args.config.as_deref() {
        Some(path) => FileSettings::load(path).await?,
        None => FileSettings::default(),
    };
    let settings = Settings::resolve(&args, file_settings)?;
    info!(
        bind = %settings.bind,
        endpoint = %settings.search_endpoint,
        thumbnail_timeout_ms = settings.thumbnail_timeout.as_millis() as u64,
        search_configured = settings.credentials.is_complete(),
        "Resolved settings"
    );

    // ---- Components ----
    let search = NaverSearchClient::new(settings.search_endpoint.clone(), settings.credentials.clone())?;
    let thumbnails = HttpThumbnailFetcher::new(settings.thumbnail_timeout)?;
    let state = AppState::new(NewsPipeline::new(search, thumbnails), ChatRoom::default());
    let app = server::router(state);

    // ---- Serve ----
    let listener = TcpListener::bind(settings.bind).await?;
    info!(addr = %listener.local_addr()?, "Listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shut down cleanly");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
