//! Command-line interface definitions for the news server.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! Every option can also be provided via an environment variable, and all of
//! them may instead come from a YAML file passed with `--config`. Values given
//! on the command line or in the environment win over the file.

use clap::Parser;

/// Command-line arguments for the news server.
///
/// # Examples
///
/// ```sh
/// # Credentials from the environment
/// NAVER_CLIENT_ID=abc NAVER_CLIENT_SECRET=xyz news_thumbs
///
/// # Everything from a file, bind address overridden
/// news_thumbs --config ./news.yaml --bind 0.0.0.0:8080
/// ```
#[derive(Parser, Debug, Default)]
#[command(author, version, about)]
pub struct Cli {
    /// Address to listen on (default 127.0.0.1:8001)
    #[arg(short, long, env = "NEWS_BIND")]
    pub bind: Option<String>,

    /// Optional path to a YAML settings file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Naver search API client id
    #[arg(long, env = "NAVER_CLIENT_ID", hide_env_values = true)]
    pub naver_client_id: Option<String>,

    /// Naver search API client secret
    #[arg(long, env = "NAVER_CLIENT_SECRET", hide_env_values = true)]
    pub naver_client_secret: Option<String>,

    /// News search endpoint (override for testing or proxies)
    #[arg(long, env = "NAVER_SEARCH_ENDPOINT")]
    pub search_endpoint: Option<String>,

    /// Per-page timeout for thumbnail fetches, in milliseconds (default 3000)
    #[arg(long, env = "THUMBNAIL_TIMEOUT_MS")]
    pub thumbnail_timeout_ms: Option<u64>,
}
