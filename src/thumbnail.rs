//! Thumbnail discovery for news articles.
//!
//! Given the publisher's URL for an article, this module downloads the page
//! and picks a representative image:
//!
//! 1. the page's Open Graph image (`<meta property="og:image">`), which is the
//!    author's own choice of preview image;
//! 2. otherwise the first image inside a known article-body container, with
//!    containers tried in the fixed order of [`BODY_CONTAINERS`];
//! 3. otherwise nothing.
//!
//! Fetching never fails outward. Timeouts, HTTP errors, DNS failures and
//! undecodable bodies are logged and collapse to `None`, so one broken
//! publisher page cannot affect a search response.

use crate::utils::{is_http_url, truncate_for_log};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use reqwest::Client;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue, USER_AGENT};
use scraper::{Html, Selector};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, instrument, warn};
use url::Url;

const BROWSER_ACCEPT: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8";
const BROWSER_ACCEPT_LANGUAGE: &str = "ko-KR,ko;q=0.9,en-US;q=0.8,en;q=0.7";
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/108.0.0.0 Safari/537.36";

/// Article-body containers searched for a fallback image, most specific first.
pub const BODY_CONTAINERS: [&str; 5] = [
    "#articleBodyContents",
    ".article_body",
    "#article_body",
    "#newsct_article",
    "article",
];

static OG_IMAGE: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"meta[property="og:image"]"#).expect("og:image selector is valid")
});

static BODY_IMAGES: Lazy<Vec<Selector>> = Lazy::new(|| {
    BODY_CONTAINERS
        .iter()
        .map(|container| {
            Selector::parse(&format!("{container} img[src]")).expect("body selector is valid")
        })
        .collect()
});

/// Anything that can resolve a thumbnail for an article URL.
///
/// Implementations must never fail: every problem is reported as `None`.
#[async_trait]
pub trait ThumbnailFetcher: Send + Sync {
    async fn fetch_thumbnail(&self, url: Option<&str>) -> Option<String>;
}

// Internal only; callers see `None`.
#[derive(Debug, Error)]
enum Unavailable {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("unexpected status {0}")]
    Status(reqwest::StatusCode),
}

/// Fetches publisher pages over HTTP with browser-like headers and a bounded timeout.
///
/// Cloning is cheap and clones share one connection pool.
#[derive(Debug, Clone)]
pub struct HttpThumbnailFetcher {
    client: Client,
}

impl HttpThumbnailFetcher {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(BROWSER_ACCEPT));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(BROWSER_ACCEPT_LANGUAGE));
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }

    async fn try_fetch(&self, url: &str) -> Result<Option<String>, Unavailable> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Unavailable::Status(status));
        }
        // redirects may have moved us; relative image paths resolve against the final page
        let page_url = response.url().clone();
        let body = response.text().await?;
        Ok(extract_thumbnail(&body).map(|src| resolve_image_url(&page_url, &src)))
    }
}

#[async_trait]
impl ThumbnailFetcher for HttpThumbnailFetcher {
    #[instrument(level = "debug", skip(self))]
    async fn fetch_thumbnail(&self, url: Option<&str>) -> Option<String> {
        let url = url.map(str::trim).filter(|u| is_http_url(u))?;

        let t0 = Instant::now();
        match self.try_fetch(url).await {
            Ok(Some(image)) => {
                debug!(%url, %image, elapsed_ms = t0.elapsed().as_millis() as u64, "Resolved thumbnail");
                Some(image)
            }
            Ok(None) => {
                debug!(%url, "Page has no usable image");
                None
            }
            Err(e) => {
                warn!(
                    url = %truncate_for_log(url, 200),
                    elapsed_ms = t0.elapsed().as_millis() as u64,
                    error = %e,
                    "Thumbnail fetch failed"
                );
                None
            }
        }
    }
}

/// Pick a thumbnail from an HTML document.
///
/// Within a body container the first `img` carrying a non-blank `src` wins;
/// images without one are skipped rather than ending the search.
///
/// Returns the raw attribute value; see [`resolve_image_url`] for making it absolute.
pub fn extract_thumbnail(html: &str) -> Option<String> {
    let document = Html::parse_document(html);

    let og_image = document
        .select(&OG_IMAGE)
        .filter_map(|meta| meta.value().attr("content"))
        .map(str::trim)
        .find(|content| !content.is_empty());
    if let Some(content) = og_image {
        return Some(content.to_string());
    }

    BODY_IMAGES.iter().find_map(|selector| {
        document
            .select(selector)
            .filter_map(|img| img.value().attr("src"))
            .map(str::trim)
            .find(|src| !src.is_empty())
            .map(str::to_string)
    })
}

/// Resolve `src` against the page it came from. Absolute URLs pass through unchanged.
pub fn resolve_image_url(page_url: &Url, src: &str) -> String {
    if is_http_url(src) {
        return src.to_string();
    }
    page_url
        .join(src)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| src.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support;
    use axum::{Router, http::StatusCode, response::Html as HtmlBody, routing::get};

    const OG_AND_BODY: &str = r#"<html><head>
        <meta property="og:title" content="Election night">
        <meta property="og:image" content="https://img.example/a.jpg">
        </head><body><article><img src="https://img.example/body.jpg"></article></body></html>"#;

    const BODY_ONLY: &str = r#"<html><head><title>t</title></head><body>
        <div id="newsct_article"><p>Lead</p><img src="https://img.example/b.jpg"></div>
        </body></html>"#;

    const NEITHER: &str = r#"<html><head><title>t</title></head><body>
        <img src="https://img.example/sidebar-ad.jpg"><p>No article container here.</p>
        </body></html>"#;

    #[test]
    fn test_og_image_takes_priority() {
        assert_eq!(
            extract_thumbnail(OG_AND_BODY).as_deref(),
            Some("https://img.example/a.jpg")
        );
    }

    #[test]
    fn test_body_image_fallback() {
        assert_eq!(
            extract_thumbnail(BODY_ONLY).as_deref(),
            Some("https://img.example/b.jpg")
        );
    }

    #[test]
    fn test_no_image() {
        assert_eq!(extract_thumbnail(NEITHER), None);
    }

    #[test]
    fn test_blank_og_image_is_ignored() {
        let html = r#"<html><head><meta property="og:image" content="  "></head>
            <body><div class="article_body"><img src="/img/c.jpg"></div></body></html>"#;
        assert_eq!(extract_thumbnail(html).as_deref(), Some("/img/c.jpg"));
    }

    #[test]
    fn test_container_preference_order() {
        // `article` appears first in the document but `#article_body` is preferred
        let html = r#"<html><body>
            <article><img src="https://img.example/generic.jpg"></article>
            <div id="article_body"><img src="https://img.example/specific.jpg"></div>
            </body></html>"#;
        assert_eq!(
            extract_thumbnail(html).as_deref(),
            Some("https://img.example/specific.jpg")
        );
    }

    #[test]
    fn test_img_without_src_is_skipped() {
        let html = r#"<html><body><div id="articleBodyContents">
            <img data-src="lazy.jpg"><img src="https://img.example/real.jpg">
            </div></body></html>"#;
        assert_eq!(
            extract_thumbnail(html).as_deref(),
            Some("https://img.example/real.jpg")
        );

        let blank_first = r#"<html><body><article>
            <img src=" "><img src="https://img.example/second.jpg">
            </article></body></html>"#;
        assert_eq!(
            extract_thumbnail(blank_first).as_deref(),
            Some("https://img.example/second.jpg")
        );
    }

    #[test]
    fn test_malformed_html_does_not_panic() {
        assert_eq!(extract_thumbnail("<html><<meta property=og:image <body"), None);
        assert_eq!(extract_thumbnail(""), None);
    }

    #[test]
    fn test_resolve_image_url() {
        let page = Url::parse("https://news.example.co.kr/politics/article/1").unwrap();
        assert_eq!(
            resolve_image_url(&page, "https://img.example/a.jpg"),
            "https://img.example/a.jpg"
        );
        assert_eq!(
            resolve_image_url(&page, "/images/a.jpg"),
            "https://news.example.co.kr/images/a.jpg"
        );
        assert_eq!(
            resolve_image_url(&page, "//cdn.example.com/a.jpg"),
            "https://cdn.example.com/a.jpg"
        );
        assert_eq!(
            resolve_image_url(&page, "thumb.jpg"),
            "https://news.example.co.kr/politics/article/thumb.jpg"
        );
    }

    fn pages() -> Router {
        Router::new()
            .route("/og", get(|| async { HtmlBody(OG_AND_BODY) }))
            .route("/body", get(|| async { HtmlBody(BODY_ONLY) }))
            .route("/neither", get(|| async { HtmlBody(NEITHER) }))
            .route(
                "/relative",
                get(|| async {
                    HtmlBody(r#"<html><body><article><img src="/img/r.jpg"></article></body></html>"#)
                }),
            )
            .route(
                "/forbidden",
                get(|| async { (StatusCode::FORBIDDEN, HtmlBody(OG_AND_BODY)) }),
            )
            .route(
                "/slow",
                get(|| async {
                    tokio::time::sleep(Duration::from_millis(500)).await;
                    HtmlBody(OG_AND_BODY)
                }),
            )
            .route(
                "/headers",
                get(|headers: axum::http::HeaderMap| async move {
                    let ua = headers
                        .get(USER_AGENT)
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or_default()
                        .to_string();
                    let has_lang = headers.contains_key(ACCEPT_LANGUAGE);
                    let has_accept = headers.contains_key(ACCEPT);
                    if ua.starts_with("Mozilla/5.0") && has_lang && has_accept {
                        HtmlBody(OG_AND_BODY)
                    } else {
                        HtmlBody(NEITHER)
                    }
                }),
            )
    }

    fn fetcher(timeout_ms: u64) -> HttpThumbnailFetcher {
        HttpThumbnailFetcher::new(Duration::from_millis(timeout_ms)).unwrap()
    }

    #[tokio::test]
    async fn test_invalid_input_makes_no_request() {
        let server = test_support::start(pages()).await;
        let fetcher = fetcher(3000);

        assert_eq!(fetcher.fetch_thumbnail(None).await, None);
        assert_eq!(fetcher.fetch_thumbnail(Some("")).await, None);
        assert_eq!(fetcher.fetch_thumbnail(Some("not-a-url")).await, None);
        assert_eq!(fetcher.fetch_thumbnail(Some("ftp://example.com/a")).await, None);
        assert_eq!(server.hits(), 0);
    }

    #[tokio::test]
    async fn test_fetch_prefers_og_image() {
        let server = test_support::start(pages()).await;
        let thumb = fetcher(3000).fetch_thumbnail(Some(&server.url("/og"))).await;
        assert_eq!(thumb.as_deref(), Some("https://img.example/a.jpg"));
        assert_eq!(server.hits(), 1);
    }

    #[tokio::test]
    async fn test_fetch_body_fallback_and_none() {
        let server = test_support::start(pages()).await;
        let fetcher = fetcher(3000);

        let body = fetcher.fetch_thumbnail(Some(&server.url("/body"))).await;
        assert_eq!(body.as_deref(), Some("https://img.example/b.jpg"));

        let neither = fetcher.fetch_thumbnail(Some(&server.url("/neither"))).await;
        assert_eq!(neither, None);
    }

    #[tokio::test]
    async fn test_fetch_resolves_relative_src() {
        let server = test_support::start(pages()).await;
        let thumb = fetcher(3000).fetch_thumbnail(Some(&server.url("/relative"))).await;
        assert_eq!(thumb, Some(server.url("/img/r.jpg")));
    }

    #[tokio::test]
    async fn test_non_success_status_is_none() {
        let server = test_support::start(pages()).await;
        let thumb = fetcher(3000).fetch_thumbnail(Some(&server.url("/forbidden"))).await;
        assert_eq!(thumb, None);
        assert_eq!(server.hits(), 1);
    }

    #[tokio::test]
    async fn test_timeout_is_none() {
        let server = test_support::start(pages()).await;
        let t0 = Instant::now();
        let thumb = fetcher(50).fetch_thumbnail(Some(&server.url("/slow"))).await;
        assert_eq!(thumb, None);
        assert!(t0.elapsed() < Duration::from_millis(450));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_none() {
        // port 9 (discard) on localhost is closed in test environments
        let thumb = fetcher(500).fetch_thumbnail(Some("http://127.0.0.1:9/article")).await;
        assert_eq!(thumb, None);
    }

    #[tokio::test]
    async fn test_browser_headers_are_sent() {
        let server = test_support::start(pages()).await;
        let thumb = fetcher(3000).fetch_thumbnail(Some(&server.url("/headers"))).await;
        assert_eq!(thumb.as_deref(), Some("https://img.example/a.jpg"));
    }
}
