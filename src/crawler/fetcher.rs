//! HTTP fetcher implementation
//!
//! This module is the boundary between the crawl engine and the network:
//! - The `Fetcher` trait the workers call
//! - `HttpFetcher`, the reqwest implementation used by the CLI
//! - Error classification into `FetchError` values
//!
//! Failures are returned, never raised; the retry policy decides what they
//! mean.

use crate::config::Config;
use crate::crawler::parser::extract_links;
use async_trait::async_trait;
use reqwest::{Client, Proxy, StatusCode};
use std::collections::HashSet;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Result of a completed HTTP exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    /// HTTP status code
    pub status: u16,

    /// Absolute outbound links; empty unless the page is a 200 HTML page
    pub links: HashSet<Url>,
}

impl FetchResponse {
    /// Only 200 counts as success; every other status is a failure candidate
    pub fn is_success(&self) -> bool {
        self.status == StatusCode::OK.as_u16()
    }
}

/// Transport-level failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Connection failed for {url}: {message}")]
    Connect { url: String, message: String },

    #[error("Request failed for {url}: {message}")]
    Request { url: String, message: String },

    #[error("Failed to read body of {url}: {message}")]
    Body { url: String, message: String },
}

/// Capability consumed by the crawl workers
///
/// Implementations perform one GET and report the status and, for
/// successful HTML pages, the absolute links found in the body.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &Url, timeout: Duration) -> Result<FetchResponse, FetchError>;
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `user_agent` - Value of the User-Agent header
/// * `proxy` - Optional proxy URL applied to all requests
/// * `accept_invalid_certs` - Skip TLS certificate verification
///
/// # Example
///
/// ```no_run
/// use broken_links::crawler::build_http_client;
///
/// let client = build_http_client("broken-links/0.1.0", None, false).unwrap();
/// ```
pub fn build_http_client(
    user_agent: &str,
    proxy: Option<&str>,
    accept_invalid_certs: bool,
) -> Result<Client, reqwest::Error> {
    let mut builder = Client::builder()
        .user_agent(user_agent)
        .connect_timeout(Duration::from_secs(10))
        .danger_accept_invalid_certs(accept_invalid_certs)
        .gzip(true)
        .brotli(true);

    if let Some(proxy) = proxy {
        builder = builder.proxy(Proxy::all(proxy)?);
    }

    builder.build()
}

/// reqwest + scraper implementation of [`Fetcher`]
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Wraps an existing client
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds the client described by a configuration file
    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        let client = build_http_client(
            &config.user_agent.header_value(),
            config.crawler.proxy.as_deref(),
            config.crawler.accept_invalid_certs,
        )?;
        Ok(Self::new(client))
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    /// Fetches a URL and extracts its links
    ///
    /// # Request Flow
    ///
    /// 1. GET with the per-request timeout (redirects are followed)
    /// 2. Non-200 → status only
    /// 3. 200 with a non-HTML Content-Type → status only
    /// 4. 200 HTML → read body, extract links relative to the final URL
    ///
    /// # Error Classification
    ///
    /// | Condition | Result |
    /// |-----------|--------|
    /// | Timeout | `FetchError::Timeout` |
    /// | Connection refused / DNS / TLS | `FetchError::Connect` |
    /// | Other send failure (redirect loop, ...) | `FetchError::Request` |
    /// | Body read failure | `FetchError::Body` |
    async fn fetch(&self, url: &Url, timeout: Duration) -> Result<FetchResponse, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| classify_error(url, &e))?;

        let status = response.status();
        if status != StatusCode::OK {
            // Drained so the connection goes back to the pool; the status is
            // the answer either way.
            if let Err(e) = response.bytes().await {
                tracing::trace!("Discarding unread body of {}: {}", url, e);
            }
            return Ok(FetchResponse {
                status: status.as_u16(),
                links: HashSet::new(),
            });
        }

        let final_url = response.url().clone();
        let is_html = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map_or(true, |content_type| content_type.contains("html"));

        if !is_html {
            return Ok(FetchResponse {
                status: status.as_u16(),
                links: HashSet::new(),
            });
        }

        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout {
                    url: url.to_string(),
                }
            } else {
                FetchError::Body {
                    url: url.to_string(),
                    message: e.to_string(),
                }
            }
        })?;

        Ok(FetchResponse {
            status: status.as_u16(),
            links: extract_links(&body, &final_url),
        })
    }
}

/// Maps a reqwest send error onto the fetch error taxonomy
fn classify_error(url: &Url, e: &reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else if e.is_connect() {
        FetchError::Connect {
            url: url.to_string(),
            message: e.to_string(),
        }
    } else {
        FetchError::Request {
            url: url.to_string(),
            message: e.to_string(),
        }
    }
}
