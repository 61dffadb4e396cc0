//! HTTP fetcher implementation
//!
//! This module handles page retrieval for the crawler, including:
//! - The `Fetcher` trait the crawler is generic over
//! - Building HTTP clients with proper user agent strings
//! - Classifying failures so the crawler can log and skip them

use crate::config::{CrawlerConfig, UserAgentConfig};
use reqwest::header::CONTENT_TYPE;
use reqwest::{redirect::Policy, Client};
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Why a page could not be retrieved
///
/// These never abort a crawl; the page is logged and skipped.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("HTTP status {0}")]
    Status(u16),

    #[error("Request timed out")]
    Timeout,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Expected HTML, got {0}")]
    ContentMismatch(String),
}

/// Source of page content for the crawler
///
/// Implementations must be shareable across the fetch tasks of one round.
pub trait Fetcher: Send + Sync + 'static {
    /// Fetches the final HTML body of `url`
    fn fetch(&self, url: &Url) -> impl Future<Output = Result<String, FetchError>> + Send;
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `user_agent` - The user agent configuration
/// * `timeout_secs` - Whole-request timeout in seconds
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(
    user_agent: &UserAgentConfig,
    timeout_secs: u64,
) -> Result<Client, reqwest::Error> {
    let timeout = Duration::from_secs(timeout_secs);

    Client::builder()
        .user_agent(user_agent.header_value())
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Default fetcher backed by `reqwest`
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(
        user_agent: &UserAgentConfig,
        crawler: &CrawlerConfig,
    ) -> Result<Self, reqwest::Error> {
        let client = build_http_client(user_agent, crawler.request_timeout_secs)?;
        Ok(Self { client })
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &Url) -> impl Future<Output = Result<String, FetchError>> + Send {
        let request = self.client.get(url.clone());

        async move {
            let response = request.send().await.map_err(classify_error)?;

            let status = response.status();
            if !status.is_success() {
                return Err(FetchError::Status(status.as_u16()));
            }

            // A missing Content-Type is given the benefit of the doubt
            if let Some(content_type) = response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
            {
                if !is_html(content_type) {
                    return Err(FetchError::ContentMismatch(content_type.to_string()));
                }
            }

            response.text().await.map_err(classify_error)
        }
    }
}

fn is_html(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();
    mime == "text/html" || mime == "application/xhtml+xml"
}

fn classify_error(error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout
    } else if let Some(status) = error.status() {
        FetchError::Status(status.as_u16())
    } else {
        FetchError::Network(error.to_string())
    }
}
