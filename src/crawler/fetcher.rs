//! HTTP fetcher implementation
//!
//! This module defines the [`Fetcher`] seam the crawl pipeline talks to and
//! its reqwest-backed implementation, which owns:
//! - Building the HTTP client with a proper user agent string
//! - Retry logic for transient failures
//! - Error classification

use crate::config::{CrawlerConfig, UserAgentConfig};
use async_trait::async_trait;
use reqwest::{redirect::Policy, Client};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// A fetched document, not yet parsed
#[derive(Debug, Clone)]
pub struct RawPage {
    /// Final URL after redirects; relative links resolve against it
    pub url: Url,

    /// Page body content
    pub body: String,
}

/// Errors a fetch can end with
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("HTTP {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Network error for {url}: {message}")]
    Network { url: String, message: String },

    #[error("Could not read body of {url}: {message}")]
    Parse { url: String, message: String },
}

impl FetchError {
    /// Returns true if repeating the request may succeed
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout { .. } => true,
            Self::HttpStatus { status, .. } => *status >= 500,
            Self::Network { .. } | Self::Parse { .. } => false,
        }
    }
}

/// Source of documents for the crawl pipeline
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<RawPage, FetchError>;
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use coverage_crawler::config::{CrawlerConfig, UserAgentConfig};
/// use coverage_crawler::crawler::build_http_client;
///
/// let user_agent = UserAgentConfig {
///     crawler_name: "CoverageCrawler".to_string(),
///     crawler_version: "1.0".to_string(),
///     contact_url: "https://example.com/about".to_string(),
///     contact_email: "admin@example.com".to_string(),
/// };
///
/// let client = build_http_client(&CrawlerConfig::default(), &user_agent).unwrap();
/// ```
pub fn build_http_client(
    crawler: &CrawlerConfig,
    user_agent: &UserAgentConfig,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent.header_value())
        .timeout(Duration::from_secs(crawler.request_timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// [`Fetcher`] backed by reqwest
///
/// # Retry Logic
///
/// | Condition | Action |
/// |-----------|--------|
/// | HTTP 5xx | Retry up to `max-retries` times |
/// | Timeout | Retry up to `max-retries` times |
/// | Other HTTP error | Immediate failure |
/// | Connection / TLS error | Immediate failure |
pub struct HttpFetcher {
    client: Client,
    max_retries: u32,
    retry_delay: Duration,
}

impl HttpFetcher {
    pub fn new(crawler: &CrawlerConfig, user_agent: &UserAgentConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(crawler, user_agent)?,
            max_retries: crawler.max_retries,
            retry_delay: Duration::from_millis(crawler.retry_delay_ms),
        })
    }

    async fn fetch_once(&self, url: &Url) -> Result<RawPage, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| classify_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let final_url = response.url().clone();
        let body = response.text().await.map_err(|e| FetchError::Parse {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        Ok(RawPage {
            url: final_url,
            body,
        })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<RawPage, FetchError> {
        let mut attempt = 0;
        loop {
            match self.fetch_once(url).await {
                Ok(page) => return Ok(page),
                Err(e) if e.is_transient() && attempt < self.max_retries => {
                    attempt += 1;
                    tracing::debug!(
                        url = %url,
                        "Transient failure ({}), retry {}/{}",
                        e,
                        attempt,
                        self.max_retries
                    );
                    tokio::time::sleep(self.retry_delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

fn classify_error(url: &Url, e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else if e.is_connect() {
        FetchError::Network {
            url: url.to_string(),
            message: "Connection refused".to_string(),
        }
    } else {
        FetchError::Network {
            url: url.to_string(),
            message: e.to_string(),
        }
    }
}
