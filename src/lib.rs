//! Coverage Crawler: artist index walker and coverage extractor
//!
//! This crate walks a site's alphabetical artist index, visits every artist
//! detail page, extracts the editorial coverage listed there and reconciles it
//! into a SQLite store so that repeated crawls never duplicate or orphan rows.

pub mod config;
pub mod coverage;
pub mod crawler;
pub mod output;
pub mod page;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for crawl operations
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] crawler::FetchError),

    #[error("Unexpected page format at {url}: {message}")]
    PageFormat { url: String, message: String },

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    #[error("Worker task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl CrawlError {
    /// Short, stable label used as the `kind` field in log events
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Config(_) => "config",
            Self::Fetch(_) => "fetch",
            Self::PageFormat { .. } => "page_format",
            Self::Storage(_) => "store",
            Self::Output(_) => "output",
            Self::Client(_) => "client",
            Self::Join(_) => "join",
        }
    }

    /// Returns true if the error only affects the item being processed
    pub fn is_per_item(&self) -> bool {
        matches!(
            self,
            Self::Fetch(_) | Self::PageFormat { .. } | Self::Storage(_) | Self::Output(_)
        )
    }

    pub(crate) fn page_format(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::PageFormat {
            url: url.into(),
            message: message.into(),
        }
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid selector in config: {0}")]
    InvalidSelector(String),
}

/// Result type alias for crawl operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use coverage::{Artist, CoverageKind, CoverageRecord, UnfamiliarKinds};
pub use crawler::{run_crawl, Fetcher, IndexCrawler};
pub use storage::{reconcile, SqliteStorage, Storage};
