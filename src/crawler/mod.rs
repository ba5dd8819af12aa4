//! Crawler module for index traversal and crawl orchestration
//!
//! This module contains the core crawling logic, including:
//! - The [`Fetcher`] seam and its HTTP implementation with retry logic
//! - Index chain traversal with pagination and cycle detection
//! - Overall crawl coordination with a bounded worker pool

mod coordinator;
mod fetcher;
mod index;
#[cfg(test)]
pub(crate) mod testing;

pub use coordinator::{run_crawl, Coordinator};
pub use fetcher::{build_http_client, FetchError, Fetcher, HttpFetcher, RawPage};
pub use index::{IndexCrawlReport, IndexCrawler};
