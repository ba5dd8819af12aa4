//! Output module for run summaries, reports and artist documents
//!
//! This module handles:
//! - Building run summaries from storage
//! - Generating markdown summaries of runs
//! - Writing per-artist JSON documents
//! - Printing database statistics

mod json;
mod markdown;
pub mod stats;
mod summary;

pub use json::write_artist_json;
pub use markdown::{format_markdown_summary, generate_markdown_summary};
pub use stats::{load_statistics, print_statistics, CrawlStatistics};
pub use summary::{OutputError, OutputResult, RunSummary};

use crate::storage::{Storage, StorageError};

/// Builds the summary of a stored run
///
/// # Arguments
///
/// * `storage` - The storage backend containing crawl data
/// * `run_id` - Run to summarize; the latest run when `None`
///
/// # Returns
///
/// * `Ok(RunSummary)` - Successfully generated summary
/// * `Err(OutputError)` - No such run, or the query failed
pub fn load_run_summary(storage: &dyn Storage, run_id: Option<i64>) -> OutputResult<RunSummary> {
    let run = match run_id {
        Some(id) => storage.get_run(id)?,
        None => storage
            .get_latest_run()?
            .ok_or_else(|| StorageError::Database("No crawl runs found in database".to_string()))?,
    };

    let unfamiliar = storage.get_unfamiliar(run.id)?;

    Ok(RunSummary { run, unfamiliar })
}
