//! Statistics generation from the coverage database
//!
//! This module provides functionality for extracting and displaying
//! crawl statistics from the storage layer.

use crate::storage::{RunRecord, Storage, StorageResult};
use std::collections::BTreeMap;

/// Database-wide statistics
#[derive(Debug, Clone)]
pub struct CrawlStatistics {
    /// Artists stored
    pub total_artists: u64,

    /// Artists stored without a display name
    pub unnamed_artists: u64,

    /// Coverage records stored
    pub total_coverage: u64,

    /// Coverage records by kind
    pub coverage_by_kind: BTreeMap<String, u64>,

    /// Most recent run, if any
    pub latest_run: Option<RunRecord>,
}

/// Loads statistics from storage
///
/// # Arguments
///
/// * `storage` - The storage backend to query
///
/// # Returns
///
/// * `Ok(CrawlStatistics)` - Successfully loaded statistics
/// * `Err(StorageError)` - Failed to query statistics
pub fn load_statistics(storage: &dyn Storage) -> StorageResult<CrawlStatistics> {
    Ok(CrawlStatistics {
        total_artists: storage.count_artists()?,
        unnamed_artists: storage.count_unnamed_artists()?,
        total_coverage: storage.count_coverage()?,
        coverage_by_kind: storage.count_coverage_by_kind()?,
        latest_run: storage.get_latest_run()?,
    })
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Coverage Statistics ===\n");

    println!("Overview:");
    println!("  Artists stored: {}", stats.total_artists);
    println!("  Artists without a name: {}", stats.unnamed_artists);
    println!("  Coverage records: {}", stats.total_coverage);
    println!();

    if !stats.coverage_by_kind.is_empty() {
        println!("Coverage by Kind:");
        // Sort kinds by count (descending)
        let mut kind_counts: Vec<_> = stats.coverage_by_kind.iter().collect();
        kind_counts.sort_by(|a, b| b.1.cmp(a.1));

        for (kind, count) in kind_counts {
            let percentage = if stats.total_coverage > 0 {
                (*count as f64 / stats.total_coverage as f64) * 100.0
            } else {
                0.0
            };
            println!("  {}: {} ({:.1}%)", kind, count, percentage);
        }
        println!();
    }

    match &stats.latest_run {
        Some(run) => {
            println!("Latest Run:");
            println!("  ID: {}", run.id);
            println!("  Status: {}", run.status);
            println!("  Started: {}", run.started_at);
            if let Some(finished) = &run.finished_at {
                println!("  Finished: {}", finished);
            }
            println!(
                "  Artists: {} reconciled, {} failed of {} discovered",
                run.totals.artists_reconciled,
                run.totals.artists_failed,
                run.totals.artists_discovered
            );
            if run.totals.extraction_warnings > 0 {
                println!("  Skipped coverage items: {}", run.totals.extraction_warnings);
            }
        }
        None => println!("No runs recorded yet."),
    }
}
