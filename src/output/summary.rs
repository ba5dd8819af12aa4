//! Run summary types and output errors

use crate::storage::{RunRecord, RunStatus, StorageError};
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write output: {0}")]
    Write(String),

    #[error("Failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Everything reported about one finished (or interrupted) run
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub run: RunRecord,

    /// Coverage labels without an extractor -> artist pages they were seen on
    pub unfamiliar: BTreeMap<String, Vec<String>>,
}

impl RunSummary {
    pub fn status(&self) -> RunStatus {
        self.run.status
    }

    /// Seconds between start and finish, when both timestamps parse
    pub fn duration_seconds(&self) -> Option<u64> {
        let started = self
            .run
            .started_at
            .parse::<chrono::DateTime<chrono::Utc>>()
            .ok()?;
        let finished = self
            .run
            .finished_at
            .as_deref()?
            .parse::<chrono::DateTime<chrono::Utc>>()
            .ok()?;
        Some((finished - started).num_seconds().max(0) as u64)
    }

    /// Percentage of discovered artists that were reconciled
    pub fn success_rate(&self) -> f64 {
        let totals = &self.run.totals;
        if totals.artists_discovered == 0 {
            return 0.0;
        }
        (totals.artists_reconciled as f64 / totals.artists_discovered as f64) * 100.0
    }
}
