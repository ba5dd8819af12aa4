//! Storage module for persisting crawl data
//!
//! This module handles all database operations for the crawler, including:
//! - SQLite database initialization and schema management
//! - Artist, coverage count and coverage record persistence
//! - Transactional per-artist reconciliation
//! - Run tracking and the unfamiliar coverage kinds seen by each run

mod reconcile;
mod schema;
mod sqlite;
mod traits;

pub use reconcile::{reconcile, ReconcileOutcome};
pub use sqlite::SqliteStorage;
pub use traits::{Storage, StorageError, StorageResult};

use std::collections::BTreeMap;

/// Counters recorded when a run finishes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunTotals {
    pub index_pages: u64,
    pub artists_discovered: u64,
    pub artists_reconciled: u64,
    pub artists_failed: u64,
    pub coverage_records: u64,
    pub pagination_cycles: u64,
    /// Coverage items skipped on otherwise stored artist pages
    pub extraction_warnings: u64,
    /// Failed artists keyed by error kind
    pub failures: BTreeMap<String, u64>,
}

/// Represents a crawl run
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub id: i64,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub config_hash: String,
    pub status: RunStatus,
    pub totals: RunTotals,
}

/// Status of a crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    Completed,
    Interrupted,
    Failed,
}

impl RunStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Interrupted => "interrupted",
            Self::Failed => "failed",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "interrupted" => Some(Self::Interrupted),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.to_db_string())
    }
}
