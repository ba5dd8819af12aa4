//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::coverage::{Artist, CoverageRecord};
use crate::storage::{RunRecord, RunStatus, RunTotals};
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for storage backend implementations
///
/// This trait defines all database operations needed by the crawler. Writes
/// for one artist are grouped with `begin`/`commit`/`rollback`; see
/// [`reconcile`](crate::storage::reconcile).
pub trait Storage {
    // ===== Transactions =====

    fn begin(&mut self) -> StorageResult<()>;

    fn commit(&mut self) -> StorageResult<()>;

    fn rollback(&mut self) -> StorageResult<()>;

    // ===== Artists =====

    /// Inserts the artist or updates the existing row with the same id
    ///
    /// A missing name never clears a previously stored one.
    fn upsert_artist(&mut self, artist: &Artist) -> StorageResult<()>;

    /// Replaces all coverage counts of an artist
    fn replace_coverage_counts(
        &mut self,
        artist_id: i64,
        counts: &BTreeMap<String, u32>,
    ) -> StorageResult<()>;

    /// Gets an artist with its coverage counts
    fn get_artist(&self, artist_id: i64) -> StorageResult<Option<Artist>>;

    // ===== Coverage =====

    /// Deletes all coverage records of an artist, returning how many were removed
    fn delete_coverage(&mut self, artist_id: i64) -> StorageResult<usize>;

    /// Inserts one coverage record for an artist
    fn insert_coverage(&mut self, artist_id: i64, record: &CoverageRecord) -> StorageResult<i64>;

    /// Gets all coverage records of an artist in insertion order
    fn get_coverage(&self, artist_id: i64) -> StorageResult<Vec<CoverageRecord>>;

    // ===== Run Management =====

    /// Creates a new crawl run
    ///
    /// # Arguments
    ///
    /// * `config_hash` - Hash of the configuration file
    ///
    /// # Returns
    ///
    /// The ID of the newly created run
    fn create_run(&mut self, config_hash: &str) -> StorageResult<i64>;

    /// Gets a run by ID
    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord>;

    /// Gets the most recent run
    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>>;

    /// Records the final status and counters of a run
    fn finish_run(&mut self, run_id: i64, status: RunStatus, totals: &RunTotals)
        -> StorageResult<()>;

    /// Stores the unfamiliar coverage kinds a run encountered
    fn record_unfamiliar(
        &mut self,
        run_id: i64,
        kinds: &BTreeMap<String, Vec<String>>,
    ) -> StorageResult<()>;

    /// Gets the unfamiliar coverage kinds of a run
    fn get_unfamiliar(&self, run_id: i64) -> StorageResult<BTreeMap<String, Vec<String>>>;

    // ===== Statistics =====

    fn count_artists(&self) -> StorageResult<u64>;

    fn count_unnamed_artists(&self) -> StorageResult<u64>;

    fn count_coverage(&self) -> StorageResult<u64>;

    /// Coverage records grouped by kind
    fn count_coverage_by_kind(&self) -> StorageResult<BTreeMap<String, u64>>;
}
