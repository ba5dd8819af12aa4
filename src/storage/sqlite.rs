//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Storage trait.

use crate::coverage::{Artist, CoverageRecord};
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Storage, StorageError, StorageResult};
use crate::storage::{RunRecord, RunStatus, RunTotals};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::BTreeMap;
use std::path::Path;

const RUN_COLUMNS: &str = "id, started_at, finished_at, config_hash, status, index_pages,
     artists_discovered, artists_reconciled, artists_failed, coverage_records,
     pagination_cycles, extraction_warnings, failures";

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// Missing parent directories are created.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn new(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        // Configure SQLite for better performance
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    #[cfg(test)]
    pub(crate) fn connection(&self) -> &Connection {
        &self.conn
    }

    fn count(&self, sql: &str) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(sql, [], |row| row.get(0))?;
        Ok(count as u64)
    }
}

fn run_from_row(row: &Row<'_>) -> rusqlite::Result<RunRecord> {
    let failures: Option<String> = row.get(12)?;
    Ok(RunRecord {
        id: row.get(0)?,
        started_at: row.get(1)?,
        finished_at: row.get(2)?,
        config_hash: row.get(3)?,
        status: RunStatus::from_db_string(&row.get::<_, String>(4)?).unwrap_or(RunStatus::Failed),
        totals: RunTotals {
            index_pages: row.get::<_, i64>(5)? as u64,
            artists_discovered: row.get::<_, i64>(6)? as u64,
            artists_reconciled: row.get::<_, i64>(7)? as u64,
            artists_failed: row.get::<_, i64>(8)? as u64,
            coverage_records: row.get::<_, i64>(9)? as u64,
            pagination_cycles: row.get::<_, i64>(10)? as u64,
            extraction_warnings: row.get::<_, i64>(11)? as u64,
            failures: failures
                .and_then(|json| serde_json::from_str(&json).ok())
                .unwrap_or_default(),
        },
    })
}

impl Storage for SqliteStorage {
    // ===== Transactions =====

    fn begin(&mut self) -> StorageResult<()> {
        self.conn.execute_batch("BEGIN IMMEDIATE")?;
        Ok(())
    }

    fn commit(&mut self) -> StorageResult<()> {
        self.conn.execute_batch("COMMIT")?;
        Ok(())
    }

    fn rollback(&mut self) -> StorageResult<()> {
        self.conn.execute_batch("ROLLBACK")?;
        Ok(())
    }

    // ===== Artists =====

    fn upsert_artist(&mut self, artist: &Artist) -> StorageResult<()> {
        self.conn.execute(
            "INSERT INTO artists (id, slug, url, name) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(id) DO UPDATE SET
                slug = excluded.slug,
                url = excluded.url,
                name = COALESCE(excluded.name, artists.name)",
            params![artist.id, artist.slug, artist.url, artist.name],
        )?;
        Ok(())
    }

    fn replace_coverage_counts(
        &mut self,
        artist_id: i64,
        counts: &BTreeMap<String, u32>,
    ) -> StorageResult<()> {
        self.conn.execute(
            "DELETE FROM artist_coverage_counts WHERE artist_id = ?1",
            params![artist_id],
        )?;

        let mut stmt = self.conn.prepare(
            "INSERT INTO artist_coverage_counts (artist_id, label, count) VALUES (?1, ?2, ?3)",
        )?;
        for (label, count) in counts {
            stmt.execute(params![artist_id, label, count])?;
        }
        Ok(())
    }

    fn get_artist(&self, artist_id: i64) -> StorageResult<Option<Artist>> {
        let artist = self
            .conn
            .query_row(
                "SELECT id, slug, url, name FROM artists WHERE id = ?1",
                params![artist_id],
                |row| {
                    Ok(Artist {
                        id: row.get(0)?,
                        slug: row.get(1)?,
                        url: row.get(2)?,
                        name: row.get(3)?,
                        coverage_counts: BTreeMap::new(),
                    })
                },
            )
            .optional()?;

        let Some(mut artist) = artist else {
            return Ok(None);
        };

        let mut stmt = self
            .conn
            .prepare("SELECT label, count FROM artist_coverage_counts WHERE artist_id = ?1")?;
        let rows = stmt.query_map(params![artist_id], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, u32>(1)?))
        })?;
        for row in rows {
            let (label, count) = row?;
            artist.coverage_counts.insert(label, count);
        }

        Ok(Some(artist))
    }

    // ===== Coverage =====

    fn delete_coverage(&mut self, artist_id: i64) -> StorageResult<usize> {
        let removed = self
            .conn
            .execute("DELETE FROM coverage WHERE artist_id = ?1", params![artist_id])?;
        Ok(removed)
    }

    fn insert_coverage(&mut self, artist_id: i64, record: &CoverageRecord) -> StorageResult<i64> {
        self.conn.execute(
            "INSERT INTO coverage (artist_id, kind, label, url, title, author, image)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                artist_id,
                record.kind,
                record.label,
                record.url,
                record.title,
                record.author,
                record.image
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn get_coverage(&self, artist_id: i64) -> StorageResult<Vec<CoverageRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT kind, label, url, title, author, image FROM coverage
             WHERE artist_id = ?1 ORDER BY id",
        )?;

        let records = stmt
            .query_map(params![artist_id], |row| {
                Ok(CoverageRecord {
                    kind: row.get(0)?,
                    label: row.get(1)?,
                    url: row.get(2)?,
                    title: row.get(3)?,
                    author: row.get(4)?,
                    image: row.get(5)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(records)
    }

    // ===== Run Management =====

    fn create_run(&mut self, config_hash: &str) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO runs (started_at, config_hash, status) VALUES (?1, ?2, ?3)",
            params![now, config_hash, RunStatus::Running.to_db_string()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM runs WHERE id = ?1", RUN_COLUMNS),
                params![run_id],
                run_from_row,
            )
            .optional()?
            .ok_or(StorageError::RunNotFound(run_id))
    }

    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>> {
        let run = self
            .conn
            .query_row(
                &format!("SELECT {} FROM runs ORDER BY id DESC LIMIT 1", RUN_COLUMNS),
                [],
                run_from_row,
            )
            .optional()?;
        Ok(run)
    }

    fn finish_run(
        &mut self,
        run_id: i64,
        status: RunStatus,
        totals: &RunTotals,
    ) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let failures = serde_json::to_string(&totals.failures)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        let updated = self.conn.execute(
            "UPDATE runs SET status = ?1, finished_at = ?2, index_pages = ?3,
                artists_discovered = ?4, artists_reconciled = ?5, artists_failed = ?6,
                coverage_records = ?7, pagination_cycles = ?8, extraction_warnings = ?9,
                failures = ?10
             WHERE id = ?11",
            params![
                status.to_db_string(),
                now,
                totals.index_pages as i64,
                totals.artists_discovered as i64,
                totals.artists_reconciled as i64,
                totals.artists_failed as i64,
                totals.coverage_records as i64,
                totals.pagination_cycles as i64,
                totals.extraction_warnings as i64,
                failures,
                run_id
            ],
        )?;

        if updated == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        Ok(())
    }

    fn record_unfamiliar(
        &mut self,
        run_id: i64,
        kinds: &BTreeMap<String, Vec<String>>,
    ) -> StorageResult<()> {
        let mut stmt = self.conn.prepare(
            "INSERT INTO unfamiliar_kinds (run_id, label, url, position) VALUES (?1, ?2, ?3, ?4)",
        )?;
        for (label, urls) in kinds {
            for (position, url) in urls.iter().enumerate() {
                stmt.execute(params![run_id, label, url, position as i64])?;
            }
        }
        Ok(())
    }

    fn get_unfamiliar(&self, run_id: i64) -> StorageResult<BTreeMap<String, Vec<String>>> {
        let mut stmt = self.conn.prepare(
            "SELECT label, url FROM unfamiliar_kinds WHERE run_id = ?1 ORDER BY label, position",
        )?;
        let rows = stmt.query_map(params![run_id], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut kinds: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for row in rows {
            let (label, url) = row?;
            kinds.entry(label).or_default().push(url);
        }
        Ok(kinds)
    }

    // ===== Statistics =====

    fn count_artists(&self) -> StorageResult<u64> {
        self.count("SELECT COUNT(*) FROM artists")
    }

    fn count_unnamed_artists(&self) -> StorageResult<u64> {
        self.count("SELECT COUNT(*) FROM artists WHERE name IS NULL")
    }

    fn count_coverage(&self) -> StorageResult<u64> {
        self.count("SELECT COUNT(*) FROM coverage")
    }

    fn count_coverage_by_kind(&self) -> StorageResult<BTreeMap<String, u64>> {
        let mut stmt = self
            .conn
            .prepare("SELECT kind, COUNT(*) FROM coverage GROUP BY kind")?;

        let mut by_kind = BTreeMap::new();
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?;
        for row in rows {
            let (kind, count) = row?;
            by_kind.insert(kind, count as u64);
        }

        Ok(by_kind)
    }
}
