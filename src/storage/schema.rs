//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the coverage database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Track crawl runs
CREATE TABLE IF NOT EXISTS runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    started_at TEXT NOT NULL,
    finished_at TEXT,
    config_hash TEXT NOT NULL,
    status TEXT NOT NULL,
    index_pages INTEGER NOT NULL DEFAULT 0,
    artists_discovered INTEGER NOT NULL DEFAULT 0,
    artists_reconciled INTEGER NOT NULL DEFAULT 0,
    artists_failed INTEGER NOT NULL DEFAULT 0,
    coverage_records INTEGER NOT NULL DEFAULT 0,
    pagination_cycles INTEGER NOT NULL DEFAULT 0,
    extraction_warnings INTEGER NOT NULL DEFAULT 0,
    failures TEXT
);

-- One row per artist, keyed by the site's numeric artist id
CREATE TABLE IF NOT EXISTS artists (
    id INTEGER PRIMARY KEY,
    slug TEXT NOT NULL,
    url TEXT NOT NULL,
    name TEXT
);

-- Per-label coverage totals as seen on the artist page
CREATE TABLE IF NOT EXISTS artist_coverage_counts (
    artist_id INTEGER NOT NULL REFERENCES artists(id),
    label TEXT NOT NULL,
    count INTEGER NOT NULL,
    PRIMARY KEY (artist_id, label)
);

-- Coverage items; replaced wholesale on every reconcile
CREATE TABLE IF NOT EXISTS coverage (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    artist_id INTEGER NOT NULL REFERENCES artists(id),
    kind TEXT NOT NULL,
    label TEXT NOT NULL,
    url TEXT NOT NULL CHECK (url <> ''),
    title TEXT NOT NULL,
    author TEXT,
    image TEXT
);

CREATE INDEX IF NOT EXISTS idx_coverage_artist ON coverage(artist_id);
CREATE INDEX IF NOT EXISTS idx_coverage_kind ON coverage(kind);

-- Section labels without an extractor, with the artist pages they appeared on
CREATE TABLE IF NOT EXISTS unfamiliar_kinds (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    run_id INTEGER NOT NULL REFERENCES runs(id),
    label TEXT NOT NULL,
    url TEXT NOT NULL,
    position INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_unfamiliar_run ON unfamiliar_kinds(run_id);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
