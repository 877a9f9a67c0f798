//! Database schema definitions
//!
//! This module contains the SQL schema for the run history database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- One row per check run
CREATE TABLE IF NOT EXISTS runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    started_at TEXT NOT NULL,
    finished_at TEXT,
    config_hash TEXT NOT NULL,
    root TEXT NOT NULL,
    status TEXT NOT NULL,
    pages_visited INTEGER,
    broken_count INTEGER,
    result_json TEXT
);

CREATE INDEX IF NOT EXISTS idx_runs_root ON runs(root);

-- Broken URL / referrer pairs; referrer is NULL for an unreferenced URL
CREATE TABLE IF NOT EXISTS broken_links (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    run_id INTEGER NOT NULL REFERENCES runs(id),
    url TEXT NOT NULL,
    referrer TEXT,
    UNIQUE(run_id, url, referrer)
);

CREATE INDEX IF NOT EXISTS idx_broken_links_run ON broken_links(run_id);
CREATE INDEX IF NOT EXISTS idx_broken_links_url ON broken_links(url);
"#;

/// Initializes the database schema
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
