//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Storage trait.

use crate::crawler::CrawlResult;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Storage, StorageError, StorageResult};
use crate::storage::{BrokenLinkRecord, RunRecord, RunStatus};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

const RUN_COLUMNS: &str =
    "id, started_at, finished_at, config_hash, root, status, pages_visited, broken_count";

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
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
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
        ",
        )?;
        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

fn run_from_row(row: &Row<'_>) -> rusqlite::Result<RunRecord> {
    Ok(RunRecord {
        id: row.get(0)?,
        started_at: row.get(1)?,
        finished_at: row.get(2)?,
        config_hash: row.get(3)?,
        root: row.get(4)?,
        status: RunStatus::from_db_string(&row.get::<_, String>(5)?)
            .unwrap_or(RunStatus::Failed),
        pages_visited: row.get::<_, Option<i64>>(6)?.map(|n| n as u64),
        broken_count: row.get::<_, Option<i64>>(7)?.map(|n| n as u64),
    })
}

impl Storage for SqliteStorage {
    // ===== Run Management =====

    fn create_run(&mut self, root: &str, config_hash: &str) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO runs (started_at, config_hash, root, status) VALUES (?1, ?2, ?3, ?4)",
            params![now, config_hash, root, RunStatus::Running.to_db_string()],
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

    fn list_runs(&self, limit: usize) -> StorageResult<Vec<RunRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM runs ORDER BY id DESC LIMIT ?1",
            RUN_COLUMNS
        ))?;

        let runs = stmt
            .query_map(params![limit as i64], run_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(runs)
    }

    fn update_run_status(&mut self, run_id: i64, status: RunStatus) -> StorageResult<()> {
        let updated = self.conn.execute(
            "UPDATE runs SET status = ?1 WHERE id = ?2",
            params![status.to_db_string(), run_id],
        )?;
        if updated == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        Ok(())
    }

    // ===== Results =====

    fn save_result(
        &mut self,
        run_id: i64,
        pages_visited: usize,
        result: &CrawlResult,
        status: RunStatus,
    ) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let json = serde_json::to_string(result)?;

        let tx = self.conn.transaction()?;
        let updated = tx.execute(
            "UPDATE runs SET status = ?1, finished_at = ?2, pages_visited = ?3,
                broken_count = ?4, result_json = ?5
             WHERE id = ?6",
            params![
                status.to_db_string(),
                now,
                pages_visited as i64,
                result.len() as i64,
                json,
                run_id
            ],
        )?;
        if updated == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }

        tx.execute("DELETE FROM broken_links WHERE run_id = ?1", params![run_id])?;
        {
            let mut insert = tx.prepare(
                "INSERT INTO broken_links (run_id, url, referrer) VALUES (?1, ?2, ?3)",
            )?;
            for (url, referrers) in result {
                if referrers.is_empty() {
                    insert.execute(params![run_id, url.as_str(), Option::<&str>::None])?;
                }
                for referrer in referrers {
                    insert.execute(params![run_id, url.as_str(), referrer.as_str()])?;
                }
            }
        }
        tx.commit()?;

        tracing::debug!(
            "Stored run {} ({}, {} pages, {} broken)",
            run_id,
            status,
            pages_visited,
            result.len()
        );
        Ok(())
    }

    fn load_result(&self, run_id: i64) -> StorageResult<CrawlResult> {
        let json: Option<String> = self
            .conn
            .query_row(
                "SELECT result_json FROM runs WHERE id = ?1",
                params![run_id],
                |row| row.get(0),
            )
            .optional()?
            .ok_or(StorageError::RunNotFound(run_id))?;

        match json {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(CrawlResult::new()),
        }
    }

    fn get_broken_links(&self, run_id: i64) -> StorageResult<Vec<BrokenLinkRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT run_id, url, referrer FROM broken_links WHERE run_id = ?1 ORDER BY url, referrer",
        )?;

        let links = stmt
            .query_map(params![run_id], |row| {
                Ok(BrokenLinkRecord {
                    run_id: row.get(0)?,
                    url: row.get(1)?,
                    referrer: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(links)
    }
}
