//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::crawler::CrawlResult;
use crate::storage::{BrokenLinkRecord, RunRecord, RunStatus};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for run history backends
pub trait Storage {
    // ===== Run Management =====

    /// Creates a new run in the `running` state
    ///
    /// # Arguments
    ///
    /// * `root` - The root URL being checked
    /// * `config_hash` - Hash of the configuration file
    ///
    /// # Returns
    ///
    /// The ID of the newly created run
    fn create_run(&mut self, root: &str, config_hash: &str) -> StorageResult<i64>;

    /// Gets a run by ID
    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord>;

    /// Gets the most recent run
    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>>;

    /// Lists the most recent runs, newest first
    fn list_runs(&self, limit: usize) -> StorageResult<Vec<RunRecord>>;

    /// Updates the status of a run without touching its results
    fn update_run_status(&mut self, run_id: i64, status: RunStatus) -> StorageResult<()>;

    // ===== Results =====

    /// Stores the outcome of a run and sets its final status
    ///
    /// Writes the pages-visited count, the JSON-serialized result and one
    /// row per broken URL / referrer pair in a single transaction.
    fn save_result(
        &mut self,
        run_id: i64,
        pages_visited: usize,
        result: &CrawlResult,
        status: RunStatus,
    ) -> StorageResult<()>;

    /// Loads the stored result of a run
    ///
    /// Runs that never finished load as an empty result.
    fn load_result(&self, run_id: i64) -> StorageResult<CrawlResult>;

    /// Gets the broken URL / referrer rows of a run
    fn get_broken_links(&self, run_id: i64) -> StorageResult<Vec<BrokenLinkRecord>>;
}
