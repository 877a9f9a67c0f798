//! Output module for crawl reports and summaries
//!
//! This module handles:
//! - Writing the broken-link CSV report
//! - Building and printing the end-of-run summary

mod csv_report;
mod summary;

pub use csv_report::{report_path, sanitize_report_title, write_csv, write_csv_report};
pub use summary::{print_summary, CrawlSummary};

use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to format output: {0}")]
    Format(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;
