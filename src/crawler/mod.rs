//! Crawler module for link checking
//!
//! This module contains the core crawl engine, including:
//! - The frontier queue shared by the workers
//! - The worker loop and the retry policy
//! - HTTP fetching and link extraction behind the `Fetcher` trait
//! - Run orchestration and the broken-link report

mod coordinator;
mod fetcher;
mod frontier;
mod parser;
mod policy;
mod report;
mod worker;

pub use coordinator::{Checker, CheckerSettings, CrawlOutcome};
pub use fetcher::{build_http_client, FetchError, FetchResponse, Fetcher, HttpFetcher};
pub use frontier::{CrawlTask, Frontier};
pub use parser::extract_links;
pub use policy::{Disposition, RetryPolicy};
pub use report::{build_report, referrer_count, CrawlResult};
pub use worker::WorkerStats;

use crate::config::Config;
use std::future::Future;

/// Runs a complete check described by a configuration file
///
/// Builds the HTTP client (user agent, proxy, TLS settings) and the crawl
/// settings from `config`, then crawls until the site is exhausted or
/// `shutdown` completes.
///
/// # Returns
///
/// * `Ok(CrawlOutcome)` - The crawl ran; broken links are in the outcome
/// * `Err(CheckerError)` - The configuration or HTTP client was unusable
pub async fn check<S>(config: &Config, shutdown: S) -> crate::Result<CrawlOutcome>
where
    S: Future<Output = ()>,
{
    let settings = CheckerSettings::from_config(config)?;
    let fetcher = HttpFetcher::from_config(config)?;
    let checker = Checker::new(settings, fetcher)?;
    Ok(checker.check_with_shutdown(shutdown).await)
}
