//! Checker - crawl orchestration
//!
//! This module owns one crawl run end to end:
//! - Seeding the frontier with the root URL
//! - Spawning the worker pool
//! - Waiting for the frontier to drain or for an external shutdown
//! - Joining the workers and building the broken-link report

use crate::config::Config;
use crate::crawler::fetcher::Fetcher;
use crate::crawler::frontier::{CrawlTask, Frontier};
use crate::crawler::policy::RetryPolicy;
use crate::crawler::report::{build_report, CrawlResult};
use crate::crawler::worker::{run_worker, WorkerContext, WorkerStats};
use crate::state::CrawlState;
use crate::url::normalize_url;
use crate::{ConfigError, ConfigResult};
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use url::Url;

/// Validated crawl parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckerSettings {
    /// Normalized root URL; also defines the crawled site
    pub root: Url,

    /// Number of workers spawned per run
    pub concurrency: usize,

    /// Maximum hops from the root that are still fetched
    pub max_depth: u32,

    /// Ceiling on succeeded plus failed URLs
    pub max_pages: usize,

    /// Retries after the first failed attempt
    pub max_tries: u32,

    /// Per-request timeout handed to the fetcher
    pub timeout: Duration,

    /// Pause before a failed task is requeued
    pub retry_delay: Duration,
}

impl CheckerSettings {
    /// Creates settings with no retry delay
    pub fn new(
        root: Url,
        concurrency: usize,
        max_depth: u32,
        max_pages: usize,
        max_tries: u32,
        timeout: Duration,
    ) -> Self {
        Self {
            root,
            concurrency,
            max_depth,
            max_pages,
            max_tries,
            timeout,
            retry_delay: Duration::ZERO,
        }
    }

    /// Extracts the crawl parameters from a loaded configuration
    pub fn from_config(config: &Config) -> ConfigResult<Self> {
        let crawler = &config.crawler;
        let root = normalize_url(&crawler.root)
            .map_err(|e| ConfigError::InvalidUrl(format!("{}: {}", crawler.root, e)))?;

        let settings = Self {
            root,
            concurrency: crawler.concurrency as usize,
            max_depth: crawler.max_depth,
            max_pages: crawler.max_pages as usize,
            max_tries: crawler.max_tries,
            timeout: crawler.timeout_duration(),
            retry_delay: crawler.retry_delay_duration(),
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Rejects settings a crawl cannot run with
    pub fn validate(&self) -> ConfigResult<()> {
        if self.concurrency == 0 {
            return Err(ConfigError::Validation(
                "concurrency must be greater than 0".to_string(),
            ));
        }
        if self.max_pages == 0 {
            return Err(ConfigError::Validation(
                "max_pages must be greater than 0".to_string(),
            ));
        }
        if self.timeout.is_zero() {
            return Err(ConfigError::Validation(
                "timeout must be greater than 0".to_string(),
            ));
        }
        match self.root.scheme() {
            "http" | "https" => Ok(()),
            other => Err(ConfigError::InvalidUrl(format!(
                "root must be http or https, got {}",
                other
            ))),
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_tries, self.retry_delay)
    }
}

/// Everything a finished run produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlOutcome {
    /// Broken URL → referring pages
    pub result: CrawlResult,

    /// URLs that answered 200
    pub succeeded: usize,

    /// URLs that exhausted their retries
    pub failed: usize,

    /// Summed worker counters
    pub stats: WorkerStats,

    /// Whether the run was cut short by the shutdown signal
    pub interrupted: bool,

    /// Wall-clock duration of the run
    pub elapsed: Duration,
}

impl CrawlOutcome {
    /// URLs that reached a terminal state
    pub fn pages_visited(&self) -> usize {
        self.succeeded + self.failed
    }

    pub fn broken_count(&self) -> usize {
        self.result.len()
    }
}

/// Bounded concurrent link checker
///
/// A `Checker` is reusable: every call to [`check`](Self::check) starts from
/// a fresh state and frontier.
///
/// # Example
///
/// ```no_run
/// use broken_links::crawler::{Checker, CheckerSettings, HttpFetcher, build_http_client};
/// use std::time::Duration;
/// use url::Url;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let settings = CheckerSettings::new(
///     Url::parse("https://example.com/")?,
///     8,
///     3,
///     500,
///     2,
///     Duration::from_secs(10),
/// );
/// let fetcher = HttpFetcher::new(build_http_client("broken-links/0.1.0", None, false)?);
/// let outcome = Checker::new(settings, fetcher)?.check().await;
/// for (url, referrers) in &outcome.result {
///     println!("{} <- {:?}", url, referrers);
/// }
/// # Ok(())
/// # }
/// ```
pub struct Checker<F> {
    settings: CheckerSettings,
    fetcher: Arc<F>,
}

impl<F: Fetcher + 'static> Checker<F> {
    /// Creates a checker, validating the settings first
    pub fn new(settings: CheckerSettings, fetcher: F) -> ConfigResult<Self> {
        settings.validate()?;
        Ok(Self {
            settings,
            fetcher: Arc::new(fetcher),
        })
    }

    pub fn settings(&self) -> &CheckerSettings {
        &self.settings
    }

    /// Crawls the site and reports its broken links
    pub async fn check(&self) -> CrawlOutcome {
        self.check_with_shutdown(std::future::pending::<()>()).await
    }

    /// Crawls the site until it is exhausted or `shutdown` completes
    ///
    /// On shutdown the frontier is stopped: queued tasks are discarded,
    /// in-flight fetches finish, and the report covers what was resolved so
    /// far.
    pub async fn check_with_shutdown<S>(&self, shutdown: S) -> CrawlOutcome
    where
        S: Future<Output = ()>,
    {
        let start_time = Instant::now();
        let settings = &self.settings;

        let ctx = Arc::new(WorkerContext {
            state: Mutex::new(CrawlState::new()),
            frontier: Frontier::new(),
            fetcher: Arc::clone(&self.fetcher),
            policy: settings.retry_policy(),
            root: settings.root.clone(),
            max_depth: settings.max_depth,
            max_pages: settings.max_pages,
            timeout: settings.timeout,
        });

        {
            let mut state = ctx.state.lock().await;
            state.admit(&settings.root);
            ctx.frontier
                .enqueue(CrawlTask::root(settings.root.clone()))
                .await;
        }

        tracing::info!(
            "Checking {} with {} workers (max depth {}, max pages {}, max tries {})",
            settings.root,
            settings.concurrency,
            settings.max_depth,
            settings.max_pages,
            settings.max_tries
        );

        let handles: Vec<_> = (0..settings.concurrency)
            .map(|id| tokio::spawn(run_worker(id, Arc::clone(&ctx))))
            .collect();

        let interrupted = tokio::select! {
            _ = ctx.frontier.wait() => false,
            _ = shutdown => {
                tracing::info!("Shutdown requested, finishing in-flight pages");
                true
            }
        };

        ctx.frontier.shutdown().await;

        let mut stats = WorkerStats::default();
        for handle in handles {
            match handle.await {
                Ok(worker_stats) => stats.merge(worker_stats),
                Err(e) => tracing::error!("Worker task failed: {}", e),
            }
        }

        let state = ctx.state.lock().await;
        let result = build_report(&state);
        let outcome = CrawlOutcome {
            result,
            succeeded: state.succeeded().len(),
            failed: state.failed().len(),
            stats,
            interrupted,
            elapsed: start_time.elapsed(),
        };

        tracing::info!(
            "Check {}: {} pages visited, {} broken, {} fetches in {:?}",
            if interrupted { "interrupted" } else { "completed" },
            outcome.pages_visited(),
            outcome.broken_count(),
            outcome.stats.fetches,
            outcome.elapsed
        );

        outcome
    }
}
