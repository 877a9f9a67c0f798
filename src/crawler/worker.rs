//! Crawl workers
//!
//! Each worker loops on the frontier until it is stopped, resolving every
//! task it dequeues to exactly one outcome: dropped, succeeded, requeued for
//! retry, or failed.

use crate::crawler::fetcher::{FetchResponse, Fetcher};
use crate::crawler::frontier::{CrawlTask, Frontier};
use crate::crawler::policy::{Disposition, RetryPolicy};
use crate::state::CrawlState;
use crate::url::is_same_site;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use url::Url;

/// Everything a worker shares with its siblings for one run
pub(crate) struct WorkerContext<F> {
    pub state: Mutex<CrawlState>,
    pub frontier: Frontier,
    pub fetcher: Arc<F>,
    pub policy: RetryPolicy,
    pub root: Url,
    pub max_depth: u32,
    pub max_pages: usize,
    pub timeout: Duration,
}

/// Per-worker counters, summed by the checker at the end of a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerStats {
    /// Fetch calls made, retries included
    pub fetches: usize,

    /// Failed fetches that were requeued
    pub retries: usize,

    /// Tasks dropped by the depth or budget check
    pub dropped: usize,
}

impl WorkerStats {
    pub fn merge(&mut self, other: WorkerStats) {
        self.fetches += other.fetches;
        self.retries += other.retries;
        self.dropped += other.dropped;
    }
}

/// How a single task was resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TaskOutcome {
    Dropped,
    Succeeded,
    Requeued,
    Failed,
}

/// Runs one worker until the frontier stops
pub(crate) async fn run_worker<F: Fetcher + 'static>(id: usize, ctx: Arc<WorkerContext<F>>) -> WorkerStats {
    tracing::debug!("Worker {} started", id);
    let mut stats = WorkerStats::default();

    while let Some(task) = ctx.frontier.dequeue().await {
        match process_task(id, &ctx, task).await {
            TaskOutcome::Dropped => stats.dropped += 1,
            TaskOutcome::Succeeded | TaskOutcome::Failed => stats.fetches += 1,
            TaskOutcome::Requeued => {
                stats.fetches += 1;
                stats.retries += 1;
            }
        }
        ctx.frontier.mark_done().await;
    }

    tracing::debug!(
        "Worker {} stopped after {} fetches ({} retries, {} dropped)",
        id,
        stats.fetches,
        stats.retries,
        stats.dropped
    );
    stats
}

/// Resolves one task
///
/// The caller marks the task done afterwards; every enqueue this task causes
/// happens before this function returns.
async fn process_task<F: Fetcher + 'static>(id: usize, ctx: &WorkerContext<F>, task: CrawlTask) -> TaskOutcome {
    if task.depth > ctx.max_depth {
        tracing::trace!("Worker {}: {} beyond max depth, dropped", id, task.url);
        return TaskOutcome::Dropped;
    }

    if !ctx.state.lock().await.try_reserve(ctx.max_pages) {
        tracing::trace!("Worker {}: page budget reached, dropped {}", id, task.url);
        return TaskOutcome::Dropped;
    }

    tracing::debug!(
        "Worker {}: fetching {} (depth {}, attempt {})",
        id,
        task.url,
        task.depth,
        task.attempt
    );

    // A panicking fetcher only loses its own task; the worker keeps going
    // and the failure goes through the retry policy like any other.
    let fetch = {
        let fetcher = Arc::clone(&ctx.fetcher);
        let url = task.url.clone();
        let timeout = ctx.timeout;
        tokio::spawn(async move { fetcher.fetch(&url, timeout).await })
    };

    let reason = match fetch.await {
        Ok(Ok(response)) if response.is_success() => {
            admit_links(ctx, &task, response).await;
            return TaskOutcome::Succeeded;
        }
        Ok(Ok(response)) => format!("HTTP {}", response.status),
        Ok(Err(e)) => e.to_string(),
        Err(e) => {
            tracing::error!("Worker {}: fetch of {} aborted: {}", id, task.url, e);
            format!("fetch aborted: {}", e)
        }
    };

    match ctx.policy.on_failure(&task) {
        Disposition::Retry(next) => {
            ctx.state.lock().await.release_reservation();
            tracing::debug!(
                "Worker {}: {} failed ({}), retry {}/{}",
                id,
                task.url,
                reason,
                next.attempt,
                ctx.policy.max_tries
            );

            if !ctx.policy.delay.is_zero() {
                tokio::time::sleep(ctx.policy.delay).await;
            }
            ctx.frontier.enqueue(next).await;
            TaskOutcome::Requeued
        }
        Disposition::GiveUp => {
            if ctx.state.lock().await.record_failure(&task.url) {
                tracing::warn!(
                    "Broken link {} after {} attempts: {}",
                    task.url,
                    task.attempt + 1,
                    reason
                );
            }
            TaskOutcome::Failed
        }
    }
}

/// Records a successful page and admits its same-site links
///
/// Check-seen, insert and enqueue all happen under the state lock so two
/// workers finding the same link cannot both enqueue it.
async fn admit_links<F: Fetcher>(ctx: &WorkerContext<F>, task: &CrawlTask, response: FetchResponse) {
    let mut state = ctx.state.lock().await;
    let links = state.record_success(&task.url, response.links);

    if task.depth >= ctx.max_depth || state.is_budget_reached(ctx.max_pages) {
        return;
    }

    let mut admitted = 0;
    for link in links {
        if !is_same_site(&ctx.root, &link) {
            continue;
        }
        if !state.admit(&link) {
            tracing::trace!("Already seen {}", link);
            continue;
        }
        if ctx.frontier.enqueue(task.child(link)).await {
            admitted += 1;
        }
    }

    if admitted > 0 {
        tracing::debug!("Admitted {} new links from {}", admitted, task.url);
    }
}
