//! Retry / admission policy
//!
//! A pure decision applied to every failed fetch. Successful fetches never
//! reach the policy.

use crate::crawler::frontier::CrawlTask;
use std::time::Duration;

/// What to do with a task whose fetch failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
    /// Re-enqueue this task (same URL and depth, next attempt)
    Retry(CrawlTask),

    /// Record the URL as permanently failed
    GiveUp,
}

/// Per-URL retry policy
///
/// | Condition | Action |
/// |-----------|--------|
/// | `attempt < max_tries` | Retry at the same depth with `attempt + 1` |
/// | `attempt >= max_tries` | Give up; the URL is broken |
///
/// A URL that always fails is therefore fetched `max_tries + 1` times.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries allowed after the first attempt
    pub max_tries: u32,

    /// Pause before a retry is re-enqueued
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_tries: u32, delay: Duration) -> Self {
        Self { max_tries, delay }
    }

    /// Decides the fate of a failed task
    pub fn on_failure(&self, task: &CrawlTask) -> Disposition {
        if task.attempt < self.max_tries {
            Disposition::Retry(task.retry())
        } else {
            Disposition::GiveUp
        }
    }
}
