//! Crawl frontier: the shared work queue
//!
//! This module handles:
//! - FIFO queueing of crawl tasks from any number of workers
//! - Blocking dequeue for idle workers
//! - Drain detection through an outstanding-task counter
//! - Broadcasting stop so blocked workers exit

use std::collections::VecDeque;
use tokio::sync::{Mutex, Notify};
use url::Url;

/// A unit of crawl work
///
/// Tasks are immutable; a retry is a new task with `attempt + 1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlTask {
    /// The URL to fetch
    pub url: Url,

    /// Hops from the root along the path the URL was first found on
    pub depth: u32,

    /// Zero for the first fetch, incremented on every retry
    pub attempt: u32,
}

impl CrawlTask {
    /// Creates the task for the root URL
    pub fn root(url: Url) -> Self {
        Self {
            url,
            depth: 0,
            attempt: 0,
        }
    }

    /// Creates the first-attempt task for a link found on this task's page
    pub fn child(&self, url: Url) -> Self {
        Self {
            url,
            depth: self.depth + 1,
            attempt: 0,
        }
    }

    /// Creates the retry of this task
    pub fn retry(&self) -> Self {
        Self {
            url: self.url.clone(),
            depth: self.depth,
            attempt: self.attempt + 1,
        }
    }
}

#[derive(Debug, Default)]
struct FrontierInner {
    queue: VecDeque<CrawlTask>,

    /// Enqueued tasks not yet marked done, including dequeued ones
    outstanding: usize,

    stopped: bool,
}

/// Multi-producer multi-consumer queue with join semantics
///
/// The frontier is drained when the queue is empty and every dequeued task
/// has been marked done. Counting dequeued-but-unfinished tasks keeps the
/// frontier from looking drained while a worker is still about to enqueue
/// children.
#[derive(Debug, Default)]
pub struct Frontier {
    inner: Mutex<FrontierInner>,

    /// Wakes workers blocked in `dequeue`
    work_available: Notify,

    /// Wakes callers blocked in `wait`
    drained: Notify,
}

impl Frontier {
    /// Creates an empty frontier
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a task to the back of the queue
    ///
    /// Returns `false` if the frontier has been stopped; the task is dropped
    /// and not counted.
    pub async fn enqueue(&self, task: CrawlTask) -> bool {
        let mut inner = self.inner.lock().await;
        if inner.stopped {
            tracing::trace!("Frontier stopped, dropping {}", task.url);
            return false;
        }

        inner.queue.push_back(task);
        inner.outstanding += 1;
        drop(inner);

        self.work_available.notify_one();
        true
    }

    /// Removes the task at the front of the queue
    ///
    /// Blocks while the queue is empty. Returns `None` once the frontier is
    /// stopped, even if tasks are still queued.
    pub async fn dequeue(&self) -> Option<CrawlTask> {
        loop {
            let notified = self.work_available.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            {
                let mut inner = self.inner.lock().await;
                if inner.stopped {
                    return None;
                }
                if let Some(task) = inner.queue.pop_front() {
                    return Some(task);
                }
            }

            notified.await;
        }
    }

    /// Signals that a dequeued task is fully processed
    ///
    /// Must be called once per dequeued task, after any follow-up tasks have
    /// been enqueued.
    pub async fn mark_done(&self) {
        let mut inner = self.inner.lock().await;
        inner.outstanding = inner.outstanding.saturating_sub(1);
        let is_drained = inner.outstanding == 0;
        drop(inner);

        if is_drained {
            self.drained.notify_waiters();
        }
    }

    /// Waits until the frontier is drained or stopped
    pub async fn wait(&self) {
        loop {
            let notified = self.drained.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            {
                let inner = self.inner.lock().await;
                if inner.outstanding == 0 || inner.stopped {
                    return;
                }
            }

            notified.await;
        }
    }

    /// Stops the frontier and wakes every blocked worker and waiter
    ///
    /// Queued tasks are discarded.
    pub async fn shutdown(&self) {
        let mut inner = self.inner.lock().await;
        inner.stopped = true;
        let discarded = inner.queue.len();
        inner.queue.clear();
        drop(inner);

        if discarded > 0 {
            tracing::debug!("Frontier stopped with {} queued tasks discarded", discarded);
        }

        self.work_available.notify_waiters();
        self.drained.notify_waiters();
    }

    /// Returns the number of queued (not yet dequeued) tasks
    pub async fn len(&self) -> usize {
        self.inner.lock().await.queue.len()
    }

    /// Returns whether no tasks are queued
    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.queue.is_empty()
    }

    /// Returns the number of enqueued tasks not yet marked done
    pub async fn outstanding(&self) -> usize {
        self.inner.lock().await.outstanding
    }

    /// Returns whether the frontier has been stopped
    pub async fn is_stopped(&self) -> bool {
        self.inner.lock().await.stopped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    fn task(path: &str) -> CrawlTask {
        let url = Url::parse("https://example.com/").unwrap().join(path).unwrap();
        CrawlTask::root(url)
    }

    #[test]
    fn test_task_constructors() {
        let root = task("/");
        let child = root.child(Url::parse("https://example.com/a").unwrap());
        assert_eq!(child.depth, 1);
        assert_eq!(child.attempt, 0);

        let retry = child.retry();
        assert_eq!(retry.url, child.url);
        assert_eq!(retry.depth, 1);
        assert_eq!(retry.attempt, 1);
    }

    #[tokio::test]
    async fn test_new_frontier() {
        let frontier = Frontier::new();
        assert_eq!(frontier.len().await, 0);
        assert!(frontier.is_empty().await);
        assert_eq!(frontier.outstanding().await, 0);
    }

    #[tokio::test]
    async fn test_fifo_order() {
        let frontier = Frontier::new();
        frontier.enqueue(task("/1")).await;
        frontier.enqueue(task("/2")).await;
        frontier.enqueue(task("/3")).await;

        assert_eq!(frontier.dequeue().await.unwrap().url.path(), "/1");
        assert_eq!(frontier.dequeue().await.unwrap().url.path(), "/2");
        assert_eq!(frontier.dequeue().await.unwrap().url.path(), "/3");
    }

    #[tokio::test]
    async fn test_outstanding_counts_dequeued_tasks() {
        let frontier = Frontier::new();
        frontier.enqueue(task("/")).await;
        let _ = frontier.dequeue().await.unwrap();

        assert!(frontier.is_empty().await);
        assert_eq!(frontier.outstanding().await, 1);

        frontier.mark_done().await;
        assert_eq!(frontier.outstanding().await, 0);
    }

    #[tokio::test]
    async fn test_wait_returns_immediately_when_drained() {
        let frontier = Frontier::new();
        tokio::time::timeout(Duration::from_secs(1), frontier.wait())
            .await
            .expect("wait should not block on an empty frontier");
    }

    #[tokio::test]
    async fn test_wait_covers_children_enqueued_before_done() {
        let frontier = Arc::new(Frontier::new());
        frontier.enqueue(task("/")).await;

        let worker = {
            let frontier = Arc::clone(&frontier);
            tokio::spawn(async move {
                let _ = frontier.dequeue().await.unwrap();
                tokio::time::sleep(Duration::from_millis(50)).await;
                frontier.enqueue(task("/child")).await;
                frontier.mark_done().await;

                let _ = frontier.dequeue().await.unwrap();
                frontier.mark_done().await;
            })
        };

        tokio::time::timeout(Duration::from_secs(2), frontier.wait())
            .await
            .expect("frontier should drain");
        assert_eq!(frontier.outstanding().await, 0);
        worker.await.unwrap();
    }

    #[tokio::test]
    async fn test_dequeue_blocks_until_enqueue() {
        let frontier = Arc::new(Frontier::new());

        let consumer = {
            let frontier = Arc::clone(&frontier);
            tokio::spawn(async move { frontier.dequeue().await })
        };

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!consumer.is_finished());

        frontier.enqueue(task("/late")).await;
        let received = tokio::time::timeout(Duration::from_secs(1), consumer)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(received.unwrap().url.path(), "/late");
    }

    #[tokio::test]
    async fn test_shutdown_releases_blocked_workers() {
        let frontier = Arc::new(Frontier::new());

        let workers: Vec<_> = (0..4)
            .map(|_| {
                let frontier = Arc::clone(&frontier);
                tokio::spawn(async move { frontier.dequeue().await })
            })
            .collect();

        tokio::time::sleep(Duration::from_millis(50)).await;
        frontier.shutdown().await;

        for worker in workers {
            let result = tokio::time::timeout(Duration::from_secs(1), worker)
                .await
                .expect("worker should exit after shutdown")
                .unwrap();
            assert!(result.is_none());
        }
    }

    #[tokio::test]
    async fn test_enqueue_after_shutdown_refused() {
        let frontier = Frontier::new();
        frontier.shutdown().await;

        assert!(!frontier.enqueue(task("/")).await);
        assert_eq!(frontier.outstanding().await, 0);
        assert!(frontier.dequeue().await.is_none());
        assert!(frontier.is_stopped().await);
    }

    #[tokio::test]
    async fn test_wait_returns_on_shutdown() {
        let frontier = Arc::new(Frontier::new());
        frontier.enqueue(task("/never-done")).await;

        let waiter = {
            let frontier = Arc::clone(&frontier);
            tokio::spawn(async move { frontier.wait().await })
        };

        tokio::time::sleep(Duration::from_millis(50)).await;
        frontier.shutdown().await;

        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("wait should return after shutdown")
            .unwrap();
    }
}
