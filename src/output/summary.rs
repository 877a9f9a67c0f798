//! End-of-run summary
//!
//! Condenses a crawl outcome into the figures printed when a check finishes.

use crate::crawler::{referrer_count, CrawlOutcome};
use url::Url;

/// Summary statistics for a finished check
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CrawlSummary {
    pub root: String,
    pub pages_visited: usize,
    pub pages_succeeded: usize,
    pub pages_failed: usize,
    pub broken_links: usize,

    /// Broken-link references across all pages
    pub broken_references: usize,

    pub fetches: usize,
    pub retries: usize,
    pub duration_seconds: f64,
    pub interrupted: bool,
}

impl CrawlSummary {
    /// Builds the summary of one check
    pub fn from_outcome(root: &Url, outcome: &CrawlOutcome) -> Self {
        Self {
            root: root.to_string(),
            pages_visited: outcome.pages_visited(),
            pages_succeeded: outcome.succeeded,
            pages_failed: outcome.failed,
            broken_links: outcome.broken_count(),
            broken_references: referrer_count(&outcome.result),
            fetches: outcome.stats.fetches,
            retries: outcome.stats.retries,
            duration_seconds: outcome.elapsed.as_secs_f64(),
            interrupted: outcome.interrupted,
        }
    }

    /// Returns the success rate as a percentage
    pub fn success_rate(&self) -> f64 {
        if self.pages_visited == 0 {
            return 0.0;
        }
        (self.pages_succeeded as f64 / self.pages_visited as f64) * 100.0
    }

    /// Pages resolved per second of wall-clock time
    pub fn pages_per_second(&self) -> f64 {
        if self.duration_seconds <= 0.0 {
            return 0.0;
        }
        self.pages_visited as f64 / self.duration_seconds
    }
}

/// Prints the summary and the broken links to stdout
pub fn print_summary(summary: &CrawlSummary, outcome: &CrawlOutcome) {
    println!("=== Link Check Summary ===\n");

    println!("Root: {}", summary.root);
    if summary.interrupted {
        println!("Status: interrupted (partial results)");
    } else {
        println!("Status: completed");
    }
    println!();

    println!("Overview:");
    println!("  Pages visited: {}", summary.pages_visited);
    println!(
        "  Succeeded: {} ({:.1}%)",
        summary.pages_succeeded,
        summary.success_rate()
    );
    println!("  Failed: {}", summary.pages_failed);
    println!(
        "  Fetches: {} ({} retries)",
        summary.fetches, summary.retries
    );
    println!(
        "  Duration: {:.1}s ({:.2} pages/sec)",
        summary.duration_seconds,
        summary.pages_per_second()
    );
    println!();

    if outcome.result.is_empty() {
        println!("No broken links found.");
        return;
    }

    println!(
        "Broken Links ({}, referenced {} times):",
        summary.broken_links, summary.broken_references
    );
    for (url, referrers) in &outcome.result {
        println!("  - {}", url);
        if referrers.is_empty() {
            println!("      (no referrers)");
        }
        for referrer in referrers {
            println!("      <- {}", referrer);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::{CrawlResult, WorkerStats};
    use std::collections::BTreeSet;
    use std::time::Duration;

    fn url(path: &str) -> Url {
        Url::parse("https://example.com/").unwrap().join(path).unwrap()
    }

    fn outcome() -> CrawlOutcome {
        let mut result = CrawlResult::new();
        result.insert(url("/gone"), BTreeSet::from([url("/"), url("/a")]));
        CrawlOutcome {
            result,
            succeeded: 3,
            failed: 1,
            stats: WorkerStats {
                fetches: 6,
                retries: 2,
                dropped: 0,
            },
            interrupted: false,
            elapsed: Duration::from_secs(2),
        }
    }

    #[test]
    fn test_summary_from_outcome() {
        let summary = CrawlSummary::from_outcome(&url("/"), &outcome());

        assert_eq!(summary.root, "https://example.com/");
        assert_eq!(summary.pages_visited, 4);
        assert_eq!(summary.broken_links, 1);
        assert_eq!(summary.broken_references, 2);
        assert_eq!(summary.retries, 2);
        assert!((summary.success_rate() - 75.0).abs() < 0.01);
        assert!((summary.pages_per_second() - 2.0).abs() < 0.01);
    }

    #[test]
    fn test_rates_with_nothing_visited() {
        let summary = CrawlSummary::default();
        assert_eq!(summary.success_rate(), 0.0);
        assert_eq!(summary.pages_per_second(), 0.0);
    }
}
