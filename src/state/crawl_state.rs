use crate::state::UrlState;
use std::collections::{HashMap, HashSet};
use url::Url;

/// Outbound links of every successfully fetched page
pub type LinkMap = HashMap<Url, HashSet<Url>>;

/// Shared record of one crawl run
///
/// The struct itself is not synchronized. A run wraps it in a single mutex
/// and every check-then-write sequence below happens under that one lock,
/// which is what keeps `seen` a real dedup barrier across workers.
///
/// Invariants:
/// - `succeeded` and `failed` are disjoint
/// - `succeeded ∪ failed ⊆ seen`
/// - `|succeeded| + |failed| + in_flight <= max_pages` whenever slots are
///   taken through [`CrawlState::try_reserve`]
#[derive(Debug, Default)]
pub struct CrawlState {
    seen: HashSet<Url>,
    succeeded: HashSet<Url>,
    failed: HashSet<Url>,
    link_map: LinkMap,
    in_flight: usize,
}

impl CrawlState {
    /// Creates an empty state for a fresh run
    pub fn new() -> Self {
        Self::default()
    }

    /// Admits a URL into the crawl
    ///
    /// Returns `true` if the URL was unseen and is now pending; the caller
    /// must enqueue its task before releasing the lock. Returns `false` for
    /// anything already seen, including succeeded and failed URLs.
    pub fn admit(&mut self, url: &Url) -> bool {
        if self.seen.contains(url) {
            return false;
        }
        self.seen.insert(url.clone());
        true
    }

    /// Reserves one terminal slot in the page budget
    ///
    /// Fails once succeeded, failed and in-flight URLs together reach
    /// `max_pages`. Every successful reservation is consumed by exactly one
    /// of [`record_success`](Self::record_success),
    /// [`record_failure`](Self::record_failure) or
    /// [`release_reservation`](Self::release_reservation).
    pub fn try_reserve(&mut self, max_pages: usize) -> bool {
        if self.terminal_count() + self.in_flight >= max_pages {
            return false;
        }
        self.in_flight += 1;
        true
    }

    /// Gives back a reservation without reaching a terminal state (retry)
    pub fn release_reservation(&mut self) {
        self.in_flight = self.in_flight.saturating_sub(1);
    }

    /// Records a successful fetch and its outbound links
    ///
    /// Links that are already known good are left out of the recorded set.
    /// Failed links stay in, since the page still refers to them. A URL that
    /// already reached a terminal state is left as it is, so the link map is
    /// write-once.
    ///
    /// Returns the recorded outbound links so the caller can admit them.
    pub fn record_success(&mut self, url: &Url, outbound: HashSet<Url>) -> Vec<Url> {
        self.release_reservation();

        if self.url_state(url).is_terminal() {
            return Vec::new();
        }
        self.succeeded.insert(url.clone());

        let links: HashSet<Url> = outbound
            .into_iter()
            .filter(|link| !self.succeeded.contains(link))
            .collect();
        let recorded = links.iter().cloned().collect();
        self.link_map.insert(url.clone(), links);
        recorded
    }

    /// Records that a URL exhausted its retries
    ///
    /// Returns `false` if the URL already reached a terminal state, in which
    /// case the state is left untouched apart from the reservation.
    pub fn record_failure(&mut self, url: &Url) -> bool {
        self.release_reservation();

        if self.url_state(url).is_terminal() {
            return false;
        }
        self.failed.insert(url.clone());
        true
    }

    /// Returns the lifecycle state of a URL
    pub fn url_state(&self, url: &Url) -> UrlState {
        if self.succeeded.contains(url) {
            UrlState::Succeeded
        } else if self.failed.contains(url) {
            UrlState::Failed
        } else if self.seen.contains(url) {
            UrlState::Pending
        } else {
            UrlState::Unseen
        }
    }

    /// Number of URLs in a terminal state
    pub fn terminal_count(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    /// Returns true once the page budget is used up by terminal URLs
    pub fn is_budget_reached(&self, max_pages: usize) -> bool {
        self.terminal_count() >= max_pages
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn seen(&self) -> &HashSet<Url> {
        &self.seen
    }

    pub fn succeeded(&self) -> &HashSet<Url> {
        &self.succeeded
    }

    pub fn failed(&self) -> &HashSet<Url> {
        &self.failed
    }

    pub fn link_map(&self) -> &LinkMap {
        &self.link_map
    }
}
