//! Report builder
//!
//! Post-crawl pass over the crawl state that maps every broken URL to the
//! pages linking to it.

use crate::state::CrawlState;
use std::collections::{BTreeMap, BTreeSet};
use url::Url;

/// Broken URL → pages whose outbound links include it
///
/// Ordered so reports and persisted results are deterministic.
pub type CrawlResult = BTreeMap<Url, BTreeSet<Url>>;

/// Builds the broken-link report from a finished crawl
///
/// For every URL in `failed`, collects each key of the link map whose link
/// set contains it. A broken URL nobody links to (the root, typically) maps
/// to an empty set.
///
/// Must run after all workers have stopped; it reads the state without any
/// coordination.
pub fn build_report(state: &CrawlState) -> CrawlResult {
    let mut result: CrawlResult = state
        .failed()
        .iter()
        .map(|url| (url.clone(), BTreeSet::new()))
        .collect();

    for (page, links) in state.link_map() {
        for link in links {
            if let Some(referrers) = result.get_mut(link) {
                referrers.insert(page.clone());
            }
        }
    }

    result
}

/// Counts the referrer entries across a report
pub fn referrer_count(result: &CrawlResult) -> usize {
    result.values().map(BTreeSet::len).sum()
}
