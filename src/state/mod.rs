//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `UrlState`: the lifecycle of a single URL (unseen, pending, succeeded, failed)
//! - `CrawlState`: the per-run record of seen, succeeded and failed URLs and
//!   the outbound links of every page fetched successfully

mod crawl_state;
mod url_state;

// Re-export main types
pub use crawl_state::{CrawlState, LinkMap};
pub use url_state::UrlState;
