//! URL handling module
//!
//! This module provides URL normalization for crawl bookkeeping and the
//! same-site test that decides which discovered links are followed.

mod normalize;
mod site;

// Re-export main functions
pub use normalize::{normalize_parsed, normalize_url};
pub use site::{is_same_site, site_key};
