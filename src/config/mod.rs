//! Configuration module
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use broken_links::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("check.toml")).unwrap();
//! println!("Checking {} to depth {}", config.crawler.root, config.crawler.max_depth);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, OutputConfig, UserAgentConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};

pub use validation::{MAX_CONCURRENCY, MAX_RETRY_DELAY_MS};
