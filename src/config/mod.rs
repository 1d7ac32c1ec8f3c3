//! Configuration module
//!
//! This module handles loading, parsing, and validating TOML configuration files,
//! and turning them into the immutable [`CrawlOptions`] a crawl run starts with.
//!
//! # Example
//!
//! ```no_run
//! use sitemap_crawler::config::{load_config, CrawlOptions};
//! use std::path::Path;
//!
//! let config = load_config(Path::new("crawler.toml")).unwrap();
//! let options = CrawlOptions::from(&config.crawler);
//! println!("Crawler will use {} workers", options.concurrency);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlOptions, CrawlerConfig, OutputConfig, UserAgentConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::{validate_options, MAX_CONCURRENCY};
