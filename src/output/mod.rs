//! Output module for crawl results
//!
//! This module handles:
//! - The [`StatsSink`] interface workers report results to
//! - Aggregating results into crawl statistics
//! - Printing statistics and generating markdown summaries

mod markdown;
pub mod stats;
mod traits;

pub use markdown::{format_markdown_summary, generate_markdown_summary};
pub use stats::{print_statistics, CrawlStatistics, FailedPage, StatsCollector};
pub use traits::{OutputError, OutputResult, StatsSink, TracingSink, WorkResult};
