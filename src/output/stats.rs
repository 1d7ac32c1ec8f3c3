//! Crawl statistics aggregation
//!
//! This module provides the default [`StatsSink`]: an in-memory collector that
//! aggregates result records, plus functions for displaying the aggregate.

use crate::output::traits::{StatsSink, WorkResult};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

/// A result whose status was not 2xx
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedPage {
    pub url: String,
    pub parent_url: String,
    pub status_code: u16,
}

/// Crawl statistics summary
#[derive(Debug, Clone, Default)]
pub struct CrawlStatistics {
    /// Number of result records received
    pub total_results: u64,

    /// Sum of response sizes
    pub total_bytes: u64,

    /// Count of results by HTTP status code
    pub by_status: BTreeMap<u16, u64>,

    /// Count of results by MIME type (parameters stripped)
    pub by_content_type: BTreeMap<String, u64>,

    /// Count of results by worker id
    pub by_worker: BTreeMap<usize, u64>,

    /// Fastest fetch
    pub min_response_time: Option<Duration>,

    /// Slowest fetch
    pub max_response_time: Option<Duration>,

    /// Sum of all fetch durations
    pub total_response_time: Duration,

    /// Earliest fetch start
    pub first_start: Option<DateTime<Utc>>,

    /// Latest fetch end
    pub last_end: Option<DateTime<Utc>>,

    /// Results with a non-2xx status
    pub failures: Vec<FailedPage>,
}

impl CrawlStatistics {
    /// Folds one result into the aggregate
    pub fn add(&mut self, result: &WorkResult) {
        let duration = result.duration();

        self.total_results += 1;
        self.total_bytes += result.response_size;
        *self.by_status.entry(result.status_code).or_insert(0) += 1;
        *self
            .by_content_type
            .entry(mime_type(&result.content_type))
            .or_insert(0) += 1;
        *self.by_worker.entry(result.worker_id).or_insert(0) += 1;

        self.min_response_time = Some(self.min_response_time.map_or(duration, |d| d.min(duration)));
        self.max_response_time = Some(self.max_response_time.map_or(duration, |d| d.max(duration)));
        self.total_response_time += duration;

        self.first_start = Some(
            self.first_start
                .map_or(result.start_time, |t| t.min(result.start_time)),
        );
        self.last_end = Some(self.last_end.map_or(result.end_time, |t| t.max(result.end_time)));

        if !result.is_success() {
            self.failures.push(FailedPage {
                url: result.url.to_string(),
                parent_url: result.parent_url.to_string(),
                status_code: result.status_code,
            });
        }
    }

    /// Returns the number of 2xx results
    pub fn success_count(&self) -> u64 {
        self.by_status
            .iter()
            .filter(|(status, _)| (200..300).contains(*status))
            .map(|(_, count)| count)
            .sum()
    }

    /// Returns the success rate as a percentage
    pub fn success_rate(&self) -> f64 {
        if self.total_results == 0 {
            return 0.0;
        }
        (self.success_count() as f64 / self.total_results as f64) * 100.0
    }

    /// Returns the mean fetch duration
    pub fn mean_response_time(&self) -> Option<Duration> {
        if self.total_results == 0 {
            return None;
        }
        let count = u32::try_from(self.total_results).unwrap_or(u32::MAX);
        Some(self.total_response_time / count)
    }

    /// Returns the wall-clock span from the first fetch start to the last fetch end
    pub fn wall_time(&self) -> Option<Duration> {
        match (self.first_start, self.last_end) {
            (Some(start), Some(end)) => (end - start).to_std().ok(),
            _ => None,
        }
    }
}

/// Thread-safe [`StatsSink`] that aggregates results in memory
#[derive(Debug, Default)]
pub struct StatsCollector {
    stats: Mutex<CrawlStatistics>,
}

impl StatsCollector {
    /// Creates an empty collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the current aggregate
    pub fn snapshot(&self) -> CrawlStatistics {
        self.lock().clone()
    }

    /// Returns the number of results recorded so far
    pub fn total_results(&self) -> u64 {
        self.lock().total_results
    }

    fn lock(&self) -> MutexGuard<'_, CrawlStatistics> {
        self.stats
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl StatsSink for StatsCollector {
    fn record(&self, result: WorkResult) {
        self.lock().add(&result);
    }
}

/// Strips parameters from a Content-Type value
fn mime_type(content_type: &str) -> String {
    let mime = content_type.split(';').next().unwrap_or_default().trim();
    if mime.is_empty() {
        "(none)".to_string()
    } else {
        mime.to_ascii_lowercase()
    }
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Overview:");
    println!("  Pages fetched: {}", stats.total_results);
    println!("  Bytes received: {}", stats.total_bytes);
    if let Some(wall) = stats.wall_time() {
        println!("  Wall time: {:.2}s", wall.as_secs_f64());
    }
    println!();

    if let (Some(min), Some(mean), Some(max)) = (
        stats.min_response_time,
        stats.mean_response_time(),
        stats.max_response_time,
    ) {
        println!("Response Times:");
        println!("  min {:?} / mean {:?} / max {:?}", min, mean, max);
        println!();
    }

    println!("Pages by Status:");
    for (status, count) in &stats.by_status {
        let percentage = (*count as f64 / stats.total_results as f64) * 100.0;
        println!("  {}: {} ({:.1}%)", status, count, percentage);
    }
    println!();

    println!("Pages by Content Type:");
    // Sort by count (descending)
    let mut type_counts: Vec<_> = stats.by_content_type.iter().collect();
    type_counts.sort_by(|a, b| b.1.cmp(a.1));
    for (content_type, count) in type_counts {
        println!("  {}: {}", content_type, count);
    }
    println!();

    if !stats.failures.is_empty() {
        println!("Failed Pages ({}):", stats.failures.len());
        for failure in &stats.failures {
            println!(
                "  - {} {} (linked from {})",
                failure.status_code, failure.url, failure.parent_url
            );
        }
        println!();
    }

    println!(
        "Success Rate: {:.1}% ({} / {} pages)",
        stats.success_rate(),
        stats.success_count(),
        stats.total_results
    );
}
