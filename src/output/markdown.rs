//! Markdown summary generation
//!
//! This module generates human-readable markdown summaries of a crawl run,
//! including run information, response statistics and failing pages.

use crate::crawler::CrawlReport;
use crate::output::stats::CrawlStatistics;
use crate::output::traits::OutputResult;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Maximum number of failing pages listed in the summary
const MAX_LISTED_FAILURES: usize = 50;

/// Generates a markdown summary of a crawl run
///
/// # Arguments
///
/// * `report` - What the coordinator did during the run
/// * `stats` - Aggregated result statistics
/// * `output_path` - Path where the markdown file should be written
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote markdown summary
/// * `Err(OutputError)` - Failed to write summary
pub fn generate_markdown_summary(
    report: &CrawlReport,
    stats: &CrawlStatistics,
    output_path: &Path,
) -> OutputResult<()> {
    let markdown = format_markdown_summary(report, stats);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a crawl run as markdown
pub fn format_markdown_summary(report: &CrawlReport, stats: &CrawlStatistics) -> String {
    let mut md = String::new();

    md.push_str("# Sitemap Crawl Summary\n\n");

    // Run metadata
    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Sitemap**: {}\n", report.sitemap_url));
    md.push_str(&format!("- **Started**: {}\n", report.started_at.to_rfc3339()));
    md.push_str(&format!(
        "- **Duration**: {:.2} seconds\n",
        report.elapsed.as_secs_f64()
    ));
    md.push_str(&format!(
        "- **Status**: {}\n\n",
        if report.stopped_early {
            "stopped"
        } else {
            "completed"
        }
    ));

    // Frontier activity
    md.push_str("## Frontier\n\n");
    md.push_str(&format!("- **Seed URLs**: {}\n", report.seeded));
    md.push_str(&format!("- **Dispatched**: {}\n", report.dispatched));
    md.push_str(&format!(
        "- **Duplicates Skipped**: {}\n",
        report.duplicates_skipped
    ));
    md.push_str(&format!("- **Discarded**: {}\n\n", report.discarded));

    // Overall statistics
    md.push_str("## Overall Statistics\n\n");
    md.push_str(&format!("- **Pages Fetched**: {}\n", stats.total_results));
    md.push_str(&format!("- **Bytes Received**: {}\n", stats.total_bytes));
    md.push_str(&format!(
        "- **Success Rate**: {:.2}%\n",
        stats.success_rate()
    ));
    if let Some(mean) = stats.mean_response_time() {
        md.push_str(&format!(
            "- **Mean Response Time**: {} ms\n",
            mean.as_millis()
        ));
    }
    md.push('\n');

    // Status breakdown
    if !stats.by_status.is_empty() {
        md.push_str("## Status Codes\n\n");
        md.push_str("| Status | Count |\n");
        md.push_str("|--------|-------|\n");
        for (status, count) in &stats.by_status {
            md.push_str(&format!("| {} | {} |\n", status, count));
        }
        md.push('\n');
    }

    if !stats.by_content_type.is_empty() {
        md.push_str("## Content Types\n\n");
        md.push_str("| Content Type | Count |\n");
        md.push_str("|--------------|-------|\n");
        for (content_type, count) in &stats.by_content_type {
            md.push_str(&format!("| {} | {} |\n", content_type, count));
        }
        md.push('\n');
    }

    if !stats.by_worker.is_empty() {
        md.push_str("## Worker Load\n\n");
        md.push_str("| Worker | Pages |\n");
        md.push_str("|--------|-------|\n");
        for (worker_id, count) in &stats.by_worker {
            md.push_str(&format!("| {} | {} |\n", worker_id, count));
        }
        md.push('\n');
    }

    if !stats.failures.is_empty() {
        md.push_str("## Failed Pages\n\n");
        md.push_str("| Status | URL | Linked From |\n");
        md.push_str("|--------|-----|-------------|\n");
        for failure in stats.failures.iter().take(MAX_LISTED_FAILURES) {
            md.push_str(&format!(
                "| {} | {} | {} |\n",
                failure.status_code, failure.url, failure.parent_url
            ));
        }
        if stats.failures.len() > MAX_LISTED_FAILURES {
            md.push_str(&format!(
                "\n... and {} more\n",
                stats.failures.len() - MAX_LISTED_FAILURES
            ));
        }
        md.push('\n');
    }

    md
}
