//! sitemap-crawler main entry point
//!
//! This is the command-line interface for the sitemap crawler.

use anyhow::Context;
use clap::Parser;
use sitemap_crawler::config::{load_config_with_hash, validate_options, Config, CrawlOptions};
use sitemap_crawler::crawler::crawl;
use sitemap_crawler::output::{
    generate_markdown_summary, print_statistics, StatsCollector, TracingSink,
};
use sitemap_crawler::url::normalize_url;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// sitemap-crawler: a concurrent sitemap-driven site crawler
///
/// Resolves the given sitemap (flat or index), fetches every page it lists with a
/// fixed pool of workers, and follows links that stay on the same host. Each page
/// is fetched at most once. Press Ctrl-C to stop early; statistics for the pages
/// fetched so far are still printed.
#[derive(Parser, Debug)]
#[command(name = "sitemap-crawler")]
#[command(version)]
#[command(about = "A concurrent sitemap-driven site crawler", long_about = None)]
struct Cli {
    /// URL of the sitemap or sitemap index to start from
    #[arg(value_name = "SITEMAP_URL")]
    sitemap_url: String,

    /// Path to TOML configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Number of concurrent workers (overrides the config file)
    #[arg(short, long, value_name = "N")]
    concurrency: Option<usize>,

    /// Per-request timeout in seconds (overrides the config file)
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Write a markdown summary to this file (overrides the config file)
    #[arg(long, value_name = "FILE")]
    summary: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate configuration and show what would be crawled without crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let sitemap_url = normalize_url(&cli.sitemap_url)
        .with_context(|| format!("Invalid sitemap URL {:?}", cli.sitemap_url))?;

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => {
            tracing::debug!("No configuration file given, using defaults");
            Config::default()
        }
    };

    apply_overrides(&mut config, &cli);
    validate_options(&CrawlOptions::from(&config.crawler)).context("Invalid crawl options")?;

    if cli.dry_run {
        handle_dry_run(&config, &sitemap_url);
        return Ok(());
    }

    handle_crawl(config, sitemap_url).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sitemap_crawler=info,warn"),
            1 => EnvFilter::new("sitemap_crawler=debug,info"),
            2 => EnvFilter::new("sitemap_crawler=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Applies command-line flags on top of the loaded configuration
fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(concurrency) = cli.concurrency {
        config.crawler.concurrency = concurrency;
    }
    if let Some(timeout) = cli.timeout {
        config.crawler.timeout_secs = timeout;
    }
    if let Some(summary) = &cli.summary {
        config.output.summary_path = Some(summary.display().to_string());
    }
}

/// Handles the --dry-run mode: shows the effective configuration
fn handle_dry_run(config: &Config, sitemap_url: &url::Url) {
    println!("=== sitemap-crawler Dry Run ===\n");

    println!("Sitemap: {}\n", sitemap_url);

    println!("Crawler Configuration:");
    println!("  Concurrency: {}", config.crawler.concurrency);
    println!("  Timeout: {}s", config.crawler.timeout_secs);
    println!("  Frontier capacity: {}", config.crawler.frontier_capacity);
    println!(
        "  Pool queue capacity: {}",
        config.crawler.pool_queue_capacity
    );

    println!("\nUser Agent: {}", config.user_agent.header_value());

    println!("\nOutput:");
    match &config.output.summary_path {
        Some(path) => println!("  Summary: {}", path),
        None => println!("  Summary: (none)"),
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config, sitemap_url: url::Url) -> anyhow::Result<()> {
    let collector = Arc::new(StatsCollector::new());
    let sink = Arc::new(TracingSink::wrapping(collector.clone()));

    let stop = CancellationToken::new();
    {
        let stop = stop.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Interrupt received, finishing in-flight pages");
                stop.cancel();
            }
        });
    }

    let report = match crawl(&config, &sitemap_url, sink, stop).await {
        Ok(report) => report,
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            return Err(e.into());
        }
    };

    let stats = collector.snapshot();
    print_statistics(&stats);

    if let Some(path) = &config.output.summary_path {
        generate_markdown_summary(&report, &stats, Path::new(path))
            .with_context(|| format!("Failed to write summary to {}", path))?;
        println!("\n✓ Summary written to: {}", path);
    }

    Ok(())
}
