//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end.

use crate::url_set;
use sitemap_crawler::config::{Config, CrawlerConfig, OutputConfig, UserAgentConfig};
use sitemap_crawler::crawler::crawl;
use sitemap_crawler::output::StatsCollector;
use sitemap_crawler::sitemap::SitemapError;
use sitemap_crawler::CrawlerError;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use url::Url;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration with small queues
fn create_test_config(concurrency: usize) -> Config {
    Config {
        crawler: CrawlerConfig {
            concurrency,
            timeout_secs: 5,
            frontier_capacity: 4,
            pool_queue_capacity: 2,
        },
        user_agent: UserAgentConfig {
            crawler_name: "TestBot".to_string(),
            crawler_version: "1.0.0".to_string(),
        },
        output: OutputConfig::default(),
    }
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(
        format!("<html><body>{}</body></html>", body),
        "text/html",
    )
}

fn xml(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body, "application/xml")
}

fn sitemap_url(server: &MockServer) -> Url {
    Url::parse(&format!("{}/sitemap.xml", server.uri())).unwrap()
}

#[tokio::test]
async fn test_full_crawl_from_sitemap() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(xml(url_set(&[
            format!("{}/", base_url),
            format!("{}/page1", base_url),
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    // Every page is requested exactly once, however many pages link to it
    Mock::given(method("GET"))
        .and(path("/"))
        .and(header("user-agent", "TestBot/1.0.0"))
        .respond_with(html(&format!(
            r#"<a href="{}/page1">Page 1</a>
               <a href="/page2">Page 2</a>
               <a href="http://external.invalid/">External</a>"#,
            base_url
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/page1"))
        .respond_with(html(r#"<a href="/">Home</a><a href="/page2#section">Page 2</a>"#))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/page2"))
        .respond_with(html(r#"<a href="/page1">Page 1</a>"#))
        .expect(1)
        .mount(&mock_server)
        .await;

    let collector = Arc::new(StatsCollector::new());
    let report = timeout(
        Duration::from_secs(10),
        crawl(
            &create_test_config(3),
            &sitemap_url(&mock_server),
            collector.clone(),
            CancellationToken::new(),
        ),
    )
    .await
    .expect("crawl should terminate")
    .expect("crawl should succeed");

    assert!(!report.stopped_early);
    assert_eq!(report.seeded, 2);
    assert_eq!(report.dispatched, 3);

    let stats = collector.snapshot();
    assert_eq!(stats.total_results, 3);
    assert_eq!(stats.by_status.get(&200), Some(&3));
    assert_eq!(stats.by_content_type.get("text/html"), Some(&3));
    assert!(stats.failures.is_empty());
}

#[tokio::test]
async fn test_error_pages_are_recorded() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(xml(url_set(&[
            format!("{}/ok", base_url),
            format!("{}/gone", base_url),
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/ok"))
        .respond_with(html("<p>fine</p>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404).set_body_raw("missing", "text/plain"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let collector = Arc::new(StatsCollector::new());
    crawl(
        &create_test_config(2),
        &sitemap_url(&mock_server),
        collector.clone(),
        CancellationToken::new(),
    )
    .await
    .unwrap();

    let stats = collector.snapshot();
    assert_eq!(stats.total_results, 2);
    assert_eq!(stats.failures.len(), 1);
    assert_eq!(stats.failures[0].url, format!("{}/gone", base_url));
    assert_eq!(stats.failures[0].status_code, 404);
}

#[tokio::test]
async fn test_links_on_html_error_pages_are_followed() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(xml(url_set(&[format!("{}/missing", base_url)])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_raw(
            r#"<html><body><a href="/found">Found</a></body></html>"#,
            "text/html",
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/found"))
        .respond_with(html("<p>here</p>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let collector = Arc::new(StatsCollector::new());
    let report = crawl(
        &create_test_config(2),
        &sitemap_url(&mock_server),
        collector.clone(),
        CancellationToken::new(),
    )
    .await
    .unwrap();

    assert_eq!(report.dispatched, 2);

    let stats = collector.snapshot();
    assert_eq!(stats.total_results, 2);
    assert_eq!(stats.failures.len(), 1);
    assert_eq!(stats.failures[0].url, format!("{}/missing", base_url));
}

#[tokio::test]
async fn test_links_in_non_html_are_ignored() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(xml(url_set(&[format!("{}/notes.txt", base_url)])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/notes.txt"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(r#"<a href="/hidden">hidden</a>"#, "text/plain"),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/hidden"))
        .respond_with(html("<p>hidden</p>"))
        .expect(0) // Should never be called
        .mount(&mock_server)
        .await;

    let collector = Arc::new(StatsCollector::new());
    let report = crawl(
        &create_test_config(2),
        &sitemap_url(&mock_server),
        collector.clone(),
        CancellationToken::new(),
    )
    .await
    .unwrap();

    assert_eq!(report.dispatched, 1);
    assert_eq!(collector.total_results(), 1);
}

#[tokio::test]
async fn test_invalid_sitemap_aborts_run() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(html("<h1>This is not a sitemap</h1>"))
        .mount(&mock_server)
        .await;

    let collector = Arc::new(StatsCollector::new());
    let err = crawl(
        &create_test_config(2),
        &sitemap_url(&mock_server),
        collector.clone(),
        CancellationToken::new(),
    )
    .await
    .unwrap_err();

    assert!(matches!(
        err,
        CrawlerError::Sitemap(SitemapError::NeitherFormat { .. })
    ));
    assert!(err
        .to_string()
        .contains("is neither a sitemap index nor a sitemap"));
    assert_eq!(collector.total_results(), 0);
}

#[tokio::test]
async fn test_stop_signal_ends_crawl() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    let pages: Vec<String> = (0..40)
        .map(|i| format!("{}/page/{}", base_url, i))
        .collect();

    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(xml(url_set(&pages)))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .respond_with(html("<p>slow</p>").set_delay(Duration::from_millis(100)))
        .mount(&mock_server)
        .await;

    let stop = CancellationToken::new();
    {
        let stop = stop.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(250)).await;
            stop.cancel();
        });
    }

    let collector = Arc::new(StatsCollector::new());
    let report = timeout(
        Duration::from_secs(10),
        crawl(
            &create_test_config(2),
            &sitemap_url(&mock_server),
            collector.clone(),
            stop,
        ),
    )
    .await
    .expect("stop should end the crawl")
    .unwrap();

    assert!(report.stopped_early);
    assert!(report.dispatched < pages.len());
    assert!(collector.total_results() < pages.len() as u64);
}

#[tokio::test]
async fn test_invalid_options_are_rejected() {
    let mut config = create_test_config(1);
    config.crawler.concurrency = 0;

    let err = crawl(
        &config,
        &Url::parse("http://127.0.0.1:9/sitemap.xml").unwrap(),
        Arc::new(StatsCollector::new()),
        CancellationToken::new(),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, CrawlerError::Config(_)));
}
