//! Integration tests for sitemap resolution over HTTP

use crate::{sitemap_index, url_set};
use sitemap_crawler::config::UserAgentConfig;
use sitemap_crawler::crawler::HttpFetcher;
use sitemap_crawler::sitemap::{SitemapError, SitemapResolver};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn resolver() -> SitemapResolver {
    let fetcher = HttpFetcher::new(&UserAgentConfig::default(), Duration::from_secs(5)).unwrap();
    SitemapResolver::new(Arc::new(fetcher))
}

fn xml(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body, "application/xml")
}

fn root(server: &MockServer, name: &str) -> Url {
    Url::parse(&format!("{}/{}", server.uri(), name)).unwrap()
}

#[tokio::test]
async fn test_index_children_are_fetched_once_each() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/sitemap_index.xml"))
        .respond_with(xml(sitemap_index(&[
            format!("{}/posts.xml", base_url),
            format!("{}/pages.xml", base_url),
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/posts.xml"))
        .respond_with(xml(url_set(&[
            format!("{}/posts/1", base_url),
            format!("{}/posts/2", base_url),
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/pages.xml"))
        .respond_with(xml(url_set(&[format!("{}/about", base_url)])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let urls = resolver()
        .resolve(&root(&mock_server, "sitemap_index.xml"))
        .await
        .unwrap();

    let resolved: HashSet<String> = urls.iter().map(|u| u.to_string()).collect();
    let expected: HashSet<String> = [
        format!("{}/posts/1", base_url),
        format!("{}/posts/2", base_url),
        format!("{}/about", base_url),
    ]
    .into_iter()
    .collect();
    assert_eq!(resolved, expected);
}

#[tokio::test]
async fn test_missing_child_sitemap_is_reported() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/sitemap_index.xml"))
        .respond_with(xml(sitemap_index(&[format!("{}/missing.xml", base_url)])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/missing.xml"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let err = resolver()
        .resolve(&root(&mock_server, "sitemap_index.xml"))
        .await
        .unwrap_err();

    match err {
        SitemapError::ChildSitemap { url, source } => {
            assert_eq!(url, format!("{}/missing.xml", base_url));
            assert!(matches!(*source, SitemapError::HttpStatus { status: 404, .. }));
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[tokio::test]
async fn test_server_error_on_root() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let err = resolver()
        .resolve(&root(&mock_server, "sitemap.xml"))
        .await
        .unwrap_err();

    assert!(matches!(err, SitemapError::HttpStatus { status: 503, .. }));
}

#[tokio::test]
async fn test_malformed_xml_is_neither_format() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(xml("<urlset><url><loc>unterminated".to_string()))
        .mount(&mock_server)
        .await;

    let err = resolver()
        .resolve(&root(&mock_server, "sitemap.xml"))
        .await
        .unwrap_err();

    assert!(matches!(err, SitemapError::NeitherFormat { .. }));
}
