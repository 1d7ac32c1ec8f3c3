//! Integration tests
//!
//! End-to-end tests running the HTTP fetcher against wiremock servers.

mod crawl_tests;
mod sitemap_tests;

/// Builds a flat sitemap listing `locs`
pub fn url_set(locs: &[String]) -> String {
    let entries: String = locs
        .iter()
        .map(|loc| format!("<url><loc>{}</loc></url>", loc))
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">{}</urlset>"#,
        entries
    )
}

/// Builds a sitemap index listing `locs`
pub fn sitemap_index(locs: &[String]) -> String {
    let entries: String = locs
        .iter()
        .map(|loc| format!("<sitemap><loc>{}</loc></sitemap>", loc))
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<sitemapindex xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">{}</sitemapindex>"#,
        entries
    )
}
