use crate::UrlError;
use url::Url;

/// Parses and normalizes a crawlable URL
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject if malformed
/// 2. Require an HTTP or HTTPS scheme
/// 3. Require a host
/// 4. Remove the fragment (everything after #)
///
/// Host lowercasing and empty-path handling are done by the `url` parser itself.
///
/// # Arguments
///
/// * `url_str` - The URL string to normalize
///
/// # Returns
///
/// * `Ok(Url)` - Normalized URL
/// * `Err(UrlError)` - Failed to parse or normalize the URL
///
/// # Examples
///
/// ```
/// use sitemap_crawler::url::normalize_url;
///
/// let url = normalize_url("http://EXAMPLE.COM/page#top").unwrap();
/// assert_eq!(url.as_str(), "http://example.com/page");
/// ```
pub fn normalize_url(url_str: &str) -> Result<Url, UrlError> {
    let mut url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingHost);
    }

    url.set_fragment(None);

    Ok(url)
}

/// Returns the dedup identity of a URL
///
/// Two URLs with the same canonical key are the same page for crawling purposes:
/// scheme, host, port, path and query are kept, the fragment is dropped.
pub fn canonical_key(url: &Url) -> String {
    if url.fragment().is_none() {
        return url.as_str().to_string();
    }

    let mut stripped = url.clone();
    stripped.set_fragment(None);
    stripped.into()
}
