use url::Url;

/// Returns `scheme://host[:port]` for a URL
///
/// The port is only included when it is explicit and not the scheme default,
/// which matches how the `url` crate serializes the authority.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use sitemap_crawler::url::origin_prefix;
///
/// let url = Url::parse("http://example.com/a/b?c").unwrap();
/// assert_eq!(origin_prefix(&url), "http://example.com");
///
/// let url = Url::parse("http://127.0.0.1:8080/a").unwrap();
/// assert_eq!(origin_prefix(&url), "http://127.0.0.1:8080");
/// ```
pub fn origin_prefix(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    match url.port() {
        Some(port) => format!("{}://{}:{}", url.scheme(), host, port),
        None => format!("{}://{}", url.scheme(), host),
    }
}

/// Returns true if both URLs address the same host
///
/// Scoping is strict: `blog.example.com` is not the same host as `example.com`.
/// An explicit non-default port is part of the host identity; the scheme is not,
/// so `http://example.com/` and `https://example.com/` are the same host.
pub fn same_host(a: &Url, b: &Url) -> bool {
    a.host_str() == b.host_str() && a.port() == b.port()
}
