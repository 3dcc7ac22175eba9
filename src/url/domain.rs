use url::Url;

/// Extracts the scope domain from a URL
///
/// The scope domain is the lowercase host with a single leading `www.` removed.
/// An explicit non-default port is kept (`host:port`), so two services on the
/// same host but different ports are different scopes.
///
/// # Arguments
///
/// * `url` - The URL to extract the scope domain from
///
/// # Returns
///
/// * `Some(String)` - The scope domain
/// * `None` - If the URL has no host
///
/// # Examples
///
/// ```
/// use url::Url;
/// use scope_spider::url::scope_domain;
///
/// let url = Url::parse("https://www.School.edu/admissions").unwrap();
/// assert_eq!(scope_domain(&url), Some("school.edu".to_string()));
///
/// let url = Url::parse("http://127.0.0.1:8080/").unwrap();
/// assert_eq!(scope_domain(&url), Some("127.0.0.1:8080".to_string()));
/// ```
pub fn scope_domain(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_ascii_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host);

    Some(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    })
}
