//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler:
//! - Building the HTTP client (timeouts, User-Agent, TLS policy)
//! - One GET per URL, never retried
//! - Link extraction and scope filtering for successful responses
//! - Error classification

use crate::config::FetcherConfig;
use crate::crawler::parser::extract_hrefs;
use crate::url::{normalize, Scope};
use reqwest::Client;
use std::collections::HashSet;
use std::error::Error as StdError;
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Result of a completed HTTP exchange
#[derive(Debug)]
pub struct FetchedPage {
    /// HTTP status code
    pub status_code: u16,

    /// Response body; empty for non-2xx responses
    pub body: String,

    /// In-scope, fragment-free links found on the page, each listed once
    pub links: Vec<String>,
}

/// Why a fetch produced no response
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("TLS error for {url}: {message}")]
    Tls { url: String, message: String },

    #[error("Connection error for {url}: {message}")]
    Connection { url: String, message: String },

    #[error("Fetch failed for {url}: {message}")]
    Other { url: String, message: String },
}

/// Coarse failure category, used for logging and crawl statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchErrorKind {
    Timeout,
    Tls,
    Connection,
    Other,
}

impl fmt::Display for FetchErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Timeout => "timeout",
            Self::Tls => "tls",
            Self::Connection => "connection",
            Self::Other => "other",
        };
        write!(f, "{}", name)
    }
}

impl FetchError {
    /// Classifies a reqwest error
    ///
    /// TLS failures surface as connect errors, so they are detected first by
    /// walking the error's source chain.
    pub fn from_reqwest(url: &str, err: reqwest::Error) -> Self {
        let url = url.to_string();
        let message = err.to_string();

        if err.is_timeout() {
            Self::Timeout { url }
        } else if is_tls_failure(&err) {
            Self::Tls { url, message }
        } else if err.is_connect() {
            Self::Connection { url, message }
        } else {
            Self::Other { url, message }
        }
    }

    pub fn kind(&self) -> FetchErrorKind {
        match self {
            Self::Timeout { .. } => FetchErrorKind::Timeout,
            Self::Tls { .. } => FetchErrorKind::Tls,
            Self::Connection { .. } => FetchErrorKind::Connection,
            Self::Other { .. } => FetchErrorKind::Other,
        }
    }

    pub fn url(&self) -> &str {
        match self {
            Self::Timeout { url }
            | Self::Tls { url, .. }
            | Self::Connection { url, .. }
            | Self::Other { url, .. } => url,
        }
    }
}

/// Builds the HTTP client shared by every worker of a crawl
///
/// # Example
///
/// ```no_run
/// use scope_spider::config::FetcherConfig;
/// use scope_spider::crawler::build_http_client;
///
/// let client = build_http_client(&FetcherConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &FetcherConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .timeout(Duration::from_secs(config.total_timeout_secs))
        .danger_accept_invalid_certs(config.accept_invalid_certs)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches one page and extracts its in-scope links
///
/// # Outcome Table
///
/// | Condition | Result |
/// |-----------|--------|
/// | 2xx | `Ok` with the body and its in-scope links |
/// | Any other status | `Ok` with no body and no links |
/// | Timeout (connect or total) | `Err(Timeout)` |
/// | Handshake / certificate failure | `Err(Tls)` |
/// | Refused, DNS failure, reset | `Err(Connection)` |
/// | Anything else (body decode, redirect limit) | `Err(Other)` |
///
/// Relative links resolve against the requested URL, not the post-redirect one.
pub async fn fetch_page(
    client: &Client,
    url: &Url,
    scope: &Scope,
) -> Result<FetchedPage, FetchError> {
    let response = client
        .get(url.as_str())
        .send()
        .await
        .map_err(|e| FetchError::from_reqwest(url.as_str(), e))?;

    let status = response.status();
    tracing::debug!(url = %url, status = status.as_u16(), "Received response");

    if !status.is_success() {
        return Ok(FetchedPage {
            status_code: status.as_u16(),
            body: String::new(),
            links: Vec::new(),
        });
    }

    let body = response
        .text()
        .await
        .map_err(|e| FetchError::from_reqwest(url.as_str(), e))?;

    let links = extract_scoped_links(&body, url, scope);
    tracing::trace!(url = %url, links = links.len(), "Extracted in-scope links");

    Ok(FetchedPage {
        status_code: status.as_u16(),
        body,
        links,
    })
}

/// Resolves every anchor on the page and keeps the in-scope ones, first occurrence wins
pub fn extract_scoped_links(html: &str, page_url: &Url, scope: &Scope) -> Vec<String> {
    let mut seen = HashSet::new();
    extract_hrefs(html)
        .iter()
        .filter_map(|href| normalize(href, page_url, scope))
        .filter(|link| seen.insert(link.clone()))
        .collect()
}

/// Returns true if any underlying error describes a TLS failure
///
/// The top-level message is skipped since it embeds the request URL.
fn is_tls_failure(err: &reqwest::Error) -> bool {
    let mut source = err.source();
    while let Some(current) = source {
        let message = current.to_string().to_ascii_lowercase();
        if message.contains("tls")
            || message.contains("ssl")
            || message.contains("certificate")
            || message.contains("handshake")
            || message.contains("corrupt message")
        {
            return true;
        }
        source = current.source();
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn html(body: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_raw(body.to_string(), "text/html")
    }

    fn test_client() -> Client {
        build_http_client(&FetcherConfig::default()).unwrap()
    }

    #[test]
    fn test_build_http_client() {
        assert!(build_http_client(&FetcherConfig::default()).is_ok());
    }

    #[test]
    fn test_extract_scoped_links_filters_and_dedups() {
        let page = Url::parse("https://school.edu/admissions").unwrap();
        let scope = Scope::from_seed(&page).unwrap();
        let html = r##"
            <html><body>
                <a href="/admissions/apply">Apply</a>
                <a href="/admissions/apply#deadlines">Deadlines</a>
                <a href="/admissions#faq">FAQ</a>
                <a href="https://other.edu/admissions">Other</a>
                <a href="/news">News</a>
                <a href="mailto:admissions@school.edu">Mail</a>
            </body></html>
        "##;

        assert_eq!(
            extract_scoped_links(html, &page, &scope),
            vec![
                "https://school.edu/admissions/apply".to_string(),
                "https://school.edu/admissions".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_fetch_success_extracts_links() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/docs"))
            .respond_with(html(
                r#"<html><body><a href="/docs/a">A</a><a href="/blog">B</a></body></html>"#,
            ))
            .mount(&server)
            .await;

        let url = Url::parse(&format!("{}/docs", server.uri())).unwrap();
        let scope = Scope::from_seed(&url).unwrap();
        let page = fetch_page(&test_client(), &url, &scope).await.unwrap();

        assert_eq!(page.status_code, 200);
        assert!(page.body.contains("/docs/a"));
        assert_eq!(page.links, vec![format!("{}/docs/a", server.uri())]);
    }

    #[tokio::test]
    async fn test_non_success_status_yields_no_links() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/docs/missing"))
            .respond_with(
                ResponseTemplate::new(404)
                    .set_body_raw(r#"<a href="/docs/other">x</a>"#, "text/html"),
            )
            .mount(&server)
            .await;

        let url = Url::parse(&format!("{}/docs/missing", server.uri())).unwrap();
        let seed = Url::parse(&format!("{}/docs", server.uri())).unwrap();
        let scope = Scope::from_seed(&seed).unwrap();
        let page = fetch_page(&test_client(), &url, &scope).await.unwrap();

        assert_eq!(page.status_code, 404);
        assert!(page.links.is_empty());
        assert!(page.body.is_empty());
    }

    #[tokio::test]
    async fn test_sends_browser_user_agent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(header("user-agent", crate::config::DEFAULT_USER_AGENT))
            .respond_with(html("<html></html>"))
            .expect(1)
            .mount(&server)
            .await;

        let url = Url::parse(&server.uri()).unwrap();
        let scope = Scope::from_seed(&url).unwrap();
        let page = fetch_page(&test_client(), &url, &scope).await.unwrap();
        assert_eq!(page.status_code, 200);
    }

    #[tokio::test]
    async fn test_timeout_classified() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(html("<html></html>").set_delay(Duration::from_secs(3)))
            .mount(&server)
            .await;

        let config = FetcherConfig {
            connect_timeout_secs: 1,
            total_timeout_secs: 1,
            ..FetcherConfig::default()
        };
        let client = build_http_client(&config).unwrap();
        let url = Url::parse(&server.uri()).unwrap();
        let scope = Scope::from_seed(&url).unwrap();

        let err = fetch_page(&client, &url, &scope).await.unwrap_err();
        assert_eq!(err.kind(), FetchErrorKind::Timeout);
        assert_eq!(err.url(), url.as_str());
    }

    #[tokio::test]
    async fn test_connection_refused_classified() {
        // Bind then drop a listener to get a port nothing is listening on
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let url = Url::parse(&format!("http://{}/", addr)).unwrap();
        let scope = Scope::from_seed(&url).unwrap();
        let err = fetch_page(&test_client(), &url, &scope).await.unwrap_err();

        assert_eq!(err.kind(), FetchErrorKind::Connection);
    }

    #[tokio::test]
    async fn test_tls_failure_classified() {
        // An https request to a plain-HTTP server fails the handshake
        let server = MockServer::start().await;
        let url = Url::parse(&server.uri().replacen("http://", "https://", 1)).unwrap();
        let scope = Scope::from_seed(&url).unwrap();

        let err = fetch_page(&test_client(), &url, &scope).await.unwrap_err();

        assert_eq!(err.kind(), FetchErrorKind::Tls);
        assert_eq!(err.url(), url.as_str());
    }

    #[test]
    fn test_error_kind_display() {
        assert_eq!(FetchErrorKind::Timeout.to_string(), "timeout");
        assert_eq!(FetchErrorKind::Tls.to_string(), "tls");
    }
}
