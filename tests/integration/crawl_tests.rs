//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end.

use scope_spider::config::Config;
use scope_spider::crawler::{crawl, Coordinator, CrawlJob};
use scope_spider::storage::{open_storage, CheckpointSink, StorageResult};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration storing results at `db_path`
fn create_test_config(db_path: &Path) -> Config {
    let mut config = Config::default();
    config.storage.database_path = db_path.display().to_string();
    config.fetcher.connect_timeout_secs = 2;
    config.fetcher.total_timeout_secs = 5;
    config
}

fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body, "text/html")
}

async fn mount_page(server: &MockServer, page: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(page))
        .respond_with(html(body))
        .mount(server)
        .await;
}

/// Checkpoint sink that remembers the size of every snapshot
#[derive(Clone, Default)]
struct RecordingSink {
    counts: Arc<Mutex<Vec<usize>>>,
}

impl CheckpointSink for RecordingSink {
    fn persist(&mut self, _seed_url: &str, _scope_label: &str, links: &[String]) -> StorageResult<()> {
        let mut sorted = links.to_vec();
        sorted.sort();
        assert_eq!(sorted, links, "snapshot must be sorted");
        self.counts.lock().unwrap().push(links.len());
        Ok(())
    }
}

#[tokio::test]
async fn test_admissions_scenario() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/admissions",
        r##"<html><body>
            <a href="/admissions/apply">Apply</a>
            <a href="/admissions#faq">FAQ</a>
            <a href="https://other.edu/admissions">Elsewhere</a>
            <a href="/news">News</a>
        </body></html>"##
            .to_string(),
    )
    .await;
    mount_page(
        &mock_server,
        "/admissions/apply",
        "<html><body>No links here</body></html>".to_string(),
    )
    .await;

    let dir = tempfile::tempdir().unwrap();
    let config = create_test_config(&dir.path().join("results.db"));
    let seed = format!("{}/admissions", base_url);

    let report = crawl(&seed, &config, CancellationToken::new())
        .await
        .expect("Crawl failed");

    let expected = vec![
        format!("{}/admissions", base_url),
        format!("{}/admissions/apply", base_url),
    ];
    assert_eq!(report.links, expected);
    assert!(!report.cancelled);
    assert_eq!(report.fetch_failures, 0);

    // The final checkpoint must match the returned result
    let storage = open_storage(&dir.path().join("results.db")).unwrap();
    let record = storage.load_result(&seed).unwrap().expect("result stored");
    assert_eq!(record.links, expected);
    assert_eq!(record.total_links, 2);
    assert_eq!(record.scope_label, report.scope_label);
    assert!(record.scope_label.starts_with("127.0.0.1:"));
}

#[tokio::test]
async fn test_cyclic_site_terminates_and_rerun_is_stable() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(&mock_server, "/docs/", r#"<a href="/docs/a">A</a>"#.to_string()).await;
    mount_page(
        &mock_server,
        "/docs/a",
        r#"<a href="/docs/b">B</a><a href="/docs/a">Self</a>"#.to_string(),
    )
    .await;
    mount_page(&mock_server, "/docs/b", r#"<a href="/docs/c">C</a>"#.to_string()).await;
    mount_page(
        &mock_server,
        "/docs/c",
        format!(
            r#"<a href="{}/docs/a">A</a><a href="/docs/">Index</a><a href="/">Home</a>"#,
            base_url
        ),
    )
    .await;

    let dir = tempfile::tempdir().unwrap();
    let config = create_test_config(&dir.path().join("results.db"));
    let seed = format!("{}/docs/", base_url);

    let first = crawl(&seed, &config, CancellationToken::new()).await.unwrap();
    let second = crawl(&seed, &config, CancellationToken::new()).await.unwrap();

    let expected = vec![
        format!("{}/docs/", base_url),
        format!("{}/docs/a", base_url),
        format!("{}/docs/b", base_url),
        format!("{}/docs/c", base_url),
    ];
    assert_eq!(first.links, expected);
    assert_eq!(second.links, expected);
    assert_eq!(first.pages_fetched, 4);

    // Two crawls of the same seed leave a single stored result
    let storage = open_storage(&dir.path().join("results.db")).unwrap();
    let results = storage.list_results().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].total_links, 4);
}

#[tokio::test]
async fn test_fragment_variants_fetched_once() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        r##"<a href="/x#section1">One</a><a href="/x#section2">Two</a><a href="/x">Plain</a>"##
            .to_string(),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/x"))
        .respond_with(html("<html></html>".to_string()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = create_test_config(&dir.path().join("results.db"));

    let report = crawl(&base_url, &config, CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(report.links, vec![format!("{}/x", base_url)]);
}

#[tokio::test]
async fn test_checkpoint_cadence() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    // Seed links to hub 0; each hub links to the next hub and to 25 leaves.
    // Leaves are not mounted and answer 404.
    mount_page(&mock_server, "/s/", r#"<a href="/s/h0">start</a>"#.to_string()).await;
    for hub in 0..10 {
        let mut body = String::new();
        if hub < 9 {
            body.push_str(&format!(r#"<a href="/s/h{}">next</a>"#, hub + 1));
        }
        for leaf in 0..25 {
            body.push_str(&format!(r#"<a href="/s/h{}/l{}">leaf</a>"#, hub, leaf));
        }
        mount_page(&mock_server, &format!("/s/h{}", hub), body).await;
    }

    let sink = RecordingSink::default();
    let counts = Arc::clone(&sink.counts);
    let job = CrawlJob::new(&format!("{}/s/", base_url)).unwrap();
    let config = Config::default();

    let report = Coordinator::new(job, &config, Box::new(sink), "cadence".to_string())
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(report.links.len(), 260);

    let counts = counts.lock().unwrap().clone();
    assert!(counts.len() >= 3, "expected at least 3 checkpoints, got {:?}", counts);
    assert!(counts.windows(2).all(|w| w[0] <= w[1]), "counts not monotonic: {:?}", counts);
    assert_eq!(counts.last(), Some(&260));
    assert!(counts[..counts.len() - 1].iter().all(|&c| c >= 100 && c < 260));
    assert_eq!(report.checkpoints_written, counts.len());
}

#[tokio::test]
async fn test_cancellation_keeps_partial_result() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/docs",
        r#"<a href="/docs/slow">Slow</a>"#.to_string(),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/docs/slow"))
        .respond_with(
            html(r#"<a href="/docs/never">Never</a>"#.to_string())
                .set_delay(Duration::from_secs(4)),
        )
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = create_test_config(&dir.path().join("results.db"));
    let seed = format!("{}/docs", base_url);

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(500)).await;
        trigger.cancel();
    });

    let started = std::time::Instant::now();
    let report = crawl(&seed, &config, cancel).await.unwrap();

    assert!(report.cancelled);
    assert!(started.elapsed() < Duration::from_secs(4));
    assert_eq!(report.links, vec![format!("{}/docs/slow", base_url)]);

    let storage = open_storage(&dir.path().join("results.db")).unwrap();
    let record = storage.load_result(&seed).unwrap().expect("partial result stored");
    assert_eq!(record.links, report.links);
}

#[tokio::test]
async fn test_invalid_seed_is_rejected_before_storage() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("results.db");
    let config = create_test_config(&db_path);

    let result = crawl("mailto:admissions@school.edu", &config, CancellationToken::new()).await;

    assert!(matches!(result, Err(scope_spider::SpiderError::UrlError(_))));
    assert!(!db_path.exists());
}
