//! Crawler module for scope-limited link discovery
//!
//! This module contains the core crawling logic, including:
//! - Seed parsing and scope derivation
//! - The shared frontier, visited set, and link set
//! - HTTP fetching and anchor extraction
//! - Batch dispatch over a fixed worker pool
//! - Overall crawl coordination and checkpointing

mod coordinator;
mod fetcher;
mod frontier;
mod job;
mod parser;
mod scheduler;

pub use coordinator::{Coordinator, CrawlReport};
pub use fetcher::{
    build_http_client, extract_scoped_links, fetch_page, FetchError, FetchErrorKind, FetchedPage,
};
pub use frontier::{lock_state, CrawlState, SharedState};
pub use job::CrawlJob;
pub use parser::extract_hrefs;
pub use scheduler::{BatchReport, WorkerPool};

use crate::config::Config;
use crate::label::ScopeLabeler;
use crate::storage::SqliteStorage;
use crate::SpiderError;
use std::path::Path;
use tokio_util::sync::CancellationToken;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Parse the seed and derive its scope
/// 2. Look up the scope label, falling back to the domain if `cancel` fires
/// 3. Open the SQLite result store
/// 4. Crawl until the frontier empties or `cancel` fires
/// 5. Write the final checkpoint and close the store
///
/// # Arguments
///
/// * `seed_url` - Absolute HTTP(S) URL to start from
/// * `config` - The crawler configuration
/// * `cancel` - Stops the crawl early; the partial result is still stored
///
/// # Returns
///
/// * `Ok(CrawlReport)` - Crawl finished; per-URL failures never surface here
/// * `Err(SpiderError)` - Invalid seed, or the store could not be opened
pub async fn crawl(
    seed_url: &str,
    config: &Config,
    cancel: CancellationToken,
) -> Result<CrawlReport, SpiderError> {
    let job = CrawlJob::new(seed_url)?;

    // A cancelled crawl skips the lookup and still stores its result
    let labeler = ScopeLabeler::from_config(config.labeler.as_ref());
    let scope_label = tokio::select! {
        biased;
        _ = cancel.cancelled() => job.scope_domain().to_string(),
        label = labeler.label(&job) => label,
    };

    let storage = SqliteStorage::new(Path::new(&config.storage.database_path))?;

    Coordinator::new(job, config, Box::new(storage), scope_label)?
        .with_cancellation(cancel)
        .run()
        .await
}
