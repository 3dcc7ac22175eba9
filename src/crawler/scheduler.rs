//! Worker pool that drains the frontier one batch at a time
//!
//! This module handles:
//! - Global concurrency limiting via a semaphore (fixed pool size)
//! - Running one fetch per URL in a batch, outside the shared lock
//! - Merging each page's links back into the shared state under the lock
//! - Honoring cancellation while fetches are in flight

use crate::crawler::fetcher::{fetch_page, FetchErrorKind};
use crate::crawler::frontier::{lock_state, SharedState};
use crate::url::Scope;
use reqwest::Client;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use url::Url;

/// What happened to a single URL of a batch
#[derive(Debug, Clone, PartialEq, Eq)]
enum WorkerOutcome {
    /// Page fetched (any status); `claimed` new links were enqueued
    Fetched { claimed: usize },

    /// Fetch failed; the URL stays visited and is never retried
    Failed(FetchErrorKind),

    /// Crawl was cancelled before the fetch finished
    Cancelled,
}

/// Totals for one dispatched batch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// URLs dispatched in this batch
    pub dispatched: usize,

    /// URLs that produced an HTTP response
    pub fetched: usize,

    /// URLs whose fetch failed
    pub failed: usize,

    /// Failed URLs broken down by failure kind
    pub failures: HashMap<FetchErrorKind, usize>,

    /// URLs abandoned because of cancellation
    pub cancelled: usize,

    /// Links claimed and pushed onto the frontier by this batch
    pub claimed: usize,
}

impl BatchReport {
    fn record(&mut self, outcome: WorkerOutcome) {
        match outcome {
            WorkerOutcome::Fetched { claimed } => {
                self.fetched += 1;
                self.claimed += claimed;
            }
            WorkerOutcome::Failed(kind) => {
                self.failed += 1;
                *self.failures.entry(kind).or_insert(0) += 1;
            }
            WorkerOutcome::Cancelled => self.cancelled += 1,
        }
    }
}

/// Fixed-size pool of fetch workers
///
/// At most `workers` fetches run at once. Network I/O never happens while the
/// shared state is locked; the lock is taken only to merge a finished page's
/// links.
pub struct WorkerPool {
    client: Client,
    permits: Arc<Semaphore>,
    workers: usize,
}

impl WorkerPool {
    /// Creates a pool of `workers` concurrent fetchers sharing `client`
    pub fn new(client: Client, workers: usize) -> Self {
        let workers = workers.max(1);
        Self {
            client,
            permits: Arc::new(Semaphore::new(workers)),
            workers,
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Fetches every URL of `batch` and merges the results into `state`
    ///
    /// Returns once every task of the batch has finished, so when this
    /// returns no worker holds an in-flight URL.
    pub async fn run_batch(
        &self,
        batch: Vec<String>,
        scope: &Arc<Scope>,
        state: &SharedState,
        cancel: &CancellationToken,
    ) -> BatchReport {
        let mut report = BatchReport {
            dispatched: batch.len(),
            ..BatchReport::default()
        };
        let mut tasks = JoinSet::new();

        for url in batch {
            let client = self.client.clone();
            let permits = Arc::clone(&self.permits);
            let scope = Arc::clone(scope);
            let state = Arc::clone(state);
            let cancel = cancel.clone();

            tasks.spawn(async move {
                let _permit = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return WorkerOutcome::Cancelled,
                    permit = permits.acquire_owned() => match permit {
                        Ok(permit) => permit,
                        Err(_) => return WorkerOutcome::Cancelled,
                    },
                };

                process_url(&client, &url, &scope, &state, &cancel).await
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(outcome) => report.record(outcome),
                Err(e) => {
                    tracing::error!(error = %e, "Worker task failed");
                    report.record(WorkerOutcome::Failed(FetchErrorKind::Other));
                }
            }
        }

        report
    }
}

/// Fetches one URL and merges its links into the shared state
async fn process_url(
    client: &Client,
    url: &str,
    scope: &Scope,
    state: &SharedState,
    cancel: &CancellationToken,
) -> WorkerOutcome {
    let parsed = match Url::parse(url) {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::warn!(url, error = %e, "Skipping unparsable frontier entry");
            return WorkerOutcome::Failed(FetchErrorKind::Other);
        }
    };

    tracing::debug!(url, "Fetching");

    let result = tokio::select! {
        biased;
        _ = cancel.cancelled() => return WorkerOutcome::Cancelled,
        result = fetch_page(client, &parsed, scope) => result,
    };

    match result {
        Ok(page) => {
            let found = page.links.len();
            let claimed = lock_state(state).record_links(page.links);
            tracing::debug!(
                url,
                status = page.status_code,
                found,
                claimed,
                "Merged page links"
            );
            WorkerOutcome::Fetched { claimed }
        }
        Err(e) => {
            tracing::warn!(url, kind = %e.kind(), error = %e, "Fetch failed");
            WorkerOutcome::Failed(e.kind())
        }
    }
}
