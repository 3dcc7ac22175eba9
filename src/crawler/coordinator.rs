//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the main crawl loop that coordinates all aspects of
//! the crawling process, including:
//! - Claiming the seed and walking the phase state machine
//! - Handing frontier batches to the worker pool
//! - Writing threshold and final checkpoints
//! - Honoring cancellation between batches
//! - Releasing the checkpoint sink on every exit path

use crate::config::Config;
use crate::crawler::fetcher::build_http_client;
use crate::crawler::frontier::{lock_state, CrawlState, SharedState};
use crate::crawler::job::CrawlJob;
use crate::crawler::scheduler::{BatchReport, WorkerPool};
use crate::state::CrawlPhase;
use crate::storage::CheckpointSink;
use crate::url::Scope;
use crate::SpiderError;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

/// Outcome of one crawl
#[derive(Debug, Clone)]
pub struct CrawlReport {
    /// Canonical seed URL the results are stored under
    pub seed_url: String,

    /// Label passed to the checkpoint sink
    pub scope_label: String,

    /// Every discovered in-scope link, sorted ascending
    pub links: Vec<String>,

    /// URLs that produced an HTTP response (any status)
    pub pages_fetched: usize,

    /// URLs whose single fetch attempt failed
    pub fetch_failures: usize,

    /// Scheduling iterations that dispatched at least one URL
    pub batches: usize,

    /// Checkpoint writes the sink accepted, final one included
    pub checkpoints_written: usize,

    /// True if the crawl stopped before the frontier emptied
    pub cancelled: bool,

    pub elapsed: Duration,
}

/// Main crawler coordinator structure
pub struct Coordinator {
    job: CrawlJob,
    scope: Arc<Scope>,
    scope_label: String,
    checkpoint_threshold: usize,
    pool: WorkerPool,
    state: SharedState,
    sink: Box<dyn CheckpointSink + Send>,
    phase: CrawlPhase,
    cancel: CancellationToken,
    pages_fetched: usize,
    fetch_failures: usize,
    batches: usize,
    checkpoints_written: usize,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `job` - Seed URL and the scope derived from it
    /// * `config` - The crawler configuration
    /// * `sink` - Where checkpoints are written; closed when the crawl ends
    /// * `scope_label` - Label stored alongside every checkpoint
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(SpiderError)` - HTTP client could not be built; the sink is closed
    pub fn new(
        job: CrawlJob,
        config: &Config,
        mut sink: Box<dyn CheckpointSink + Send>,
        scope_label: String,
    ) -> Result<Self, SpiderError> {
        let client = match build_http_client(&config.fetcher) {
            Ok(client) => client,
            Err(e) => {
                if let Err(close_err) = sink.close() {
                    tracing::warn!(error = %close_err, "Failed to release checkpoint sink");
                }
                return Err(e.into());
            }
        };

        Ok(Self {
            scope: Arc::new(job.scope().clone()),
            job,
            scope_label,
            checkpoint_threshold: config.crawler.checkpoint_threshold.max(1),
            pool: WorkerPool::new(client, config.crawler.workers),
            state: CrawlState::shared(),
            sink,
            phase: CrawlPhase::Idle,
            cancel: CancellationToken::new(),
            pages_fetched: 0,
            fetch_failures: 0,
            batches: 0,
            checkpoints_written: 0,
        })
    }

    /// Replaces the coordinator's cancellation token
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn phase(&self) -> CrawlPhase {
        self.phase
    }

    /// Runs the crawl to frontier exhaustion or cancellation
    ///
    /// The sink is closed whether or not the crawl succeeds.
    pub async fn run(mut self) -> Result<CrawlReport, SpiderError> {
        let result = self.drive().await;

        if let Err(e) = self.sink.close() {
            tracing::warn!(error = %e, "Failed to release checkpoint sink");
        }

        result
    }

    async fn drive(&mut self) -> Result<CrawlReport, SpiderError> {
        let start_time = Instant::now();

        self.transition(CrawlPhase::Seeding)?;
        lock_state(&self.state).claim_and_push(self.job.seed_url());
        tracing::info!(
            seed = self.job.seed_url(),
            domain = self.job.scope_domain(),
            path = self.job.scope_path(),
            workers = self.pool.workers(),
            "Starting crawl"
        );

        self.transition(CrawlPhase::Running)?;
        let cancelled = self.run_batches().await;

        self.transition(CrawlPhase::Draining)?;
        self.write_checkpoint();

        self.transition(CrawlPhase::Done)?;
        let links = lock_state(&self.state).sorted_links();

        tracing::info!(
            links = links.len(),
            pages = self.pages_fetched,
            failures = self.fetch_failures,
            batches = self.batches,
            cancelled,
            "Crawl completed in {:?}",
            start_time.elapsed()
        );

        Ok(CrawlReport {
            seed_url: self.job.seed_url().to_string(),
            scope_label: self.scope_label.clone(),
            links,
            pages_fetched: self.pages_fetched,
            fetch_failures: self.fetch_failures,
            batches: self.batches,
            checkpoints_written: self.checkpoints_written,
            cancelled,
            elapsed: start_time.elapsed(),
        })
    }

    /// Drains and dispatches batches until one comes back empty
    ///
    /// Returns true if the loop stopped because of cancellation.
    async fn run_batches(&mut self) -> bool {
        loop {
            if self.cancel.is_cancelled() {
                tracing::info!("Crawl cancelled, stopping before next batch");
                return true;
            }

            let batch = lock_state(&self.state).drain_available();
            if batch.is_empty() {
                tracing::info!("Frontier is empty, crawl complete");
                return false;
            }

            self.batches += 1;
            let report = self
                .pool
                .run_batch(batch, &self.scope, &self.state, &self.cancel)
                .await;
            self.record_batch(&report);

            let (due, links, frontier) = {
                let state = lock_state(&self.state);
                (
                    state.checkpoint_due(self.checkpoint_threshold),
                    state.link_count(),
                    state.frontier_len(),
                )
            };

            tracing::info!(
                batch = self.batches,
                dispatched = report.dispatched,
                fetched = report.fetched,
                failed = report.failed,
                links,
                frontier,
                "Progress"
            );

            if due {
                self.write_checkpoint();
            }

            if report.cancelled > 0 {
                tracing::info!(abandoned = report.cancelled, "Crawl cancelled mid-batch");
                return true;
            }
        }
    }

    fn record_batch(&mut self, report: &BatchReport) {
        self.pages_fetched += report.fetched;
        self.fetch_failures += report.failed;
        for (kind, count) in &report.failures {
            tracing::debug!(batch = self.batches, %kind, count, "Fetch failures");
        }
    }

    /// Persists a full snapshot of the link set
    ///
    /// A failed write is logged and the crawl goes on. The cursor moves either
    /// way so a broken sink is not retried after every batch.
    fn write_checkpoint(&mut self) {
        let links = lock_state(&self.state).sorted_links();
        let count = links.len();

        match self
            .sink
            .persist(self.job.seed_url(), &self.scope_label, &links)
        {
            Ok(()) => {
                self.checkpoints_written += 1;
                tracing::info!(links = count, phase = %self.phase, "Checkpoint written");
            }
            Err(e) => {
                tracing::warn!(links = count, error = %e, "Checkpoint write failed");
            }
        }

        lock_state(&self.state).mark_checkpoint(count);
    }

    fn transition(&mut self, to: CrawlPhase) -> Result<(), SpiderError> {
        if !self.phase.can_transition_to(to) {
            return Err(SpiderError::InvalidTransition {
                from: self.phase,
                to,
            });
        }
        tracing::debug!(from = %self.phase, %to, "Phase transition");
        self.phase = to;
        Ok(())
    }
}
