//! Frontier, visited set, and discovered link set
//!
//! All crawl bookkeeping lives in one [`CrawlState`] behind one mutex. Claiming
//! a URL, recording it as discovered, and pushing it onto the frontier happen in
//! a single critical section so two workers that find the same link can never
//! both enqueue it.

use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Shared handle to the crawl state used by the coordinator and every worker
pub type SharedState = Arc<Mutex<CrawlState>>;

/// Locks the shared state
///
/// Critical sections never panic midway through an update, so a poisoned lock
/// still holds consistent data and is recovered rather than propagated.
pub fn lock_state(state: &SharedState) -> MutexGuard<'_, CrawlState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Pending queue, visited set, link set, and checkpoint cursor of one crawl
#[derive(Debug, Default)]
pub struct CrawlState {
    /// URLs claimed but not yet dispatched, oldest first
    frontier: VecDeque<String>,

    /// Every URL ever claimed; a URL enters here at most once
    visited: HashSet<String>,

    /// Every in-scope URL discovered on a fetched page
    links: HashSet<String>,

    /// Size of the link set at the last checkpoint write
    checkpoint_cursor: usize,
}

impl CrawlState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps a fresh state in a shareable handle
    pub fn shared() -> SharedState {
        Arc::new(Mutex::new(Self::new()))
    }

    /// Records `url` as visited if it has not been claimed before
    ///
    /// Returns true only for the first caller; every later call for the same
    /// URL returns false.
    pub fn try_claim(&mut self, url: &str) -> bool {
        if self.visited.contains(url) {
            return false;
        }
        self.visited.insert(url.to_string())
    }

    /// Appends a claimed URL to the frontier tail
    pub fn push(&mut self, url: String) {
        self.frontier.push_back(url);
    }

    /// Claims `url` and, if the claim succeeds, enqueues it
    pub fn claim_and_push(&mut self, url: &str) -> bool {
        if self.try_claim(url) {
            self.push(url.to_string());
            true
        } else {
            false
        }
    }

    /// Takes every URL currently waiting in the frontier
    pub fn drain_available(&mut self) -> Vec<String> {
        self.frontier.drain(..).collect()
    }

    /// Merges the links found on one page
    ///
    /// Every link joins the link set; links that win their claim are also
    /// pushed onto the frontier. Returns the number of newly claimed links.
    pub fn record_links(&mut self, links: Vec<String>) -> usize {
        let mut claimed = 0;
        for link in links {
            if self.try_claim(&link) {
                self.push(link.clone());
                claimed += 1;
            }
            self.links.insert(link);
        }
        claimed
    }

    /// Number of distinct links discovered so far
    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    /// Number of URLs claimed so far (the seed included)
    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    /// Number of URLs waiting in the frontier
    pub fn frontier_len(&self) -> usize {
        self.frontier.len()
    }

    /// Returns true when at least `threshold` links arrived since the last checkpoint
    pub fn checkpoint_due(&self, threshold: usize) -> bool {
        self.links.len().saturating_sub(self.checkpoint_cursor) >= threshold
    }

    /// Moves the checkpoint cursor to `count` links
    pub fn mark_checkpoint(&mut self, count: usize) {
        self.checkpoint_cursor = count;
    }

    pub fn checkpoint_cursor(&self) -> usize {
        self.checkpoint_cursor
    }

    /// Returns the discovered links sorted ascending
    pub fn sorted_links(&self) -> Vec<String> {
        let mut links: Vec<String> = self.links.iter().cloned().collect();
        links.sort();
        links
    }
}
