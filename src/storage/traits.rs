//! Storage traits and error types
//!
//! This module defines the checkpoint interface the crawler writes through
//! and the error type shared by storage backends.

use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage connection already closed")]
    Closed,
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Destination for periodic snapshots of a crawl's discovered links
///
/// The crawler calls [`CheckpointSink::persist`] with the *entire* current
/// link set every time enough new links accumulate, and once more when the
/// crawl ends. Implementations must upsert keyed by `seed_url` so repeated
/// calls for the same seed replace the previous snapshot.
pub trait CheckpointSink {
    /// Stores a full snapshot of the links discovered from `seed_url`
    ///
    /// # Arguments
    ///
    /// * `seed_url` - Canonical seed URL; the upsert key
    /// * `scope_label` - Human-readable name of the crawled site
    /// * `links` - Every discovered link, sorted ascending
    fn persist(&mut self, seed_url: &str, scope_label: &str, links: &[String])
        -> StorageResult<()>;

    /// Releases any resource held for the crawl
    ///
    /// Called once on every exit path of a crawl. The default does nothing.
    fn close(&mut self) -> StorageResult<()> {
        Ok(())
    }
}
