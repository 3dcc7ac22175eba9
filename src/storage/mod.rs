//! Storage module for persisting crawl results
//!
//! This module handles all database operations for the crawler, including:
//! - SQLite database initialization and schema management
//! - Checkpoint upserts keyed by seed URL
//! - Reading stored results back for the CLI

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStorage;
pub use traits::{CheckpointSink, StorageError, StorageResult};

use std::path::Path;

/// Initializes or opens a storage database
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
///
/// # Returns
///
/// * `Ok(SqliteStorage)` - Successfully initialized storage
/// * `Err(StorageError)` - Failed to initialize storage
pub fn open_storage(path: &Path) -> StorageResult<SqliteStorage> {
    SqliteStorage::new(path)
}

/// Stored result of one seed, including its links
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlResultRecord {
    pub seed_url: String,
    pub scope_label: String,
    pub total_links: usize,
    pub updated_at: String,
    pub links: Vec<String>,
}

/// Stored result of one seed without its links
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlResultSummary {
    pub seed_url: String,
    pub scope_label: String,
    pub total_links: usize,
    pub updated_at: String,
}
