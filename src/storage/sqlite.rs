//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the CheckpointSink trait.

use crate::storage::schema::initialize_schema;
use crate::storage::traits::{CheckpointSink, StorageError, StorageResult};
use crate::storage::{CrawlResultRecord, CrawlResultSummary};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

/// SQLite storage backend
///
/// The connection is released by [`CheckpointSink::close`]; any call after
/// that fails with [`StorageError::Closed`].
pub struct SqliteStorage {
    conn: Option<Connection>,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn new(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;

        // Configure SQLite for better performance
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn: Some(conn) })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn: Some(conn) })
    }

    fn conn(&self) -> StorageResult<&Connection> {
        self.conn.as_ref().ok_or(StorageError::Closed)
    }

    /// Loads the stored result of one seed, links sorted ascending
    pub fn load_result(&self, seed_url: &str) -> StorageResult<Option<CrawlResultRecord>> {
        let conn = self.conn()?;

        let summary = conn
            .query_row(
                "SELECT seed_url, scope_label, total_links, updated_at
                 FROM crawl_results WHERE seed_url = ?1",
                params![seed_url],
                summary_from_row,
            )
            .optional()?;

        let Some(summary) = summary else {
            return Ok(None);
        };

        let mut stmt =
            conn.prepare("SELECT url FROM crawl_links WHERE seed_url = ?1 ORDER BY url")?;
        let links = stmt
            .query_map(params![seed_url], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Some(CrawlResultRecord {
            seed_url: summary.seed_url,
            scope_label: summary.scope_label,
            total_links: summary.total_links,
            updated_at: summary.updated_at,
            links,
        }))
    }

    /// Lists every stored result, most recently updated first
    pub fn list_results(&self) -> StorageResult<Vec<CrawlResultSummary>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT seed_url, scope_label, total_links, updated_at
             FROM crawl_results ORDER BY updated_at DESC, seed_url",
        )?;

        let results = stmt
            .query_map([], summary_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(results)
    }
}

impl CheckpointSink for SqliteStorage {
    fn persist(
        &mut self,
        seed_url: &str,
        scope_label: &str,
        links: &[String],
    ) -> StorageResult<()> {
        let conn = self.conn.as_mut().ok_or(StorageError::Closed)?;
        let now = Utc::now().to_rfc3339();

        let tx = conn.transaction()?;
        tx.execute(
            "INSERT INTO crawl_results (seed_url, scope_label, total_links, updated_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(seed_url) DO UPDATE SET
                scope_label = excluded.scope_label,
                total_links = excluded.total_links,
                updated_at = excluded.updated_at",
            params![seed_url, scope_label, links.len() as i64, now],
        )?;
        tx.execute(
            "DELETE FROM crawl_links WHERE seed_url = ?1",
            params![seed_url],
        )?;
        {
            let mut stmt =
                tx.prepare("INSERT OR IGNORE INTO crawl_links (seed_url, url) VALUES (?1, ?2)")?;
            for link in links {
                stmt.execute(params![seed_url, link])?;
            }
        }
        tx.commit()?;

        tracing::debug!(seed_url, links = links.len(), "Checkpoint stored");
        Ok(())
    }

    fn close(&mut self) -> StorageResult<()> {
        if let Some(conn) = self.conn.take() {
            conn.close().map_err(|(_, e)| StorageError::Sqlite(e))?;
        }
        Ok(())
    }
}

fn summary_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<CrawlResultSummary> {
    Ok(CrawlResultSummary {
        seed_url: row.get(0)?,
        scope_label: row.get(1)?,
        total_links: row.get::<_, i64>(2)? as usize,
        updated_at: row.get(3)?,
    })
}
