//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the Scope-Spider database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- One row per seed URL; replaced on every checkpoint
CREATE TABLE IF NOT EXISTS crawl_results (
    seed_url TEXT PRIMARY KEY,
    scope_label TEXT NOT NULL,
    total_links INTEGER NOT NULL,
    updated_at TEXT NOT NULL
);

-- Discovered links of each seed
CREATE TABLE IF NOT EXISTS crawl_links (
    seed_url TEXT NOT NULL REFERENCES crawl_results(seed_url) ON DELETE CASCADE,
    url TEXT NOT NULL,
    PRIMARY KEY (seed_url, url)
);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
