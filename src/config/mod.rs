//! Configuration module for Scope-Spider
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every section is optional, so an empty file (or no file at all) yields the
//! default crawl settings.
//!
//! # Example
//!
//! ```no_run
//! use scope_spider::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("spider.toml")).unwrap();
//! println!("Checkpoint every {} links", config.crawler.checkpoint_threshold);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, FetcherConfig, LabelerConfig, NotifyConfig, ServerConfig,
    StorageConfig, DEFAULT_CHECKPOINT_THRESHOLD, DEFAULT_USER_AGENT, DEFAULT_WORKERS,
};

// Re-export parser functions
pub use parser::{load_config, load_config_or_default, parse_config};
pub use validation::validate;
