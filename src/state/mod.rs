//! State module for tracking crawl progress
//!
//! - `CrawlPhase`: the coordinator's lifecycle (idle, seeding, running, draining, done)

mod crawl_phase;

pub use crawl_phase::CrawlPhase;
