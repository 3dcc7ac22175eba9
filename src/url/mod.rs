//! URL handling module for Scope-Spider
//!
//! This module canonicalizes discovered links and decides whether they fall
//! inside the crawl scope (same domain, same path prefix as the seed).

mod domain;
mod normalize;
mod scope;

// Re-export main functions
pub use domain::scope_domain;
pub use normalize::{normalize, strip_fragment};
pub use scope::Scope;
