use crate::url::domain::scope_domain;
use url::Url;

/// The domain and path-prefix rule that decides which links are followed
///
/// A URL is in scope when its scope domain equals [`Scope::domain`] and its
/// path starts with [`Scope::path`]. The path test is a literal string prefix,
/// not segment-aware: `/admissions2` is inside the scope of `/admissions`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope {
    domain: String,
    path: String,
}

impl Scope {
    /// Derives the scope from a seed URL
    ///
    /// Returns `None` when the seed has no host.
    pub fn from_seed(seed: &Url) -> Option<Self> {
        Some(Self {
            domain: scope_domain(seed)?,
            path: seed.path().to_string(),
        })
    }

    /// The host (without leading `www.`) every in-scope URL must have
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// The path prefix every in-scope URL must start with
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns true if the URL is inside this scope
    pub fn contains(&self, url: &Url) -> bool {
        match scope_domain(url) {
            Some(domain) => domain == self.domain && url.path().starts_with(&self.path),
            None => false,
        }
    }
}
