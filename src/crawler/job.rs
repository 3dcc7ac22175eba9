use crate::url::{strip_fragment, Scope};
use crate::UrlError;
use url::Url;

/// Immutable description of one crawl: the seed and the scope derived from it
#[derive(Debug, Clone)]
pub struct CrawlJob {
    seed: Url,
    scope: Scope,
}

impl CrawlJob {
    /// Parses a seed URL and derives its scope
    ///
    /// The seed must be an absolute HTTP(S) URL with a host. Its fragment is
    /// dropped so the seed is claimed under the same key as any link to it.
    pub fn new(seed_url: &str) -> Result<Self, UrlError> {
        let mut seed =
            Url::parse(seed_url.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

        if seed.scheme() != "http" && seed.scheme() != "https" {
            return Err(UrlError::InvalidScheme(format!(
                "Only HTTP and HTTPS schemes are supported, got: {}",
                seed.scheme()
            )));
        }

        strip_fragment(&mut seed);
        let scope = Scope::from_seed(&seed).ok_or(UrlError::MissingDomain)?;

        Ok(Self { seed, scope })
    }

    /// The canonical seed URL; also the key checkpoints are stored under
    pub fn seed_url(&self) -> &str {
        self.seed.as_str()
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn scope_domain(&self) -> &str {
        self.scope.domain()
    }

    pub fn scope_path(&self) -> &str {
        self.scope.path()
    }
}
