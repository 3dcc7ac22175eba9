use serde::Deserialize;

/// Default number of concurrent fetch workers
pub const DEFAULT_WORKERS: usize = 8;

/// Default number of new links that triggers a checkpoint write
pub const DEFAULT_CHECKPOINT_THRESHOLD: usize = 100;

/// Desktop browser User-Agent sent with every fetch
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Main configuration structure for Scope-Spider
///
/// Every section is optional; missing sections and keys fall back to defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub fetcher: FetcherConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub notify: Option<NotifyConfig>,
    #[serde(default)]
    pub labeler: Option<LabelerConfig>,
    #[serde(default)]
    pub server: ServerConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Number of concurrent fetch workers
    pub workers: usize,

    /// Number of newly discovered links between checkpoint writes
    #[serde(rename = "checkpoint-threshold")]
    pub checkpoint_threshold: usize,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            checkpoint_threshold: DEFAULT_CHECKPOINT_THRESHOLD,
        }
    }
}

/// HTTP fetch configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetcherConfig {
    /// Connection establishment timeout (seconds)
    #[serde(rename = "connect-timeout-secs")]
    pub connect_timeout_secs: u64,

    /// Whole-request timeout (seconds)
    #[serde(rename = "total-timeout-secs")]
    pub total_timeout_secs: u64,

    /// User-Agent header value
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Skip TLS certificate verification
    ///
    /// On by default: many institutional sites serve broken certificate chains.
    #[serde(rename = "accept-invalid-certs")]
    pub accept_invalid_certs: bool,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 5,
            total_timeout_secs: 10,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept_invalid_certs: true,
        }
    }
}

/// Checkpoint storage configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: "./crawl_results.db".to_string(),
        }
    }
}

/// Webhook notification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct NotifyConfig {
    /// URL that receives the crawl result as JSON
    #[serde(rename = "webhook-url")]
    pub webhook_url: String,

    /// Request timeout (seconds)
    #[serde(rename = "timeout-secs", default = "default_notify_timeout")]
    pub timeout_secs: u64,
}

fn default_notify_timeout() -> u64 {
    10
}

/// Scope label lookup configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LabelerConfig {
    /// OpenAI-compatible chat completions endpoint
    pub endpoint: String,

    /// Model name sent with each request
    #[serde(default = "default_labeler_model")]
    pub model: String,
}

fn default_labeler_model() -> String {
    "llama3.2".to_string()
}

/// HTTP front-end configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address to listen on
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:5000".to_string(),
        }
    }
}
