use crate::config::types::{
    Config, CrawlerConfig, FetcherConfig, LabelerConfig, NotifyConfig, ServerConfig,
    StorageConfig,
};
use crate::ConfigError;
use std::net::SocketAddr;
use url::Url;

/// Upper bound on the worker pool size
const MAX_WORKERS: usize = 256;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_fetcher_config(&config.fetcher)?;
    validate_storage_config(&config.storage)?;
    if let Some(notify) = &config.notify {
        validate_notify_config(notify)?;
    }
    if let Some(labeler) = &config.labeler {
        validate_labeler_config(labeler)?;
    }
    validate_server_config(&config.server)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.workers < 1 || config.workers > MAX_WORKERS {
        return Err(ConfigError::Validation(format!(
            "workers must be between 1 and {}, got {}",
            MAX_WORKERS, config.workers
        )));
    }

    if config.checkpoint_threshold < 1 {
        return Err(ConfigError::Validation(
            "checkpoint_threshold must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates fetcher configuration
fn validate_fetcher_config(config: &FetcherConfig) -> Result<(), ConfigError> {
    if config.connect_timeout_secs == 0 || config.total_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "fetch timeouts must be greater than zero".to_string(),
        ));
    }

    if config.connect_timeout_secs > config.total_timeout_secs {
        return Err(ConfigError::Validation(format!(
            "connect_timeout_secs ({}) cannot exceed total_timeout_secs ({})",
            config.connect_timeout_secs, config.total_timeout_secs
        )));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates storage configuration
fn validate_storage_config(config: &StorageConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_notify_config(config: &NotifyConfig) -> Result<(), ConfigError> {
    validate_http_url("webhook_url", &config.webhook_url)?;

    if config.timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "notify timeout_secs must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

fn validate_labeler_config(config: &LabelerConfig) -> Result<(), ConfigError> {
    validate_http_url("labeler endpoint", &config.endpoint)?;

    if config.model.trim().is_empty() {
        return Err(ConfigError::Validation(
            "labeler model cannot be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_server_config(config: &ServerConfig) -> Result<(), ConfigError> {
    config.bind.parse::<SocketAddr>().map_err(|e| {
        ConfigError::Validation(format!("Invalid server bind address '{}': {}", config.bind, e))
    })?;
    Ok(())
}

/// Checks that a configured URL parses and uses an HTTP(S) scheme
fn validate_http_url(field: &str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {}: {}", field, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "{} must use http or https, got '{}'",
            field,
            url.scheme()
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_workers_bounds() {
        let mut config = Config::default();
        config.crawler.workers = 0;
        assert!(validate(&config).is_err());

        config.crawler.workers = MAX_WORKERS + 1;
        assert!(validate(&config).is_err());

        config.crawler.workers = MAX_WORKERS;
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_zero_threshold_rejected() {
        let mut config = Config::default();
        config.crawler.checkpoint_threshold = 0;
        assert!(matches!(
            validate(&config),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_connect_timeout_cannot_exceed_total() {
        let mut config = Config::default();
        config.fetcher.connect_timeout_secs = 20;
        config.fetcher.total_timeout_secs = 10;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_webhook_url_must_be_http() {
        let mut config = Config::default();
        config.notify = Some(NotifyConfig {
            webhook_url: "ftp://hooks.example.com/".to_string(),
            timeout_secs: 10,
        });
        assert!(matches!(
            validate(&config),
            Err(ConfigError::InvalidUrl(_))
        ));

        config.notify = Some(NotifyConfig {
            webhook_url: "https://hooks.example.com/crawl".to_string(),
            timeout_secs: 10,
        });
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_invalid_bind_address() {
        let mut config = Config::default();
        config.server.bind = "not-an-address".to_string();
        assert!(validate(&config).is_err());
    }
}
