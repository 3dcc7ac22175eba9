//! Webhook notification sent after a crawl finishes
//!
//! The crawl core never notifies anyone itself; callers (the CLI with
//! `--notify` and the HTTP server) hand the finished report to a
//! [`WebhookNotifier`].

use crate::config::NotifyConfig;
use crate::crawler::CrawlReport;
use crate::SpiderError;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

/// Final status reported to the webhook
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CrawlStatus {
    Success,
    Cancelled,
    Error,
}

/// JSON body posted to the webhook
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrawlNotification {
    pub status: CrawlStatus,
    pub url: String,
    pub links: Vec<String>,
}

impl CrawlNotification {
    pub fn from_report(report: &CrawlReport) -> Self {
        let status = if report.cancelled {
            CrawlStatus::Cancelled
        } else {
            CrawlStatus::Success
        };
        Self {
            status,
            url: report.seed_url.clone(),
            links: report.links.clone(),
        }
    }

    /// Notification for a crawl that never produced a report
    pub fn failed(seed_url: &str) -> Self {
        Self {
            status: CrawlStatus::Error,
            url: seed_url.to_string(),
            links: Vec::new(),
        }
    }
}

/// Posts crawl notifications to one webhook URL
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    client: Client,
    webhook_url: String,
}

impl WebhookNotifier {
    pub fn new(config: &NotifyConfig) -> Result<Self, SpiderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            webhook_url: config.webhook_url.clone(),
        })
    }

    /// Sends `notification`; any non-2xx answer is an error
    pub async fn notify(&self, notification: &CrawlNotification) -> Result<(), SpiderError> {
        let response = self
            .client
            .post(&self.webhook_url)
            .json(notification)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SpiderError::Notify(format!(
                "Webhook delivery failed with status {}: {}",
                status, body
            )));
        }

        tracing::info!(
            webhook = %self.webhook_url,
            seed = %notification.url,
            links = notification.links.len(),
            "Notification delivered"
        );
        Ok(())
    }
}
