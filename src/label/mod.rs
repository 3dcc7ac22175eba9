//! Scope label lookup
//!
//! Every stored result carries a short human-readable label for the crawled
//! site. By default the label is the scope domain. When a chat-completions
//! endpoint is configured, the model is asked which part of the seed URL names
//! the site, and its answer is used instead.

use crate::config::LabelerConfig;
use crate::crawler::CrawlJob;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

const LABEL_TIMEOUT: Duration = Duration::from_secs(30);

const SYSTEM_PROMPT: &str = "You are a helpful assistant.";

/// How the label for a crawl is chosen
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeLabeler {
    /// Use the scope domain as-is
    Domain,

    /// Ask an OpenAI-compatible chat-completions endpoint
    Chat { endpoint: String, model: String },
}

#[derive(Debug, Error)]
enum LabelError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("endpoint returned status {0}")]
    Status(u16),

    #[error("response contained no answer")]
    Empty,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f64,
    top_p: f64,
    max_tokens: usize,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    content: String,
}

impl ScopeLabeler {
    pub fn from_config(config: Option<&LabelerConfig>) -> Self {
        match config {
            Some(config) => Self::Chat {
                endpoint: config.endpoint.clone(),
                model: config.model.clone(),
            },
            None => Self::Domain,
        }
    }

    /// Returns the label for `job`, falling back to its scope domain
    pub async fn label(&self, job: &CrawlJob) -> String {
        match self {
            Self::Domain => job.scope_domain().to_string(),
            Self::Chat { endpoint, model } => {
                match request_label(endpoint, model, job.seed_url()).await {
                    Ok(label) => {
                        tracing::debug!(seed = job.seed_url(), label = %label, "Scope label resolved");
                        label
                    }
                    Err(e) => {
                        tracing::warn!(
                            seed = job.seed_url(),
                            error = %e,
                            "Scope label lookup failed, using domain"
                        );
                        job.scope_domain().to_string()
                    }
                }
            }
        }
    }
}

async fn request_label(endpoint: &str, model: &str, seed_url: &str) -> Result<String, LabelError> {
    let client = Client::builder().timeout(LABEL_TIMEOUT).build()?;

    let prompt = format!(
        "{seed_url} is the address of a website. Which part of it names the \
         organization? Answer with the short name only."
    );
    let body = ChatRequest {
        model,
        messages: vec![
            ChatMessage {
                role: "system",
                content: SYSTEM_PROMPT,
            },
            ChatMessage {
                role: "user",
                content: &prompt,
            },
        ],
        temperature: 0.7,
        top_p: 1.0,
        max_tokens: 1000,
    };

    let response = client.post(endpoint).json(&body).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(LabelError::Status(status.as_u16()));
    }

    let parsed: ChatResponse = response.json().await?;
    parsed
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content.trim().to_string())
        .filter(|label| !label.is_empty())
        .ok_or(LabelError::Empty)
}
