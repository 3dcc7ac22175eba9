//! HTTP front-end for submitting crawls
//!
//! Routes:
//! - `GET /ok` health check
//! - `POST /scrape` with `{"url": "..."}` starts a background crawl and
//!   answers immediately; the webhook (if configured) receives the result

use crate::config::{validate, Config};
use crate::crawler::{crawl, CrawlJob};
use crate::notify::{CrawlNotification, WebhookNotifier};
use crate::SpiderError;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

/// Shared state handed to every request handler
#[derive(Clone)]
pub struct AppState {
    config: Arc<Config>,
    notifier: Option<Arc<WebhookNotifier>>,
    shutdown: CancellationToken,
    crawls: TaskTracker,
}

impl AppState {
    /// Builds the state, including the webhook notifier when one is configured
    pub fn new(config: Config, shutdown: CancellationToken) -> Result<Self, SpiderError> {
        let notifier = match &config.notify {
            Some(notify) => Some(Arc::new(WebhookNotifier::new(notify)?)),
            None => None,
        };

        Ok(Self {
            config: Arc::new(config),
            notifier,
            shutdown,
            crawls: TaskTracker::new(),
        })
    }

    /// Stops accepting crawls and waits until every running one has notified
    pub async fn wait_for_crawls(&self) {
        self.crawls.close();
        if !self.crawls.is_empty() {
            tracing::info!(running = self.crawls.len(), "Waiting for crawls to finish");
        }
        self.crawls.wait().await;
    }
}

#[derive(Debug, Deserialize)]
struct ScrapeRequest {
    url: Option<String>,
}

/// Creates the application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/ok", get(health))
        .route("/scrape", post(scrape))
        .with_state(state)
}

/// Serves the router on `config.server.bind` until `shutdown` fires
///
/// Crawls still running at shutdown are cancelled, store their partial
/// results and deliver their notifications before this returns.
pub async fn serve(config: Config, shutdown: CancellationToken) -> Result<(), SpiderError> {
    validate(&config)?;
    let bind = config.server.bind.clone();
    if config.notify.is_none() {
        tracing::warn!("No [notify] section configured; crawl results will only be stored");
    }

    let state = AppState::new(config, shutdown)?;
    let listener = TcpListener::bind(&bind).await?;
    tracing::info!(bind = %bind, "Listening");

    serve_listener(listener, state).await
}

/// Serves the router on an already bound listener
pub async fn serve_listener(listener: TcpListener, state: AppState) -> Result<(), SpiderError> {
    let shutdown = state.shutdown.clone();
    axum::serve(listener, router(state.clone()))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;

    state.wait_for_crawls().await;
    tracing::info!("Server stopped");
    Ok(())
}

async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "status": "ok" })))
}

async fn scrape(
    State(state): State<AppState>,
    payload: Result<Json<ScrapeRequest>, JsonRejection>,
) -> Response {
    let url = match payload {
        Ok(Json(ScrapeRequest { url: Some(url) })) if !url.trim().is_empty() => url,
        _ => return bad_request("URL is required"),
    };

    let job = match CrawlJob::new(&url) {
        Ok(job) => job,
        Err(e) => return bad_request(&e.to_string()),
    };

    let seed_url = job.seed_url().to_string();
    tracing::info!(seed = %seed_url, "Crawl request accepted");
    state.crawls.spawn(run_and_notify(state.clone(), seed_url));

    (
        StatusCode::OK,
        Json(json!({ "status": "processing", "message": "Request accepted" })),
    )
        .into_response()
}

fn bad_request(message: &str) -> Response {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
}

async fn run_and_notify(state: AppState, seed_url: String) {
    let notification = match crawl(&seed_url, &state.config, state.shutdown.child_token()).await {
        Ok(report) => CrawlNotification::from_report(&report),
        Err(e) => {
            tracing::error!(seed = %seed_url, error = %e, "Crawl failed");
            CrawlNotification::failed(&seed_url)
        }
    };

    if let Some(notifier) = &state.notifier {
        if let Err(e) = notifier.notify(&notification).await {
            tracing::warn!(seed = %seed_url, error = %e, "Failed to deliver notification");
        }
    }
}
