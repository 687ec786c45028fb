//! HTTP client for synchronous actor runs.

use std::time::Duration;

use backon::{ExponentialBuilder, Retryable};
use reqwest::{Client, StatusCode};
use thiserror::Error;
use tracing::warn;

use crate::config::ScrapeConfig;

/// Errors from the actor-run layer.
#[derive(Debug, Clone, Error)]
pub enum ScrapeError {
    #[error("network error: {0}")]
    Transport(String),
    #[error("timeout")]
    Timeout,
    #[error("http {status}: {body}")]
    Http { status: u16, body: String },
    #[error("rate limited")]
    RateLimited,
    #[error("invalid api token")]
    InvalidToken,
    #[error("json error: {0}")]
    Serde(String),
    #[error("missing api token: SCRAPE_API_TOKEN environment variable not set")]
    MissingToken,
    #[error("no channels registered")]
    NoChannels,
}

impl ScrapeError {
    /// Returns true if the error is transient and should be retried.
    pub fn should_retry(&self) -> bool {
        match self {
            Self::Transport(_) | Self::Timeout | Self::RateLimited => true,
            Self::Http { status, .. } => (500..=599).contains(status),
            _ => false,
        }
    }
}

/// Client for `POST {base}/v2/acts/{actor}/run-sync-get-dataset-items`.
///
/// The provider blocks until the actor run finishes and responds with the
/// run's dataset as a JSON array.
#[derive(Debug, Clone)]
pub struct ActorRunClient {
    http: Client,
    config: ScrapeConfig,
}

impl ActorRunClient {
    /// Actor runs block server-side; allow them a generous window.
    const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

    /// Create a new client from provider configuration.
    pub fn new(config: ScrapeConfig) -> Result<Self, ScrapeError> {
        let http = Client::builder()
            .timeout(Self::REQUEST_TIMEOUT)
            .user_agent(concat!("postpilot/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ScrapeError::Transport(e.to_string()))?;
        Ok(Self { http, config })
    }

    /// Create a new client from environment variables.
    pub fn from_env() -> Result<Self, ScrapeError> {
        Self::new(ScrapeConfig::from_env()?)
    }

    pub fn config(&self) -> &ScrapeConfig {
        &self.config
    }

    /// Run an actor synchronously and return its dataset items,
    /// retrying transient failures.
    pub async fn run_actor(
        &self,
        actor_id: &str,
        input: &serde_json::Value,
    ) -> Result<Vec<serde_json::Value>, ScrapeError> {
        (|| async { self.send_run(actor_id, input).await })
            .retry(
                &ExponentialBuilder::default()
                    .with_min_delay(Duration::from_secs(1))
                    .with_max_delay(Duration::from_secs(30))
                    .with_max_times(3)
                    .with_jitter(),
            )
            .when(|e: &ScrapeError| e.should_retry())
            .notify(|e, dur| {
                warn!(
                    actor_id,
                    "actor run failed, retrying after {:.2}s: {}",
                    dur.as_secs_f64(),
                    e
                )
            })
            .await
    }

    async fn send_run(
        &self,
        actor_id: &str,
        input: &serde_json::Value,
    ) -> Result<Vec<serde_json::Value>, ScrapeError> {
        let url = format!(
            "{}/v2/acts/{}/run-sync-get-dataset-items",
            self.config.base_url, actor_id
        );
        let res = self
            .http
            .post(&url)
            .query(&[("token", self.config.token.as_str())])
            .json(input)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        match res.status() {
            s if s.is_success() => res
                .json::<Vec<serde_json::Value>>()
                .await
                .map_err(|e| ScrapeError::Serde(e.to_string())),
            StatusCode::UNAUTHORIZED => Err(ScrapeError::InvalidToken),
            StatusCode::TOO_MANY_REQUESTS => Err(ScrapeError::RateLimited),
            s => {
                let status = s.as_u16();
                let body = res.text().await.unwrap_or_default();
                Err(ScrapeError::Http { status, body })
            }
        }
    }
}

fn map_reqwest_error(e: reqwest::Error) -> ScrapeError {
    if e.is_timeout() {
        ScrapeError::Timeout
    } else {
        ScrapeError::Transport(e.to_string())
    }
}
