use std::sync::Arc;

use postpilot_scrape::{ChannelScraper, TrendSource};

use crate::config::ServerConfig;

/// Application state handed to every Axum handler via `State<AppState>`.
///
/// Cloning is cheap: each field is an `Arc` or already `Clone`.
#[derive(Clone)]
pub struct AppState {
    /// Postgres connection pool.
    pub pool: postpilot_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Bus where domain mutations publish their platform events.
    pub event_bus: Arc<postpilot_events::EventBus>,
    /// LLM chat-completions client (content generation).
    pub llm: Arc<postpilot_llm::LlmClient>,
    /// Channel scraper for advertiser sync. Trait object so tests can
    /// inject a fake.
    pub scraper: Arc<dyn ChannelScraper>,
    /// Trending keyword source for the shared trend pool.
    pub trend_source: Arc<dyn TrendSource>,
}
