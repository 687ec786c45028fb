//! Scraping-provider configuration from environment variables.

use postpilot_core::channels::Channel;

use crate::client::ScrapeError;

/// Default base URL when `SCRAPE_BASE_URL` is unset.
const DEFAULT_BASE_URL: &str = "https://api.apify.com";

/// Connection settings for an Apify-compatible provider.
///
/// | Variable                 | Default                          |
/// |--------------------------|----------------------------------|
/// | `SCRAPE_API_TOKEN`       | (required)                       |
/// | `SCRAPE_BASE_URL`        | `https://api.apify.com`          |
/// | `SCRAPE_ACTOR_INSTAGRAM` | `apify~instagram-profile-scraper`|
/// | `SCRAPE_ACTOR_BLOG`      | `apify~website-content-crawler`  |
/// | `SCRAPE_ACTOR_THREADS`   | `apify~threads-scraper`          |
/// | `SCRAPE_ACTOR_YOUTUBE`   | `streamers~youtube-scraper`      |
/// | `SCRAPE_ACTOR_TRENDS`    | `emastra~google-trends-scraper`  |
#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    pub token: String,
    pub base_url: String,
    pub actor_instagram: String,
    pub actor_blog: String,
    pub actor_threads: String,
    pub actor_youtube: String,
    pub actor_trends: String,
}

impl ScrapeConfig {
    /// Load from the environment. Fails when `SCRAPE_API_TOKEN` is missing.
    pub fn from_env() -> Result<Self, ScrapeError> {
        let token = std::env::var("SCRAPE_API_TOKEN").map_err(|_| ScrapeError::MissingToken)?;
        let base_url = std::env::var("SCRAPE_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        Ok(Self {
            token,
            base_url,
            actor_instagram: env_or("SCRAPE_ACTOR_INSTAGRAM", "apify~instagram-profile-scraper"),
            actor_blog: env_or("SCRAPE_ACTOR_BLOG", "apify~website-content-crawler"),
            actor_threads: env_or("SCRAPE_ACTOR_THREADS", "apify~threads-scraper"),
            actor_youtube: env_or("SCRAPE_ACTOR_YOUTUBE", "streamers~youtube-scraper"),
            actor_trends: env_or("SCRAPE_ACTOR_TRENDS", "emastra~google-trends-scraper"),
        })
    }

    /// The actor id registered for a channel.
    pub fn actor_for(&self, channel: Channel) -> &str {
        match channel {
            Channel::Instagram => &self.actor_instagram,
            Channel::Blog => &self.actor_blog,
            Channel::Threads => &self.actor_threads,
            Channel::Youtube => &self.actor_youtube,
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
