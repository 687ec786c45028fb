//! The per-channel scraping seam.

use async_trait::async_trait;
use serde_json::{json, Value};

use postpilot_core::channels::Channel;

use crate::client::{ActorRunClient, ScrapeError};
use crate::normalize::normalize_items;

/// Scrapes one channel of one advertiser into a canonical profile
/// fragment. The job runner depends on this trait so tests can inject
/// fakes instead of hitting the provider.
#[async_trait]
pub trait ChannelScraper: Send + Sync {
    /// Scrape `handle` (username or URL, as registered on the
    /// advertiser) on the given channel.
    async fn scrape(&self, channel: Channel, handle: &str) -> Result<Value, ScrapeError>;
}

/// Production scraper backed by Apify-compatible actor runs.
#[derive(Debug, Clone)]
pub struct ApifyScraper {
    client: ActorRunClient,
}

impl ApifyScraper {
    pub fn new(client: ActorRunClient) -> Self {
        Self { client }
    }

    pub fn from_env() -> Result<Self, ScrapeError> {
        Ok(Self::new(ActorRunClient::from_env()?))
    }

    /// Actor input for a channel. Each actor family has its own input
    /// schema; these are the minimal single-target forms.
    fn actor_input(channel: Channel, handle: &str) -> Value {
        match channel {
            Channel::Instagram => json!({ "usernames": [handle] }),
            Channel::Blog => json!({
                "startUrls": [{ "url": handle }],
                "maxCrawlPages": 20,
            }),
            Channel::Threads => json!({ "usernames": [handle] }),
            Channel::Youtube => json!({
                "startUrls": [{ "url": handle }],
                "maxResults": 20,
            }),
        }
    }
}

#[async_trait]
impl ChannelScraper for ApifyScraper {
    async fn scrape(&self, channel: Channel, handle: &str) -> Result<Value, ScrapeError> {
        let actor_id = self.client.config().actor_for(channel).to_string();
        let input = Self::actor_input(channel, handle);

        tracing::debug!(channel = channel.as_str(), actor_id, "starting actor run");
        let items = self.client.run_actor(&actor_id, &input).await?;
        tracing::debug!(
            channel = channel.as_str(),
            items = items.len(),
            "actor run finished"
        );

        let mut fragment = normalize_items(channel, &items);
        // Record what we scraped so the fragment is self-describing.
        if let Some(map) = fragment.as_object_mut() {
            map.entry("handle".to_string())
                .or_insert_with(|| json!(handle));
        }
        Ok(fragment)
    }
}

/// One trending keyword from a trend actor run.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendingKeyword {
    pub keyword: String,
    pub category: Option<String>,
    pub rank: Option<i32>,
}

/// Source of trending keywords for the shared trend pool. Separate from
/// [`ChannelScraper`] because it is not tied to any advertiser.
#[async_trait]
pub trait TrendSource: Send + Sync {
    /// Short provider name stored in the `source` column.
    fn source_name(&self) -> &'static str;

    async fn trending_keywords(&self) -> Result<Vec<TrendingKeyword>, ScrapeError>;
}

#[async_trait]
impl TrendSource for ApifyScraper {
    fn source_name(&self) -> &'static str {
        "google_trends"
    }

    async fn trending_keywords(&self) -> Result<Vec<TrendingKeyword>, ScrapeError> {
        let actor_id = self.client.config().actor_trends.clone();
        let input = json!({ "geo": "KR", "timeRange": "now 1-d" });

        tracing::debug!(actor_id, "starting trend actor run");
        let items = self.client.run_actor(&actor_id, &input).await?;
        tracing::debug!(items = items.len(), "trend actor run finished");

        Ok(extract_trending(&items))
    }
}

/// Pull keyword/category/rank out of trend actor items, tolerating the
/// field spellings the known actors use. Rows without a keyword are
/// dropped; missing ranks fall back to item order.
fn extract_trending(items: &[Value]) -> Vec<TrendingKeyword> {
    items
        .iter()
        .enumerate()
        .filter_map(|(idx, item)| {
            let keyword = ["keyword", "query", "searchTerm", "title"]
                .iter()
                .find_map(|k| item.get(*k).and_then(Value::as_str))
                .map(str::trim)
                .filter(|s| !s.is_empty())?;
            let category = item
                .get("category")
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(String::from);
            let rank = ["rank", "position"]
                .iter()
                .find_map(|k| item.get(*k).and_then(Value::as_i64))
                .unwrap_or(idx as i64 + 1);
            Some(TrendingKeyword {
                keyword: keyword.to_string(),
                category,
                rank: Some(rank as i32),
            })
        })
        .collect()
}
