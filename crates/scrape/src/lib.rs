//! Scraping-provider client for advertiser channel profiles.
//!
//! Talks to an Apify-compatible actor-run API. The sync job fans one
//! [`ChannelScraper`] call out per registered channel and merges whatever
//! succeeds into the advertiser's profile blob; normalizers reduce raw
//! dataset items to the canonical per-channel shape first.

mod client;
mod config;
mod normalize;
mod scraper;

pub use client::{ActorRunClient, ScrapeError};
pub use config::ScrapeConfig;
pub use normalize::normalize_items;
pub use scraper::{ApifyScraper, ChannelScraper, TrendSource, TrendingKeyword};
