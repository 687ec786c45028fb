//! Advertiser (tenant client) entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use postpilot_core::types::{DbId, Timestamp};

use crate::models::status::StatusId;

/// A row from the `advertisers` table.
///
/// `channels` maps channel names to registered handles/URLs, e.g.
/// `{"instagram": "daily.cafe", "blog": "https://blog.example.com/dailycafe"}`.
/// `profile` is the merged scrape blob maintained by the sync job.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Advertiser {
    pub id: DbId,
    pub owner_id: DbId,
    pub name: String,
    pub business_category: Option<String>,
    pub description: Option<String>,
    pub channels: serde_json::Value,
    pub profile: serde_json::Value,
    pub sync_status_id: StatusId,
    pub last_synced_at: Option<Timestamp>,
    pub sync_error: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating an advertiser.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateAdvertiser {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(max = 50))]
    pub business_category: Option<String>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    /// Channel name → handle/URL map. Channel names are validated against
    /// the catalog in the handler.
    pub channels: Option<serde_json::Value>,
}

/// DTO for updating an advertiser. All fields are optional.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateAdvertiser {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(length(max = 50))]
    pub business_category: Option<String>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    pub channels: Option<serde_json::Value>,
}
