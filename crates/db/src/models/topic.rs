//! Monthly content topic entity model and DTOs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use postpilot_core::types::{DbId, Timestamp};

use crate::models::status::StatusId;

/// A row from the `topics` table.
///
/// `month` is normalized to the first day of the month. `keywords` is a
/// JSON array of strings.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Topic {
    pub id: DbId,
    pub advertiser_id: DbId,
    pub month: NaiveDate,
    pub title: String,
    pub description: Option<String>,
    pub keywords: serde_json::Value,
    pub status_id: StatusId,
    pub position: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a topic under an advertiser.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateTopic {
    /// Any day within the target month; normalized to the first.
    pub month: NaiveDate,
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    pub keywords: Option<Vec<String>>,
    pub position: Option<i32>,
}

/// DTO for updating a topic. All fields are optional.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateTopic {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    pub keywords: Option<Vec<String>>,
    pub position: Option<i32>,
}

/// Query parameters for the topic listing under an advertiser.
#[derive(Debug, Deserialize)]
pub struct TopicListQuery {
    /// `YYYY-MM`; restricts the listing to one month.
    pub month: Option<String>,
}
