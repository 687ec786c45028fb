//! Content draft entity model and DTOs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use postpilot_core::types::{DbId, Timestamp};

use crate::models::status::StatusId;

/// A row from the `contents` table.
///
/// `hashtags` is a JSON array of strings. `model` records which LLM
/// produced a generated draft; manual drafts leave it NULL.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Content {
    pub id: DbId,
    pub advertiser_id: DbId,
    pub topic_id: Option<DbId>,
    pub channel: String,
    pub title: String,
    pub body: String,
    pub hashtags: serde_json::Value,
    pub status_id: StatusId,
    pub scheduled_date: Option<NaiveDate>,
    pub published_at: Option<Timestamp>,
    pub created_by: DbId,
    pub model: Option<String>,
    pub generation_job_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a content draft by hand.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateContent {
    pub advertiser_id: DbId,
    pub topic_id: Option<DbId>,
    pub channel: String,
    #[validate(length(max = 200))]
    pub title: String,
    pub body: String,
    pub hashtags: Option<Vec<String>>,
    pub scheduled_date: Option<NaiveDate>,
}

/// DTO for updating a content draft. All fields are optional.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateContent {
    pub topic_id: Option<DbId>,
    #[validate(length(max = 200))]
    pub title: Option<String>,
    pub body: Option<String>,
    pub hashtags: Option<Vec<String>>,
    pub scheduled_date: Option<NaiveDate>,
}

/// DTO for the status transition endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateContentStatus {
    pub status: String,
    /// Required when moving to `scheduled` without an existing date.
    pub scheduled_date: Option<NaiveDate>,
}

/// Query parameters for `GET /api/v1/contents`.
#[derive(Debug, Deserialize)]
pub struct ContentListQuery {
    pub advertiser_id: Option<DbId>,
    pub channel: Option<String>,
    pub status_id: Option<StatusId>,
    /// `YYYY-MM`; matches rows scheduled in that month.
    pub month: Option<String>,
    /// Maximum number of results. Defaults to 50, capped at 100.
    pub limit: Option<i64>,
    /// Number of results to skip. Defaults to 0.
    pub offset: Option<i64>,
}

/// DTO for the bulk generation endpoint. Every advertiser is crossed with
/// every channel; the pair count is capped in the handler.
///
/// This struct is also serialized verbatim into the job's `parameters`
/// column, so the runner deserializes the same shape back out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkGenerationRequest {
    pub advertiser_ids: Vec<DbId>,
    pub channels: Vec<String>,
    /// Target month for topic lookup; defaults to the current month.
    pub month: Option<NaiveDate>,
    /// Pin a single topic (only valid with a single advertiser).
    pub topic_id: Option<DbId>,
    /// Template to drive every pair; falls back to the channel default.
    pub template_id: Option<DbId>,
    /// Free-form steering text appended to the prompt.
    pub prompt: Option<String>,
}

/// Row payload produced by the bulk generation runner. Inserted in
/// `draft` status with provenance (model, generating job) recorded.
#[derive(Debug, Clone)]
pub struct GeneratedContent {
    pub advertiser_id: DbId,
    pub topic_id: Option<DbId>,
    pub channel: String,
    pub title: String,
    pub body: String,
    pub hashtags: Vec<String>,
    pub created_by: DbId,
    pub model: String,
    pub generation_job_id: DbId,
}

/// Per-target failure reported in a bulk generation result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkGenerationFailure {
    pub advertiser_id: DbId,
    pub channel: String,
    pub error: String,
}

/// Aggregate result persisted on the bulk generation job.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BulkGenerationResult {
    pub created: usize,
    pub failed: Vec<BulkGenerationFailure>,
}
