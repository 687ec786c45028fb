//! Rows and DTOs for the durable job queue.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use postpilot_core::types::{DbId, Timestamp};

use super::status::StatusId;

/// One `jobs` row. The lifecycle timestamps fill in as the dispatcher
/// moves the row through pending, running, and a terminal status.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Job {
    pub id: DbId,
    pub job_type: String,
    pub status_id: StatusId,
    pub submitted_by: DbId,
    pub parameters: serde_json::Value,
    pub result: Option<serde_json::Value>,
    pub error_message: Option<String>,
    pub error_details: Option<serde_json::Value>,
    pub progress_percent: i16,
    pub progress_message: Option<String>,
    pub submitted_at: Timestamp,
    pub claimed_at: Option<Timestamp>,
    pub started_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
    pub retry_of_job_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Internal payload for enqueueing a job. Jobs are only created by API
/// handlers (sync trigger, bulk generation, trends refresh), never by a
/// raw submit endpoint.
#[derive(Debug, Clone)]
pub struct EnqueueJob {
    pub job_type: String,
    pub submitted_by: DbId,
    pub parameters: serde_json::Value,
}

/// Query string accepted by `GET /api/v1/jobs`.
#[derive(Debug, Deserialize)]
pub struct JobListQuery {
    /// Status filter, as a raw status id.
    pub status_id: Option<StatusId>,
    /// Job type filter (e.g. `advertiser.sync`).
    pub job_type: Option<String>,
    /// Page size; 50 when absent, capped at 100.
    pub limit: Option<i64>,
    /// Rows to skip; 0 when absent.
    pub offset: Option<i64>,
}

/// Job type name for advertiser profile sync.
pub const JOB_TYPE_SYNC: &str = "advertiser.sync";
/// Job type name for bulk content generation.
pub const JOB_TYPE_BULK_GENERATE: &str = "content.bulk_generate";
/// Job type name for the trends refresh pull.
pub const JOB_TYPE_TRENDS_REFRESH: &str = "trends.refresh";
