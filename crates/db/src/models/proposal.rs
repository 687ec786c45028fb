//! Monthly topic proposal entity model and DTOs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use postpilot_core::types::{DbId, Timestamp};

use crate::models::status::StatusId;

/// A row from the `proposals` table.
///
/// `token` is the URL-safe secret embedded in the shareable link; it is
/// the only credential the client ever presents.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Proposal {
    pub id: DbId,
    pub advertiser_id: DbId,
    pub token: String,
    pub month: NaiveDate,
    pub title: String,
    pub message: Option<String>,
    pub status_id: StatusId,
    pub created_by: DbId,
    pub expires_at: Timestamp,
    pub responded_at: Option<Timestamp>,
    pub client_comment: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a proposal link.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateProposal {
    pub advertiser_id: DbId,
    /// Any day within the target month; normalized to the first.
    pub month: NaiveDate,
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(max = 2000))]
    pub message: Option<String>,
    /// Days until the link expires. Defaults to 14, capped at 90.
    pub expires_in_days: Option<i64>,
}

/// One topic verdict inside a client decision submission.
#[derive(Debug, Clone, Deserialize)]
pub struct TopicDecision {
    pub topic_id: DbId,
    /// `approve` or `reject`.
    pub decision: String,
}

/// DTO for the public decision endpoint.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ProposalDecision {
    pub decisions: Vec<TopicDecision>,
    #[validate(length(max = 2000))]
    pub comment: Option<String>,
}
