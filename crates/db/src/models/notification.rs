//! In-app notification entity model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use postpilot_core::types::{DbId, Timestamp};

/// One `notifications` row.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Notification {
    pub id: DbId,
    pub user_id: DbId,
    pub event_id: Option<DbId>,
    pub title: String,
    pub body: Option<String>,
    pub is_read: bool,
    pub read_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

/// Payload for inserting a notification from the event router.
#[derive(Debug, Clone)]
pub struct CreateNotification {
    pub user_id: DbId,
    pub event_id: Option<DbId>,
    pub title: String,
    pub body: Option<String>,
}

/// Query parameters for `GET /api/v1/notifications`.
#[derive(Debug, Deserialize)]
pub struct NotificationListQuery {
    #[serde(default)]
    pub unread_only: bool,
    /// Maximum number of results. Defaults to 50, capped at 100.
    pub limit: Option<i64>,
    /// Number of results to skip. Defaults to 0.
    pub offset: Option<i64>,
}
