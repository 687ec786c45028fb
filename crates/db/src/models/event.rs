//! Row model for the `event_types` lookup table.

use serde::Serialize;
use sqlx::FromRow;

use postpilot_core::types::{DbId, Timestamp};

/// One seeded event type; the `name` values mirror the constants in the
/// events crate.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct EventType {
    pub id: DbId,
    pub name: String,
    pub category: String,
    pub description: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
