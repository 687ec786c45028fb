//! Role lookup model.

use serde::Serialize;
use sqlx::FromRow;

use postpilot_core::types::DbId;

/// A row from the `roles` table (seeded: admin, marketer).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Role {
    pub id: DbId,
    pub name: String,
}
