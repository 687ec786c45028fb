//! Prompt template entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use postpilot_core::types::{DbId, Timestamp};

/// One `templates` row.
///
/// Built-in templates have `owner_id = NULL` and are visible to every
/// marketer; only admins may edit or delete them.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Template {
    pub id: DbId,
    pub owner_id: Option<DbId>,
    pub name: String,
    pub channel: String,
    pub prompt: String,
    pub system_prompt: Option<String>,
    pub is_default: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a template.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateTemplate {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    pub channel: String,
    #[validate(length(min = 1, max = 10000))]
    pub prompt: String,
    #[validate(length(max = 4000))]
    pub system_prompt: Option<String>,
    #[serde(default)]
    pub is_default: bool,
}

/// DTO for updating a template. All fields are optional.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateTemplate {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    pub channel: Option<String>,
    #[validate(length(min = 1, max = 10000))]
    pub prompt: Option<String>,
    #[validate(length(max = 4000))]
    pub system_prompt: Option<String>,
    pub is_default: Option<bool>,
}
