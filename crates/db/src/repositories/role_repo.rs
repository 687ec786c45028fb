//! Repository for the `roles` lookup table.

use sqlx::PgPool;

use postpilot_core::types::DbId;

use crate::models::role::Role;

/// Provides lookups for roles.
pub struct RoleRepo;

impl RoleRepo {
    /// Find a role by name (`admin`, `marketer`).
    pub async fn find_by_name(pool: &PgPool, name: &str) -> Result<Option<Role>, sqlx::Error> {
        sqlx::query_as::<_, Role>("SELECT id, name FROM roles WHERE name = $1")
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    /// Look up a role row by primary key.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Role>, sqlx::Error> {
        sqlx::query_as::<_, Role>("SELECT id, name FROM roles WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
