//! Repository for the `templates` table.

use sqlx::PgPool;

use postpilot_core::types::DbId;

use crate::models::template::{CreateTemplate, Template, UpdateTemplate};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, owner_id, name, channel, prompt, system_prompt, is_default, \
                        created_at, updated_at";

/// Provides CRUD operations for prompt templates.
pub struct TemplateRepo;

impl TemplateRepo {
    /// Insert a new template. `owner_id = None` creates a built-in
    /// (admin only, enforced by the handler).
    pub async fn create(
        pool: &PgPool,
        owner_id: Option<DbId>,
        input: &CreateTemplate,
    ) -> Result<Template, sqlx::Error> {
        let query = format!(
            "INSERT INTO templates (owner_id, name, channel, prompt, system_prompt, is_default)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Template>(&query)
            .bind(owner_id)
            .bind(&input.name)
            .bind(&input.channel)
            .bind(&input.prompt)
            .bind(&input.system_prompt)
            .bind(input.is_default)
            .fetch_one(pool)
            .await
    }

    /// Find a template by ID. Excludes soft-deleted rows.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Template>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM templates WHERE id = $1 AND deleted_at IS NULL");
        sqlx::query_as::<_, Template>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List templates visible to a user: their own plus built-ins.
    /// Built-ins sort first, then by name.
    pub async fn list_visible(pool: &PgPool, owner_id: DbId) -> Result<Vec<Template>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM templates
             WHERE (owner_id = $1 OR owner_id IS NULL) AND deleted_at IS NULL
             ORDER BY owner_id IS NOT NULL, name"
        );
        sqlx::query_as::<_, Template>(&query)
            .bind(owner_id)
            .fetch_all(pool)
            .await
    }

    /// List every template (admin view).
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Template>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM templates WHERE deleted_at IS NULL
             ORDER BY owner_id IS NOT NULL, name"
        );
        sqlx::query_as::<_, Template>(&query).fetch_all(pool).await
    }

    /// The default template for a channel, if one is configured.
    pub async fn find_default_for_channel(
        pool: &PgPool,
        channel: &str,
    ) -> Result<Option<Template>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM templates
             WHERE channel = $1 AND is_default = true AND deleted_at IS NULL"
        );
        sqlx::query_as::<_, Template>(&query)
            .bind(channel)
            .fetch_optional(pool)
            .await
    }

    /// Update a template. Only non-`None` fields in `input` are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateTemplate,
    ) -> Result<Option<Template>, sqlx::Error> {
        let query = format!(
            "UPDATE templates SET
                name = COALESCE($2, name),
                channel = COALESCE($3, channel),
                prompt = COALESCE($4, prompt),
                system_prompt = COALESCE($5, system_prompt),
                is_default = COALESCE($6, is_default)
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Template>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.channel)
            .bind(&input.prompt)
            .bind(&input.system_prompt)
            .bind(input.is_default)
            .fetch_optional(pool)
            .await
    }

    /// Soft-delete a template. Returns `true` if a row was marked deleted.
    pub async fn soft_delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE templates SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
