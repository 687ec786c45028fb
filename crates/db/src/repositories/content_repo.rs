//! Repository for the `contents` table.

use chrono::NaiveDate;
use sqlx::PgPool;

use postpilot_core::types::DbId;

use crate::models::content::{
    Content, ContentListQuery, CreateContent, GeneratedContent, UpdateContent,
};
use crate::models::status::{ContentStatus, StatusId};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, advertiser_id, topic_id, channel, title, body, hashtags, status_id, \
                        scheduled_date, published_at, created_by, model, generation_job_id, \
                        created_at, updated_at";

/// Maximum page size for content listing.
const MAX_LIMIT: i64 = 100;

/// Default page size for content listing.
const DEFAULT_LIMIT: i64 = 50;

/// Provides CRUD operations for content drafts.
pub struct ContentRepo;

impl ContentRepo {
    /// Insert a manually authored draft, returning the created row.
    pub async fn create(
        pool: &PgPool,
        created_by: DbId,
        input: &CreateContent,
    ) -> Result<Content, sqlx::Error> {
        let hashtags = serde_json::json!(input.hashtags.clone().unwrap_or_default());
        let query = format!(
            "INSERT INTO contents
                 (advertiser_id, topic_id, channel, title, body, hashtags, status_id,
                  scheduled_date, created_by)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Content>(&query)
            .bind(input.advertiser_id)
            .bind(input.topic_id)
            .bind(&input.channel)
            .bind(&input.title)
            .bind(&input.body)
            .bind(hashtags)
            .bind(ContentStatus::Draft.id())
            .bind(input.scheduled_date)
            .bind(created_by)
            .fetch_one(pool)
            .await
    }

    /// Insert an LLM-generated draft with provenance columns set.
    pub async fn create_generated(
        pool: &PgPool,
        input: &GeneratedContent,
    ) -> Result<Content, sqlx::Error> {
        let hashtags = serde_json::json!(input.hashtags);
        let query = format!(
            "INSERT INTO contents
                 (advertiser_id, topic_id, channel, title, body, hashtags, status_id,
                  created_by, model, generation_job_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Content>(&query)
            .bind(input.advertiser_id)
            .bind(input.topic_id)
            .bind(&input.channel)
            .bind(&input.title)
            .bind(&input.body)
            .bind(hashtags)
            .bind(ContentStatus::Draft.id())
            .bind(input.created_by)
            .bind(&input.model)
            .bind(input.generation_job_id)
            .fetch_one(pool)
            .await
    }

    /// Find a content row by ID. Excludes soft-deleted rows.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Content>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM contents WHERE id = $1 AND deleted_at IS NULL");
        sqlx::query_as::<_, Content>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List contents with filters and pagination. When `owner_id` is
    /// `Some`, only rows under that user's advertisers are returned;
    /// `None` is the admin view.
    pub async fn list(
        pool: &PgPool,
        owner_id: Option<DbId>,
        params: &ContentListQuery,
        month: Option<NaiveDate>,
    ) -> Result<Vec<Content>, sqlx::Error> {
        let limit = params.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);
        let offset = params.offset.unwrap_or(0);

        // Build the WHERE clause and track the next bind parameter index.
        let mut conditions = vec!["deleted_at IS NULL".to_string()];
        let mut bind_idx: u32 = 1;

        if owner_id.is_some() {
            conditions.push(format!(
                "advertiser_id IN (SELECT id FROM advertisers WHERE owner_id = ${bind_idx})"
            ));
            bind_idx += 1;
        }
        if params.advertiser_id.is_some() {
            conditions.push(format!("advertiser_id = ${bind_idx}"));
            bind_idx += 1;
        }
        if params.channel.is_some() {
            conditions.push(format!("channel = ${bind_idx}"));
            bind_idx += 1;
        }
        if params.status_id.is_some() {
            conditions.push(format!("status_id = ${bind_idx}"));
            bind_idx += 1;
        }
        if month.is_some() {
            conditions.push(format!(
                "scheduled_date >= ${bind_idx} AND scheduled_date < ${bind_idx} + INTERVAL '1 month'"
            ));
            bind_idx += 1;
        }

        let query = format!(
            "SELECT {COLUMNS} FROM contents
             WHERE {}
             ORDER BY created_at DESC
             LIMIT ${bind_idx} OFFSET ${}",
            conditions.join(" AND "),
            bind_idx + 1,
        );

        let mut q = sqlx::query_as::<_, Content>(&query);
        if let Some(oid) = owner_id {
            q = q.bind(oid);
        }
        if let Some(aid) = params.advertiser_id {
            q = q.bind(aid);
        }
        if let Some(channel) = &params.channel {
            q = q.bind(channel.clone());
        }
        if let Some(sid) = params.status_id {
            q = q.bind(sid);
        }
        if let Some(m) = month {
            q = q.bind(m);
        }
        q = q.bind(limit).bind(offset);

        q.fetch_all(pool).await
    }

    /// Update a draft. Only non-`None` fields in `input` are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateContent,
    ) -> Result<Option<Content>, sqlx::Error> {
        let hashtags = input.hashtags.as_ref().map(|h| serde_json::json!(h));
        let query = format!(
            "UPDATE contents SET
                topic_id = COALESCE($2, topic_id),
                title = COALESCE($3, title),
                body = COALESCE($4, body),
                hashtags = COALESCE($5, hashtags),
                scheduled_date = COALESCE($6, scheduled_date)
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Content>(&query)
            .bind(id)
            .bind(input.topic_id)
            .bind(&input.title)
            .bind(&input.body)
            .bind(hashtags)
            .bind(input.scheduled_date)
            .fetch_optional(pool)
            .await
    }

    /// Apply a status transition. Stamps `published_at` when the target
    /// status is `published`; an incoming `scheduled_date` overrides the
    /// stored one.
    pub async fn set_status(
        pool: &PgPool,
        id: DbId,
        status: StatusId,
        scheduled_date: Option<NaiveDate>,
    ) -> Result<Option<Content>, sqlx::Error> {
        let query = format!(
            "UPDATE contents SET
                status_id = $2,
                scheduled_date = COALESCE($3, scheduled_date),
                published_at = CASE WHEN $2 = $4 THEN NOW() ELSE published_at END
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Content>(&query)
            .bind(id)
            .bind(status)
            .bind(scheduled_date)
            .bind(ContentStatus::Published.id())
            .fetch_optional(pool)
            .await
    }

    /// Soft-delete a content row. Returns `true` if a row was marked deleted.
    pub async fn soft_delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE contents SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
