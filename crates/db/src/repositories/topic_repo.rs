//! Repository for the `topics` table.

use chrono::NaiveDate;
use sqlx::PgPool;

use postpilot_core::types::DbId;

use crate::models::status::{StatusId, TopicStatus};
use crate::models::topic::{CreateTopic, Topic, UpdateTopic};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, advertiser_id, month, title, description, keywords, status_id, \
                        position, created_at, updated_at";

/// Provides CRUD and proposal-flow operations for topics.
pub struct TopicRepo;

impl TopicRepo {
    /// Insert a new draft topic. `month` must already be normalized to the
    /// first of the month by the caller.
    pub async fn create(
        pool: &PgPool,
        advertiser_id: DbId,
        month: NaiveDate,
        input: &CreateTopic,
    ) -> Result<Topic, sqlx::Error> {
        let keywords = serde_json::json!(input.keywords.clone().unwrap_or_default());
        let query = format!(
            "INSERT INTO topics (advertiser_id, month, title, description, keywords, status_id, position)
             VALUES ($1, $2, $3, $4, $5, $6, COALESCE($7, 0))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Topic>(&query)
            .bind(advertiser_id)
            .bind(month)
            .bind(&input.title)
            .bind(&input.description)
            .bind(keywords)
            .bind(TopicStatus::Draft.id())
            .bind(input.position)
            .fetch_one(pool)
            .await
    }

    /// Find a topic by ID. Excludes soft-deleted rows.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Topic>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM topics WHERE id = $1 AND deleted_at IS NULL");
        sqlx::query_as::<_, Topic>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List an advertiser's topics, optionally restricted to one month.
    /// Ordered by position, then creation time.
    pub async fn list_by_advertiser(
        pool: &PgPool,
        advertiser_id: DbId,
        month: Option<NaiveDate>,
    ) -> Result<Vec<Topic>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM topics
             WHERE advertiser_id = $1
               AND ($2::date IS NULL OR month = $2)
               AND deleted_at IS NULL
             ORDER BY position, created_at"
        );
        sqlx::query_as::<_, Topic>(&query)
            .bind(advertiser_id)
            .bind(month)
            .fetch_all(pool)
            .await
    }

    /// Topics shown on a proposal link: everything for the month that has
    /// entered the proposal flow (proposed, approved, or rejected).
    pub async fn list_for_proposal(
        pool: &PgPool,
        advertiser_id: DbId,
        month: NaiveDate,
    ) -> Result<Vec<Topic>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM topics
             WHERE advertiser_id = $1 AND month = $2
               AND status_id IN ($3, $4, $5)
               AND deleted_at IS NULL
             ORDER BY position, created_at"
        );
        sqlx::query_as::<_, Topic>(&query)
            .bind(advertiser_id)
            .bind(month)
            .bind(TopicStatus::Proposed.id())
            .bind(TopicStatus::Approved.id())
            .bind(TopicStatus::Rejected.id())
            .fetch_all(pool)
            .await
    }

    /// Update a topic. Only non-`None` fields in `input` are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateTopic,
    ) -> Result<Option<Topic>, sqlx::Error> {
        let keywords = input.keywords.as_ref().map(|k| serde_json::json!(k));
        let query = format!(
            "UPDATE topics SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                keywords = COALESCE($4, keywords),
                position = COALESCE($5, position)
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Topic>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(keywords)
            .bind(input.position)
            .fetch_optional(pool)
            .await
    }

    /// Soft-delete a topic. Returns `true` if a row was marked deleted.
    pub async fn soft_delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE topics SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Flip all of a month's draft topics to `proposed` when a proposal
    /// link is created. Returns the count of topics attached.
    pub async fn mark_month_proposed(
        pool: &PgPool,
        advertiser_id: DbId,
        month: NaiveDate,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE topics SET status_id = $3
             WHERE advertiser_id = $1 AND month = $2
               AND status_id = $4 AND deleted_at IS NULL",
        )
        .bind(advertiser_id)
        .bind(month)
        .bind(TopicStatus::Proposed.id())
        .bind(TopicStatus::Draft.id())
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Apply a client decision to one proposed topic. The advertiser and
    /// month guards stop a token from touching another proposal's topics.
    ///
    /// Returns `false` when the topic is missing or not in `proposed`.
    pub async fn apply_decision(
        pool: &PgPool,
        topic_id: DbId,
        advertiser_id: DbId,
        month: NaiveDate,
        status: StatusId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE topics SET status_id = $4
             WHERE id = $1 AND advertiser_id = $2 AND month = $3
               AND status_id = $5 AND deleted_at IS NULL",
        )
        .bind(topic_id)
        .bind(advertiser_id)
        .bind(month)
        .bind(status)
        .bind(TopicStatus::Proposed.id())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
