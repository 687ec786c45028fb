//! Repository for the `advertisers` table.

use sqlx::PgPool;

use postpilot_core::types::DbId;

use crate::models::advertiser::{Advertiser, CreateAdvertiser, UpdateAdvertiser};
use crate::models::status::SyncStatus;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, owner_id, name, business_category, description, channels, profile, \
                        sync_status_id, last_synced_at, sync_error, created_at, updated_at";

/// Provides CRUD and sync-state operations for advertisers.
pub struct AdvertiserRepo;

impl AdvertiserRepo {
    /// Insert a new advertiser owned by `owner_id`, returning the created row.
    pub async fn create(
        pool: &PgPool,
        owner_id: DbId,
        input: &CreateAdvertiser,
    ) -> Result<Advertiser, sqlx::Error> {
        let query = format!(
            "INSERT INTO advertisers (owner_id, name, business_category, description, channels)
             VALUES ($1, $2, $3, $4, COALESCE($5, '{{}}'::jsonb))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Advertiser>(&query)
            .bind(owner_id)
            .bind(&input.name)
            .bind(&input.business_category)
            .bind(&input.description)
            .bind(&input.channels)
            .fetch_one(pool)
            .await
    }

    /// Find an advertiser by ID. Excludes soft-deleted rows.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Advertiser>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM advertisers WHERE id = $1 AND deleted_at IS NULL");
        sqlx::query_as::<_, Advertiser>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List advertisers owned by a user, most recently created first.
    pub async fn list_by_owner(
        pool: &PgPool,
        owner_id: DbId,
    ) -> Result<Vec<Advertiser>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM advertisers
             WHERE owner_id = $1 AND deleted_at IS NULL
             ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, Advertiser>(&query)
            .bind(owner_id)
            .fetch_all(pool)
            .await
    }

    /// List all advertisers (admin view).
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Advertiser>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM advertisers WHERE deleted_at IS NULL ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, Advertiser>(&query).fetch_all(pool).await
    }

    /// Update an advertiser. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no live row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateAdvertiser,
    ) -> Result<Option<Advertiser>, sqlx::Error> {
        let query = format!(
            "UPDATE advertisers SET
                name = COALESCE($2, name),
                business_category = COALESCE($3, business_category),
                description = COALESCE($4, description),
                channels = COALESCE($5, channels)
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Advertiser>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.business_category)
            .bind(&input.description)
            .bind(&input.channels)
            .fetch_optional(pool)
            .await
    }

    /// Soft-delete an advertiser. Returns `true` if a row was marked deleted.
    pub async fn soft_delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE advertisers SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Transition to `syncing` unless a sync is already in flight.
    ///
    /// Returns `false` when the advertiser is missing or already syncing,
    /// which the handler maps to 409.
    pub async fn begin_sync(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE advertisers SET sync_status_id = $2
             WHERE id = $1 AND deleted_at IS NULL AND sync_status_id != $2",
        )
        .bind(id)
        .bind(SyncStatus::Syncing.id())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Terminal sync success: store the merged profile, stamp
    /// `last_synced_at`, clear any previous error.
    pub async fn complete_sync(
        pool: &PgPool,
        id: DbId,
        profile: &serde_json::Value,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE advertisers SET
                profile = $2,
                sync_status_id = $3,
                last_synced_at = NOW(),
                sync_error = NULL
             WHERE id = $1",
        )
        .bind(id)
        .bind(profile)
        .bind(SyncStatus::Completed.id())
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Terminal sync failure: record the error, keep the old profile.
    pub async fn fail_sync(pool: &PgPool, id: DbId, error: &str) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE advertisers SET sync_status_id = $2, sync_error = $3 WHERE id = $1",
        )
        .bind(id)
        .bind(SyncStatus::Failed.id())
        .bind(error)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Startup recovery: flip every advertiser stuck in `syncing` to
    /// `failed` with the given error. Returns the count of rows fixed.
    pub async fn reset_stuck_syncing(pool: &PgPool, error: &str) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE advertisers SET sync_status_id = $1, sync_error = $2
             WHERE sync_status_id = $3",
        )
        .bind(SyncStatus::Failed.id())
        .bind(error)
        .bind(SyncStatus::Syncing.id())
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}
