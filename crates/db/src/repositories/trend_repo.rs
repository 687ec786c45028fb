//! Repository for the `trends` table.

use chrono::NaiveDate;
use sqlx::PgPool;

use crate::models::trend::{Trend, TrendListQuery, UpsertTrend};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, keyword, source, category, rank, collected_on, created_at";

/// Maximum page size for trend listing.
const MAX_LIMIT: i64 = 100;

/// Default page size for trend listing.
const DEFAULT_LIMIT: i64 = 50;

/// Provides list/upsert operations for trending keywords.
pub struct TrendRepo;

impl TrendRepo {
    /// Upsert one collected keyword. Conflicts on
    /// `uq_trends_keyword_source_collected` update rank and category.
    pub async fn upsert(pool: &PgPool, input: &UpsertTrend) -> Result<Trend, sqlx::Error> {
        let query = format!(
            "INSERT INTO trends (keyword, source, category, rank, collected_on)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (keyword, source, collected_on)
             DO UPDATE SET rank = EXCLUDED.rank, category = EXCLUDED.category
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Trend>(&query)
            .bind(&input.keyword)
            .bind(&input.source)
            .bind(&input.category)
            .bind(input.rank)
            .bind(input.collected_on)
            .fetch_one(pool)
            .await
    }

    /// Most recent collection date for a source. `None` when the source
    /// has never been collected.
    pub async fn latest_collected_on(
        pool: &PgPool,
        source: &str,
    ) -> Result<Option<NaiveDate>, sqlx::Error> {
        sqlx::query_scalar("SELECT MAX(collected_on) FROM trends WHERE source = $1")
            .bind(source)
            .fetch_one(pool)
            .await
    }

    /// List trends with filters and pagination. Without a date filter the
    /// newest collection date comes first; rank orders within a date.
    pub async fn list(pool: &PgPool, params: &TrendListQuery) -> Result<Vec<Trend>, sqlx::Error> {
        let limit = params.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);
        let offset = params.offset.unwrap_or(0);

        let query = format!(
            "SELECT {COLUMNS} FROM trends
             WHERE ($1::text IS NULL OR source = $1)
               AND ($2::text IS NULL OR category = $2)
               AND ($3::date IS NULL OR collected_on = $3)
             ORDER BY collected_on DESC, rank NULLS LAST, keyword
             LIMIT $4 OFFSET $5"
        );
        sqlx::query_as::<_, Trend>(&query)
            .bind(&params.source)
            .bind(&params.category)
            .bind(params.date)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }
}
