//! Trending keyword entity model.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use postpilot_core::types::{DbId, Timestamp};

/// A row from the `trends` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Trend {
    pub id: DbId,
    pub keyword: String,
    pub source: String,
    pub category: Option<String>,
    pub rank: Option<i32>,
    pub collected_on: NaiveDate,
    pub created_at: Timestamp,
}

/// Upsert payload produced by the trends refresh job.
#[derive(Debug, Clone, Deserialize)]
pub struct UpsertTrend {
    pub keyword: String,
    pub source: String,
    pub category: Option<String>,
    pub rank: Option<i32>,
    pub collected_on: NaiveDate,
}

/// Query parameters for `GET /api/v1/trends`.
#[derive(Debug, Deserialize)]
pub struct TrendListQuery {
    pub source: Option<String>,
    pub category: Option<String>,
    /// Exact collection date; defaults to the latest available.
    pub date: Option<NaiveDate>,
    /// Maximum number of results. Defaults to 50, capped at 100.
    pub limit: Option<i64>,
    /// Number of results to skip. Defaults to 0.
    pub offset: Option<i64>,
}
