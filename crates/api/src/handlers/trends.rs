//! Handlers for the shared `/trends` keyword pool.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use postpilot_db::models::job::{EnqueueJob, JOB_TYPE_TRENDS_REFRESH};
use postpilot_db::models::trend::{Trend, TrendListQuery};
use postpilot_db::repositories::{JobRepo, TrendRepo};
use serde_json::json;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/trends
///
/// Trends are a shared pool, not tenant data; any signed-in user can
/// read them.
pub async fn list(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(params): Query<TrendListQuery>,
) -> AppResult<Json<DataResponse<Vec<Trend>>>> {
    let trends = TrendRepo::list(&state.pool, &params).await?;
    Ok(Json(DataResponse { data: trends }))
}

/// POST /api/v1/trends/refresh
///
/// Admin-only manual refresh; the scheduled collector covers the normal
/// path.
pub async fn refresh(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
) -> AppResult<impl IntoResponse> {
    let job = JobRepo::enqueue(
        &state.pool,
        &EnqueueJob {
            job_type: JOB_TYPE_TRENDS_REFRESH.to_string(),
            submitted_by: admin.user_id,
            parameters: json!({}),
        },
    )
    .await?;

    tracing::info!(job_id = job.id, "Trend refresh requested");
    Ok((StatusCode::ACCEPTED, Json(DataResponse { data: job })))
}
