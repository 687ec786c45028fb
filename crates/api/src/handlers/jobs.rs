//! Handlers for the `/jobs` resource.
//!
//! Jobs are visible to the user who submitted them; admins see all.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use postpilot_core::error::CoreError;
use postpilot_core::types::DbId;
use postpilot_db::models::job::{Job, JobListQuery};
use postpilot_db::models::status::JobStatus;
use postpilot_db::repositories::JobRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Fetch a job and verify the caller submitted it (or is admin).
async fn load_owned_job(pool: &sqlx::PgPool, job_id: DbId, auth: &AuthUser) -> AppResult<Job> {
    let job = JobRepo::find_by_id(pool, job_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "작업",
            id: job_id,
        }))?;

    if job.submitted_by != auth.user_id && !auth.is_admin() {
        return Err(AppError::Core(CoreError::Forbidden(
            "다른 사용자의 작업에는 접근할 수 없습니다".into(),
        )));
    }

    Ok(job)
}

/// GET /api/v1/jobs
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<JobListQuery>,
) -> AppResult<Json<DataResponse<Vec<Job>>>> {
    let jobs = match auth.owner_scope() {
        Some(user_id) => JobRepo::list_by_user(&state.pool, user_id, &params).await?,
        None => JobRepo::list_all(&state.pool, &params).await?,
    };
    Ok(Json(DataResponse { data: jobs }))
}

/// GET /api/v1/jobs/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Job>>> {
    let job = load_owned_job(&state.pool, id, &auth).await?;
    Ok(Json(DataResponse { data: job }))
}

/// POST /api/v1/jobs/{id}/cancel
///
/// Pending and running jobs can be cancelled; a running job stops at its
/// next progress checkpoint. Terminal jobs answer 409.
pub async fn cancel(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Job>>> {
    let job = load_owned_job(&state.pool, id, &auth).await?;

    if !JobRepo::cancel(&state.pool, job.id).await? {
        return Err(AppError::Core(CoreError::Conflict(
            "이미 종료된 작업은 취소할 수 없습니다".into(),
        )));
    }

    let refreshed = JobRepo::find_by_id(&state.pool, job.id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "작업",
            id: job.id,
        }))?;

    tracing::info!(job_id = refreshed.id, job_type = %refreshed.job_type, "Job cancelled");
    Ok(Json(DataResponse { data: refreshed }))
}

/// POST /api/v1/jobs/{id}/retry
///
/// Re-enqueues a failed job with the same parameters. The new job links
/// back to the original via `retry_of_job_id`.
pub async fn retry(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let job = load_owned_job(&state.pool, id, &auth).await?;

    if job.status_id != JobStatus::Failed.id() {
        return Err(AppError::Core(CoreError::Conflict(
            "실패한 작업만 재시도할 수 있습니다".into(),
        )));
    }

    let retried = JobRepo::retry(&state.pool, job.id, auth.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::Conflict(
            "실패한 작업만 재시도할 수 있습니다".into(),
        )))?;

    tracing::info!(
        job_id = retried.id,
        retry_of = job.id,
        job_type = %retried.job_type,
        "Job re-enqueued"
    );
    Ok((StatusCode::ACCEPTED, Json(DataResponse { data: retried })))
}
