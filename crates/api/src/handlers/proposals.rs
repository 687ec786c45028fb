//! Handlers for the authenticated side of proposal links.
//!
//! The public token-facing endpoints live in
//! [`public_proposals`](crate::handlers::public_proposals).

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::{Duration, Utc};
use postpilot_core::error::CoreError;
use postpilot_core::types::{first_of_month, DbId};
use postpilot_db::models::proposal::{CreateProposal, Proposal};
use postpilot_db::models::status::TopicStatus;
use postpilot_db::repositories::{ProposalRepo, TopicRepo};
use validator::Validate;

use crate::auth::token::generate_share_token;
use crate::error::{AppError, AppResult};
use crate::handlers::advertisers::load_owned_advertiser;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Default link lifetime when the request does not specify one.
const DEFAULT_EXPIRY_DAYS: i64 = 14;

/// Upper bound on the link lifetime.
const MAX_EXPIRY_DAYS: i64 = 90;

/// Fetch a proposal and verify the caller owns its advertiser.
async fn load_owned_proposal(
    pool: &sqlx::PgPool,
    proposal_id: DbId,
    auth: &AuthUser,
) -> AppResult<Proposal> {
    let proposal = ProposalRepo::find_by_id(pool, proposal_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "제안",
            id: proposal_id,
        }))?;

    load_owned_advertiser(pool, proposal.advertiser_id, auth).await?;
    Ok(proposal)
}

/// POST /api/v1/proposals
///
/// Creates a shareable link for one advertiser and month and flips that
/// month's draft topics to `proposed` so they appear on the link.
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<CreateProposal>,
) -> AppResult<impl IntoResponse> {
    input.validate().map_err(|_| {
        AppError::Core(CoreError::Validation("입력값 형식을 확인해 주세요".into()))
    })?;
    load_owned_advertiser(&state.pool, input.advertiser_id, &auth).await?;

    let month = first_of_month(input.month);
    let topics = TopicRepo::list_by_advertiser(&state.pool, input.advertiser_id, Some(month)).await?;
    let proposable = topics
        .iter()
        .filter(|t| {
            t.status_id == TopicStatus::Draft.id() || t.status_id == TopicStatus::Proposed.id()
        })
        .count();
    if proposable == 0 {
        return Err(AppError::Core(CoreError::Validation(
            "제안할 주제가 없습니다. 먼저 해당 월의 주제를 등록해 주세요".into(),
        )));
    }

    let days = input
        .expires_in_days
        .unwrap_or(DEFAULT_EXPIRY_DAYS)
        .clamp(1, MAX_EXPIRY_DAYS);
    let expires_at = Utc::now() + Duration::days(days);
    let token = generate_share_token();

    let proposal =
        match ProposalRepo::create(&state.pool, auth.user_id, &token, month, expires_at, &input)
            .await
        {
            Ok(proposal) => proposal,
            Err(sqlx::Error::Database(db_err))
                if db_err.constraint() == Some("uq_proposals_advertiser_month_pending") =>
            {
                return Err(AppError::Core(CoreError::Conflict(
                    "해당 광고주의 이번 달 제안이 이미 진행 중입니다".into(),
                )));
            }
            Err(err) => return Err(err.into()),
        };

    let attached = TopicRepo::mark_month_proposed(&state.pool, input.advertiser_id, month).await?;
    tracing::info!(
        proposal_id = proposal.id,
        advertiser_id = proposal.advertiser_id,
        %month,
        attached,
        "Proposal link created"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: proposal })))
}

/// GET /api/v1/proposals
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<DataResponse<Vec<Proposal>>>> {
    let proposals = match auth.owner_scope() {
        Some(owner_id) => ProposalRepo::list_by_owner(&state.pool, owner_id).await?,
        None => ProposalRepo::list_all(&state.pool).await?,
    };
    Ok(Json(DataResponse { data: proposals }))
}

/// GET /api/v1/proposals/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Proposal>>> {
    let proposal = load_owned_proposal(&state.pool, id, &auth).await?;
    Ok(Json(DataResponse { data: proposal }))
}

/// POST /api/v1/proposals/{id}/revoke
///
/// Only a pending link can be revoked; the client sees 410 afterwards.
pub async fn revoke(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Proposal>>> {
    let proposal = load_owned_proposal(&state.pool, id, &auth).await?;

    if !ProposalRepo::revoke(&state.pool, proposal.id).await? {
        return Err(AppError::Core(CoreError::Conflict(
            "대기 중인 제안만 회수할 수 있습니다".into(),
        )));
    }

    let refreshed = ProposalRepo::find_by_id(&state.pool, proposal.id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "제안",
            id: proposal.id,
        }))?;

    tracing::info!(proposal_id = refreshed.id, "Proposal link revoked");
    Ok(Json(DataResponse { data: refreshed }))
}
