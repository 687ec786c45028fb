//! Unauthenticated handlers behind `/p/{token}`.
//!
//! The share token in the URL is the only credential. Responses are
//! curated views rather than raw rows so internal ids and ownership
//! details stay out of the public page.

use axum::extract::{Path, State};
use axum::Json;
use chrono::{NaiveDate, Utc};
use postpilot_core::error::CoreError;
use postpilot_core::types::{DbId, Timestamp};
use postpilot_db::models::proposal::{Proposal, ProposalDecision};
use postpilot_db::models::status::{ProposalStatus, TopicStatus};
use postpilot_db::models::topic::Topic;
use postpilot_db::repositories::{AdvertiserRepo, ProposalRepo, TopicRepo};
use postpilot_events::{names, PlatformEvent};
use serde::Serialize;
use serde_json::json;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// What the client sees when opening a share link.
#[derive(Debug, Serialize)]
pub struct PublicProposalView {
    pub advertiser_name: String,
    pub title: String,
    pub message: Option<String>,
    pub month: NaiveDate,
    pub status: &'static str,
    pub expires_at: Timestamp,
    pub responded_at: Option<Timestamp>,
    pub client_comment: Option<String>,
    pub topics: Vec<PublicTopic>,
}

/// One topic row on the public page.
#[derive(Debug, Serialize)]
pub struct PublicTopic {
    pub id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub keywords: serde_json::Value,
    pub status: &'static str,
    pub position: i32,
}

impl PublicTopic {
    fn from_row(topic: Topic) -> Self {
        let status = TopicStatus::from_id(topic.status_id)
            .unwrap_or(TopicStatus::Proposed)
            .as_str();
        Self {
            id: topic.id,
            title: topic.title,
            description: topic.description,
            keywords: topic.keywords,
            status,
            position: topic.position,
        }
    }
}

/// Load a proposal by token, mapping dead links to 404/410.
///
/// A pending proposal past its deadline is treated as expired here even
/// if the background sweep has not flipped the row yet.
async fn load_live_proposal(
    pool: &sqlx::PgPool,
    token: &str,
) -> AppResult<(Proposal, ProposalStatus)> {
    let proposal = ProposalRepo::find_by_token(pool, token)
        .await?
        .ok_or_else(|| AppError::NotFound("존재하지 않는 제안 링크입니다".into()))?;

    let status = ProposalStatus::from_id(proposal.status_id).unwrap_or(ProposalStatus::Pending);
    match status {
        ProposalStatus::Expired | ProposalStatus::Revoked => Err(AppError::Core(
            CoreError::Gone("만료되었거나 회수된 제안입니다".into()),
        )),
        ProposalStatus::Pending if proposal.expires_at < Utc::now() => Err(AppError::Core(
            CoreError::Gone("만료되었거나 회수된 제안입니다".into()),
        )),
        _ => Ok((proposal, status)),
    }
}

async fn build_view(
    pool: &sqlx::PgPool,
    proposal: Proposal,
    status: ProposalStatus,
) -> AppResult<PublicProposalView> {
    let advertiser = AdvertiserRepo::find_by_id(pool, proposal.advertiser_id)
        .await?
        .ok_or_else(|| AppError::NotFound("존재하지 않는 제안 링크입니다".into()))?;

    let topics = TopicRepo::list_for_proposal(pool, proposal.advertiser_id, proposal.month)
        .await?
        .into_iter()
        .map(PublicTopic::from_row)
        .collect();

    Ok(PublicProposalView {
        advertiser_name: advertiser.name,
        title: proposal.title,
        message: proposal.message,
        month: proposal.month,
        status: status.as_str(),
        expires_at: proposal.expires_at,
        responded_at: proposal.responded_at,
        client_comment: proposal.client_comment,
        topics,
    })
}

/// GET /p/{token}
///
/// Decided proposals stay viewable so the client can revisit the result;
/// only expired and revoked links answer 410.
pub async fn get_by_token(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> AppResult<Json<DataResponse<PublicProposalView>>> {
    let (proposal, status) = load_live_proposal(&state.pool, &token).await?;
    let view = build_view(&state.pool, proposal, status).await?;
    Ok(Json(DataResponse { data: view }))
}

/// POST /p/{token}/decision
///
/// One-shot: the first submission decides the proposal, later ones get
/// 409. The proposal is approved only when every decided topic was
/// approved; a single rejection rejects the whole month.
pub async fn post_decision(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Json(input): Json<ProposalDecision>,
) -> AppResult<Json<DataResponse<PublicProposalView>>> {
    input.validate().map_err(|_| {
        AppError::Core(CoreError::Validation("입력값 형식을 확인해 주세요".into()))
    })?;
    let (proposal, status) = load_live_proposal(&state.pool, &token).await?;

    if status != ProposalStatus::Pending {
        return Err(AppError::Core(CoreError::Conflict(
            "이미 응답이 완료된 제안입니다".into(),
        )));
    }
    if input.decisions.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "결정할 주제를 선택해 주세요".into(),
        )));
    }

    let mut approved = 0u32;
    let mut rejected = 0u32;
    for decision in &input.decisions {
        let topic_status = match decision.decision.as_str() {
            "approve" => TopicStatus::Approved,
            "reject" => TopicStatus::Rejected,
            other => {
                return Err(AppError::Core(CoreError::Validation(format!(
                    "알 수 없는 결정입니다: {other}"
                ))));
            }
        };

        let applied = TopicRepo::apply_decision(
            &state.pool,
            decision.topic_id,
            proposal.advertiser_id,
            proposal.month,
            topic_status.id(),
        )
        .await?;
        if applied {
            match topic_status {
                TopicStatus::Approved => approved += 1,
                _ => rejected += 1,
            }
        }
    }

    if approved + rejected == 0 {
        return Err(AppError::Core(CoreError::Validation(
            "이 제안에 포함된 주제가 아닙니다".into(),
        )));
    }

    let outcome = if rejected == 0 {
        ProposalStatus::Approved
    } else {
        ProposalStatus::Rejected
    };

    let recorded = ProposalRepo::record_decision(
        &state.pool,
        proposal.id,
        outcome.id(),
        input.comment.as_deref(),
    )
    .await?;
    if !recorded {
        return Err(AppError::Core(CoreError::Conflict(
            "이미 응답이 완료된 제안입니다".into(),
        )));
    }

    let event_type = match outcome {
        ProposalStatus::Approved => names::PROPOSAL_APPROVED,
        _ => names::PROPOSAL_REJECTED,
    };
    state.event_bus.publish(
        PlatformEvent::new(event_type)
            .with_source("proposal", proposal.id)
            .with_payload(json!({
                "advertiser_id": proposal.advertiser_id,
                "created_by": proposal.created_by,
                "title": proposal.title,
                "month": proposal.month,
                "approved": approved,
                "rejected": rejected,
            })),
    );
    tracing::info!(
        proposal_id = proposal.id,
        outcome = outcome.as_str(),
        approved,
        rejected,
        "Proposal decision recorded"
    );

    let refreshed = ProposalRepo::find_by_id(&state.pool, proposal.id)
        .await?
        .ok_or_else(|| AppError::NotFound("존재하지 않는 제안 링크입니다".into()))?;
    let view = build_view(&state.pool, refreshed, outcome).await?;
    Ok(Json(DataResponse { data: view }))
}
