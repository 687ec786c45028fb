//! Repository for the `proposals` table.

use chrono::NaiveDate;
use sqlx::PgPool;

use postpilot_core::types::{DbId, Timestamp};

use crate::models::proposal::{CreateProposal, Proposal};
use crate::models::status::{ProposalStatus, StatusId};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, advertiser_id, token, month, title, message, status_id, created_by, \
                        expires_at, responded_at, client_comment, created_at, updated_at";

/// Provides operations for proposal links.
pub struct ProposalRepo;

impl ProposalRepo {
    /// Insert a pending proposal. The partial unique index
    /// `uq_proposals_advertiser_month_pending` rejects a second live link
    /// for the same advertiser and month.
    pub async fn create(
        pool: &PgPool,
        created_by: DbId,
        token: &str,
        month: NaiveDate,
        expires_at: Timestamp,
        input: &CreateProposal,
    ) -> Result<Proposal, sqlx::Error> {
        let query = format!(
            "INSERT INTO proposals
                 (advertiser_id, token, month, title, message, status_id, created_by, expires_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Proposal>(&query)
            .bind(input.advertiser_id)
            .bind(token)
            .bind(month)
            .bind(&input.title)
            .bind(&input.message)
            .bind(ProposalStatus::Pending.id())
            .bind(created_by)
            .bind(expires_at)
            .fetch_one(pool)
            .await
    }

    /// Find a proposal by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Proposal>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM proposals WHERE id = $1");
        sqlx::query_as::<_, Proposal>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a proposal by its share token, whatever its status. The
    /// handler decides between 404, 410, and a live view.
    pub async fn find_by_token(
        pool: &PgPool,
        token: &str,
    ) -> Result<Option<Proposal>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM proposals WHERE token = $1");
        sqlx::query_as::<_, Proposal>(&query)
            .bind(token)
            .fetch_optional(pool)
            .await
    }

    /// List proposals for advertisers owned by a user, newest first.
    pub async fn list_by_owner(pool: &PgPool, owner_id: DbId) -> Result<Vec<Proposal>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM proposals
             WHERE advertiser_id IN (SELECT id FROM advertisers WHERE owner_id = $1)
             ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, Proposal>(&query)
            .bind(owner_id)
            .fetch_all(pool)
            .await
    }

    /// List every proposal (admin view), newest first.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Proposal>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM proposals ORDER BY created_at DESC");
        sqlx::query_as::<_, Proposal>(&query).fetch_all(pool).await
    }

    /// Revoke a pending proposal. Returns `false` when it was already
    /// decided, expired, or revoked.
    pub async fn revoke(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE proposals SET status_id = $2 WHERE id = $1 AND status_id = $3",
        )
        .bind(id)
        .bind(ProposalStatus::Revoked.id())
        .bind(ProposalStatus::Pending.id())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Record the client's one-shot decision. Only a pending proposal can
    /// be decided; a second submission affects zero rows.
    pub async fn record_decision(
        pool: &PgPool,
        id: DbId,
        status: StatusId,
        comment: Option<&str>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE proposals SET
                status_id = $2,
                responded_at = NOW(),
                client_comment = $3
             WHERE id = $1 AND status_id = $4",
        )
        .bind(id)
        .bind(status)
        .bind(comment)
        .bind(ProposalStatus::Pending.id())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Background sweep: expire pending proposals past their deadline.
    /// Returns the expired rows so callers can emit events.
    pub async fn expire_due(pool: &PgPool) -> Result<Vec<Proposal>, sqlx::Error> {
        let query = format!(
            "UPDATE proposals SET status_id = $1
             WHERE status_id = $2 AND expires_at < NOW()
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Proposal>(&query)
            .bind(ProposalStatus::Expired.id())
            .bind(ProposalStatus::Pending.id())
            .fetch_all(pool)
            .await
    }
}
