//! Queue operations for the `jobs` table.
//!
//! Every transition binds a [`JobStatus`] constant; raw status ids never
//! appear inline. Claiming goes through `FOR UPDATE SKIP LOCKED`, and the
//! terminal writes carry a status guard so a late completion cannot
//! clobber a cancellation that already landed.

use sqlx::PgPool;

use postpilot_core::types::DbId;

use crate::models::job::{EnqueueJob, Job, JobListQuery};
use crate::models::status::{JobStatus, StatusId};

/// Column list shared by every `jobs` query that returns full rows.
const COLUMNS: &str = "id, job_type, status_id, submitted_by, parameters, result, \
    error_message, error_details, progress_percent, progress_message, submitted_at, \
    claimed_at, started_at, completed_at, retry_of_job_id, created_at, updated_at";

/// Page size when the query string does not give one.
const DEFAULT_LIMIT: i64 = 50;

/// Hard cap on page size.
const MAX_LIMIT: i64 = 100;

/// Statuses a job never leaves: completed, failed, cancelled.
const TERMINAL_STATUSES: [StatusId; 3] = [
    JobStatus::Completed as StatusId,
    JobStatus::Failed as StatusId,
    JobStatus::Cancelled as StatusId,
];

/// Queue reads and writes for background jobs.
pub struct JobRepo;

impl JobRepo {
    /// Insert a new pending row and return it immediately; the dispatcher
    /// picks it up on its next poll.
    pub async fn enqueue(pool: &PgPool, input: &EnqueueJob) -> Result<Job, sqlx::Error> {
        let query = format!(
            "INSERT INTO jobs (job_type, status_id, submitted_by, parameters)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Job>(&query)
            .bind(&input.job_type)
            .bind(JobStatus::Pending.id())
            .bind(input.submitted_by)
            .bind(&input.parameters)
            .fetch_one(pool)
            .await
    }

    /// Atomically claim the oldest unclaimed pending job, or `None` when
    /// the queue is empty.
    ///
    /// The inner `SELECT ... FOR UPDATE SKIP LOCKED` is what makes a
    /// second dispatcher instance safe: concurrent claimers skip the row
    /// instead of blocking on it.
    pub async fn claim_next(pool: &PgPool) -> Result<Option<Job>, sqlx::Error> {
        let query = format!(
            "UPDATE jobs
             SET claimed_at = NOW(), status_id = $1
             WHERE id = (
                 SELECT id FROM jobs
                 WHERE status_id = $2 AND claimed_at IS NULL
                 ORDER BY submitted_at ASC
                 LIMIT 1 FOR UPDATE SKIP LOCKED
             )
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Job>(&query)
            .bind(JobStatus::Running.id())
            .bind(JobStatus::Pending.id())
            .fetch_optional(pool)
            .await
    }

    /// Stamp `started_at` once the executor begins real work.
    pub async fn mark_started(pool: &PgPool, job_id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE jobs SET started_at = NOW(), status_id = $2 WHERE id = $1")
            .bind(job_id)
            .bind(JobStatus::Running.id())
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Write a progress percentage and optional detail line.
    ///
    /// Touches only a running job. A `false` return means the job is no
    /// longer running (cancelled mid-flight); executors treat that as
    /// their stop checkpoint.
    pub async fn update_progress(
        pool: &PgPool,
        job_id: DbId,
        percent: i16,
        message: Option<&str>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE jobs SET progress_percent = $2, progress_message = $3
             WHERE id = $1 AND status_id = $4",
        )
        .bind(job_id)
        .bind(percent)
        .bind(message)
        .bind(JobStatus::Running.id())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Record a successful finish with its result payload.
    ///
    /// Guarded on `running`: if the job was cancelled while the executor
    /// finished, the cancellation wins and this write is a no-op.
    pub async fn complete(
        pool: &PgPool,
        job_id: DbId,
        result: &serde_json::Value,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE jobs
             SET status_id = $2, result = $3, completed_at = NOW(), progress_percent = 100
             WHERE id = $1 AND status_id = $4",
        )
        .bind(job_id)
        .bind(JobStatus::Completed.id())
        .bind(result)
        .bind(JobStatus::Running.id())
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Record a failure with its message and optional structured details.
    ///
    /// Nothing retries automatically; the row stays `failed` until the
    /// user asks for a retry through the API. Same `running` guard as
    /// [`complete`](Self::complete).
    pub async fn fail(
        pool: &PgPool,
        job_id: DbId,
        error: &str,
        details: Option<&serde_json::Value>,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE jobs
             SET status_id = $2, error_message = $3, error_details = $4, completed_at = NOW()
             WHERE id = $1 AND status_id = $5",
        )
        .bind(job_id)
        .bind(JobStatus::Failed.id())
        .bind(error)
        .bind(details)
        .bind(JobStatus::Running.id())
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Cancel a job unless it already reached a terminal status.
    ///
    /// Returns `false` for an already-terminal job. A running job flips
    /// to cancelled here while its executor keeps going; the guarded
    /// terminal writes above make sure the executor's outcome is then
    /// discarded.
    pub async fn cancel(pool: &PgPool, job_id: DbId) -> Result<bool, sqlx::Error> {
        let [completed, failed, cancelled] = TERMINAL_STATUSES;
        let result = sqlx::query(
            "UPDATE jobs
             SET status_id = $2, completed_at = NOW()
             WHERE id = $1 AND status_id NOT IN ($3, $4, $5)",
        )
        .bind(job_id)
        .bind(JobStatus::Cancelled.id())
        .bind(completed)
        .bind(failed)
        .bind(cancelled)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Clone a failed job's parameters into a fresh pending row.
    ///
    /// Returns `None` when the job does not exist or is not `failed`; the
    /// copy links back through `retry_of_job_id`.
    pub async fn retry(
        pool: &PgPool,
        job_id: DbId,
        user_id: DbId,
    ) -> Result<Option<Job>, sqlx::Error> {
        let Some(original) = Self::find_by_id(pool, job_id).await? else {
            return Ok(None);
        };
        if original.status_id != JobStatus::Failed.id() {
            return Ok(None);
        }

        let query = format!(
            "INSERT INTO jobs (job_type, status_id, submitted_by, parameters, retry_of_job_id)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Job>(&query)
            .bind(&original.job_type)
            .bind(JobStatus::Pending.id())
            .bind(user_id)
            .bind(&original.parameters)
            .bind(job_id)
            .fetch_one(pool)
            .await
            .map(Some)
    }

    /// Look up one job row.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Job>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM jobs WHERE id = $1");
        sqlx::query_as::<_, Job>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List one user's jobs, newest first, with the query-string filters.
    pub async fn list_by_user(
        pool: &PgPool,
        user_id: DbId,
        params: &JobListQuery,
    ) -> Result<Vec<Job>, sqlx::Error> {
        Self::list_jobs(pool, Some(user_id), params).await
    }

    /// List every user's jobs (admin view), newest first.
    pub async fn list_all(pool: &PgPool, params: &JobListQuery) -> Result<Vec<Job>, sqlx::Error> {
        Self::list_jobs(pool, None, params).await
    }

    /// Listing query shared by the owner and admin views. `user_id` scopes
    /// the result when present.
    ///
    /// Each filter consumes exactly one placeholder, so the placeholder
    /// number is always `filters.len() + 1` at push time and the binds
    /// below follow the same push order.
    async fn list_jobs(
        pool: &PgPool,
        user_id: Option<DbId>,
        params: &JobListQuery,
    ) -> Result<Vec<Job>, sqlx::Error> {
        let limit = params.limit.map_or(DEFAULT_LIMIT, |l| l.min(MAX_LIMIT));
        let offset = params.offset.unwrap_or_default();

        let mut filters: Vec<String> = Vec::new();
        if user_id.is_some() {
            filters.push(format!("submitted_by = ${}", filters.len() + 1));
        }
        if params.status_id.is_some() {
            filters.push(format!("status_id = ${}", filters.len() + 1));
        }
        if params.job_type.is_some() {
            filters.push(format!("job_type = ${}", filters.len() + 1));
        }

        let where_sql = if filters.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", filters.join(" AND "))
        };
        let limit_idx = filters.len() + 1;
        let query = format!(
            "SELECT {COLUMNS} FROM jobs{where_sql}
             ORDER BY submitted_at DESC
             LIMIT ${limit_idx} OFFSET ${}",
            limit_idx + 1,
        );

        let mut q = sqlx::query_as::<_, Job>(&query);
        if let Some(uid) = user_id {
            q = q.bind(uid);
        }
        if let Some(sid) = params.status_id {
            q = q.bind(sid);
        }
        if let Some(jt) = &params.job_type {
            q = q.bind(jt.clone());
        }
        q.bind(limit).bind(offset).fetch_all(pool).await
    }

    /// Startup recovery: flip every job a previous process left `running`
    /// to `failed`. Returns the affected rows so the caller can repair
    /// dependent state (advertiser sync flags).
    pub async fn fail_orphaned_running(
        pool: &PgPool,
        error: &str,
    ) -> Result<Vec<Job>, sqlx::Error> {
        let query = format!(
            "UPDATE jobs
             SET status_id = $1, error_message = $2, completed_at = NOW()
             WHERE status_id = $3
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Job>(&query)
            .bind(JobStatus::Failed.id())
            .bind(error)
            .bind(JobStatus::Running.id())
            .fetch_all(pool)
            .await
    }

    /// Retention sweep: drop terminal jobs whose `completed_at` is older
    /// than `retention_days`. Returns how many rows went away.
    pub async fn delete_old_terminal(
        pool: &PgPool,
        retention_days: i64,
    ) -> Result<u64, sqlx::Error> {
        let [completed, failed, cancelled] = TERMINAL_STATUSES;
        let result = sqlx::query(
            "DELETE FROM jobs
             WHERE status_id IN ($1, $2, $3)
               AND completed_at < NOW() - make_interval(days => $4::int)",
        )
        .bind(completed)
        .bind(failed)
        .bind(cancelled)
        .bind(retention_days)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}
