//! Polling dispatcher for the job queue.
//!
//! Checks for pending jobs every `poll_interval` and runs each claimed
//! job on a spawned task. Claiming uses `SELECT FOR UPDATE SKIP LOCKED` via
//! [`JobRepo::claim_next`] so concurrent dispatchers never double-run a
//! job; a semaphore bounds how many executors run at once.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

use postpilot_db::models::job::{
    Job, JOB_TYPE_BULK_GENERATE, JOB_TYPE_SYNC, JOB_TYPE_TRENDS_REFRESH,
};
use postpilot_db::repositories::JobRepo;

use super::{generate, sync, trends, JobFailure};
use crate::state::AppState;

/// How often the loop polls for pending work.
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Claims pending jobs and fans them out to executor tasks from one
/// long-lived Tokio task.
pub struct JobDispatcher {
    state: AppState,
    poll_interval: Duration,
    permits: Arc<Semaphore>,
}

impl JobDispatcher {
    /// Create a dispatcher with the default 1-second poll interval. The
    /// concurrency bound comes from `JOB_CONCURRENCY`.
    pub fn new(state: AppState) -> Self {
        let permits = Arc::new(Semaphore::new(state.config.job_concurrency));
        Self {
            state,
            poll_interval: DEFAULT_POLL_INTERVAL,
            permits,
        }
    }

    /// Poll-and-dispatch loop; returns once `cancel` fires and every
    /// in-flight executor has finished.
    pub async fn run(&self, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(self.poll_interval);
        tracing::info!(
            poll_interval_ms = self.poll_interval.as_millis() as u64,
            concurrency = self.state.config.job_concurrency,
            "Job dispatcher started",
        );

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Dispatcher stopping, waiting on in-flight jobs");
                    break;
                }
                _ = ticker.tick() => {
                    if let Err(e) = self.try_dispatch().await {
                        tracing::error!(error = %e, "Dispatch cycle failed");
                    }
                }
            }
        }

        // Each in-flight executor holds a permit; reacquiring the full set
        // means they have all finished.
        let total = self.state.config.job_concurrency as u32;
        if self.permits.acquire_many(total).await.is_ok() {
            tracing::info!("All in-flight jobs finished");
        }
    }

    /// One dispatch cycle: claim pending jobs while executor slots are
    /// free. Stops as soon as the queue is empty or every slot is taken.
    async fn try_dispatch(&self) -> Result<(), sqlx::Error> {
        loop {
            let Ok(permit) = Arc::clone(&self.permits).try_acquire_owned() else {
                return Ok(());
            };
            let Some(job) = JobRepo::claim_next(&self.state.pool).await? else {
                return Ok(());
            };

            JobRepo::mark_started(&self.state.pool, job.id).await?;
            tracing::info!(job_id = job.id, job_type = %job.job_type, "Job claimed");

            let state = self.state.clone();
            tokio::spawn(async move {
                let _permit = permit;
                run_job(state, job).await;
            });
        }
    }
}

/// Execute one claimed job and persist its outcome. Terminal writes are
/// guarded on `running`, so a cancellation that landed mid-run wins.
async fn run_job(state: AppState, job: Job) {
    let outcome = match job.job_type.as_str() {
        JOB_TYPE_SYNC => sync::execute(&state, &job).await,
        JOB_TYPE_BULK_GENERATE => generate::execute(&state, &job).await,
        JOB_TYPE_TRENDS_REFRESH => trends::execute(&state, &job).await,
        other => Err(JobFailure::new(format!(
            "지원하지 않는 작업 유형입니다: {other}"
        ))),
    };

    let recorded = match outcome {
        Ok(result) => {
            tracing::info!(job_id = job.id, job_type = %job.job_type, "Job completed");
            JobRepo::complete(&state.pool, job.id, &result).await
        }
        Err(failure) => {
            tracing::warn!(
                job_id = job.id,
                job_type = %job.job_type,
                error = %failure.message,
                "Job failed",
            );
            JobRepo::fail(
                &state.pool,
                job.id,
                &failure.message,
                failure.details.as_ref(),
            )
            .await
        }
    };

    if let Err(e) = recorded {
        tracing::error!(job_id = job.id, error = %e, "Failed to record job outcome");
    }
}
