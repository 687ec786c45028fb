//! Hourly cleanup of expired sessions and old terminal jobs.
//!
//! Terminal job rows (`completed`, `failed`, `cancelled`) older than the
//! configured retention period are deleted, along with sessions that are
//! expired or revoked. Runs on a fixed interval using `tokio::time::interval`.

use std::time::Duration;

use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

use postpilot_db::repositories::{JobRepo, SessionRepo};

/// How often the cleanup job runs.
const CLEANUP_INTERVAL: Duration = Duration::from_secs(3600); // 1 hour

/// Run the retention cleanup loop.
///
/// Deletes terminal job rows older than `job_retention_days` and purges
/// dead sessions. Runs until `cancel` is triggered.
pub async fn run(pool: PgPool, job_retention_days: i64, cancel: CancellationToken) {
    tracing::info!(
        job_retention_days,
        interval_secs = CLEANUP_INTERVAL.as_secs(),
        "Retention job started"
    );

    let mut interval = tokio::time::interval(CLEANUP_INTERVAL);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Retention job stopping");
                break;
            }
            _ = interval.tick() => {
                match JobRepo::delete_old_terminal(&pool, job_retention_days).await {
                    Ok(deleted) if deleted > 0 => {
                        tracing::info!(deleted, "Retention: purged old terminal jobs");
                    }
                    Ok(_) => {
                        tracing::debug!("Retention: no job rows to purge");
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Retention: job cleanup failed");
                    }
                }

                match SessionRepo::cleanup_expired(&pool).await {
                    Ok(deleted) if deleted > 0 => {
                        tracing::info!(deleted, "Retention: purged dead sessions");
                    }
                    Ok(_) => {}
                    Err(e) => {
                        tracing::error!(error = %e, "Retention: session cleanup failed");
                    }
                }
            }
        }
    }
}
