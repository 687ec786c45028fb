//! Startup recovery for work orphaned by an unclean shutdown.

use postpilot_db::repositories::{AdvertiserRepo, JobRepo};
use postpilot_db::DbPool;

/// Error recorded on jobs and advertisers interrupted by a restart.
const ORPHANED_MESSAGE: &str = "서버 재시작으로 작업이 중단되었습니다";

/// Fail every job still marked `running` from a previous process and
/// reset advertisers stuck in `syncing`. Runs once, before the
/// dispatcher starts, so nothing legitimately running can be hit.
pub async fn recover(pool: &DbPool) -> Result<(), sqlx::Error> {
    let orphaned = JobRepo::fail_orphaned_running(pool, ORPHANED_MESSAGE).await?;
    if !orphaned.is_empty() {
        let ids: Vec<_> = orphaned.iter().map(|j| j.id).collect();
        tracing::warn!(count = orphaned.len(), ?ids, "Failed orphaned running jobs");
    }

    let reset = AdvertiserRepo::reset_stuck_syncing(pool, ORPHANED_MESSAGE).await?;
    if reset > 0 {
        tracing::warn!(count = reset, "Reset advertisers stuck in syncing");
    }

    Ok(())
}
