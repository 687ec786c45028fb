//! Scheduled trending-keyword collection.
//!
//! Keeps the shared trend pool fresh without an admin pressing refresh:
//! the collector checks whether today's keywords are already stored and
//! pulls them when they are not. Manual refreshes through the jobs API
//! run the same pull underneath.

use std::time::Duration;

use chrono::Utc;
use tokio_util::sync::CancellationToken;

use postpilot_db::repositories::TrendRepo;
use postpilot_events::{names, PlatformEvent};

use crate::engine::trends::pull_and_store;
use crate::state::AppState;

/// How often the collector considers pulling.
const COLLECT_INTERVAL: Duration = Duration::from_secs(6 * 3600); // 6 hours

/// Run the trend collection loop until `cancel` is triggered.
///
/// The first tick fires immediately, so a fresh deployment fills an
/// empty pool without waiting for the interval.
pub async fn run(state: AppState, cancel: CancellationToken) {
    tracing::info!(
        interval_secs = COLLECT_INTERVAL.as_secs(),
        "Trend collector started"
    );

    let mut interval = tokio::time::interval(COLLECT_INTERVAL);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Trend collector stopping");
                break;
            }
            _ = interval.tick() => {
                collect_if_stale(&state).await;
            }
        }
    }
}

/// Pull today's keywords unless they were already collected.
async fn collect_if_stale(state: &AppState) {
    let source = state.trend_source.source_name();
    let today = Utc::now().date_naive();

    match TrendRepo::latest_collected_on(&state.pool, source).await {
        Ok(Some(latest)) if latest >= today => {
            tracing::debug!(source, "Trend collector: today's keywords already in");
            return;
        }
        Ok(_) => {}
        Err(e) => {
            tracing::error!(error = %e, "Trend collector: staleness check failed");
            return;
        }
    }

    match pull_and_store(state).await {
        Ok(harvest) => {
            // Scheduled pulls have no requesting user: the event carries
            // no actor and no notification is written.
            state.event_bus.publish(
                PlatformEvent::new(names::TRENDS_REFRESHED).with_payload(serde_json::json!({
                    "source": harvest.source,
                    "collected": harvest.collected,
                    "collected_on": harvest.collected_on,
                })),
            );
        }
        Err(failure) => {
            tracing::warn!(
                error = %failure.message,
                details = ?failure.details,
                "Trend collector: pull failed"
            );
        }
    }
}
