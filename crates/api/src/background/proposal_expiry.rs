//! Periodic sweep that expires overdue proposal links.
//!
//! Pending proposals whose `expires_at` has passed are flipped to
//! `expired` in one guarded UPDATE, and a `proposal.expired` event is
//! published for each so the creator gets notified. The public proposal
//! page treats an overdue pending link as gone even before this sweep
//! runs; the sweep makes the state durable.

use std::sync::Arc;
use std::time::Duration;

use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

use postpilot_db::repositories::ProposalRepo;
use postpilot_events::{names, EventBus, PlatformEvent};

/// How often the expiry sweep runs.
const SWEEP_INTERVAL: Duration = Duration::from_secs(300); // 5 minutes

/// Run the proposal expiry loop until `cancel` is triggered.
pub async fn run(pool: PgPool, event_bus: Arc<EventBus>, cancel: CancellationToken) {
    tracing::info!(
        interval_secs = SWEEP_INTERVAL.as_secs(),
        "Proposal expiry sweep started"
    );

    let mut interval = tokio::time::interval(SWEEP_INTERVAL);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Proposal expiry sweep stopping");
                break;
            }
            _ = interval.tick() => {
                match ProposalRepo::expire_due(&pool).await {
                    Ok(expired) if expired.is_empty() => {
                        tracing::debug!("Proposal expiry sweep: nothing due");
                    }
                    Ok(expired) => {
                        tracing::info!(count = expired.len(), "Proposal expiry sweep: expired overdue links");
                        for proposal in expired {
                            event_bus.publish(
                                PlatformEvent::new(names::PROPOSAL_EXPIRED)
                                    .with_source("proposal", proposal.id)
                                    .with_payload(serde_json::json!({
                                        "advertiser_id": proposal.advertiser_id,
                                        "created_by": proposal.created_by,
                                        "title": proposal.title,
                                        "month": proposal.month,
                                    })),
                            );
                        }
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Proposal expiry sweep failed");
                    }
                }
            }
        }
    }
}
