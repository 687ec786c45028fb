//! Event-bus subscriber that makes events durable.
//!
//! Everything published on the bus also lands in the `events` table so the
//! audit trail survives restarts. [`EventPersistence::run`] is spawned once
//! at startup and ends itself when the bus is dropped.

use tokio::sync::broadcast;

use postpilot_core::types::DbId;
use postpilot_db::repositories::EventRepo;
use postpilot_db::DbPool;

use crate::bus::PlatformEvent;

/// Writes every broadcast [`PlatformEvent`] to the database.
pub struct EventPersistence;

impl EventPersistence {
    /// Consume `receiver` until the channel closes, persisting each event.
    ///
    /// A failed insert is logged and the loop moves on; one bad event must
    /// not stall the audit trail. Lag means the bus outran this writer and
    /// the skipped events are gone from the channel, so that is logged too.
    pub async fn run(pool: DbPool, mut receiver: broadcast::Receiver<PlatformEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    if let Err(e) = Self::persist(&pool, &event).await {
                        tracing::error!(
                            error = %e,
                            event_type = %event.event_type,
                            "Event row insert failed"
                        );
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Persistence fell behind the bus");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Bus closed, event persistence stopping");
                    break;
                }
            }
        }
    }

    /// Insert one event row, resolving the type name to its
    /// `event_types.id` first. An unknown name surfaces as `RowNotFound`,
    /// which the caller logs; the seed migration keeps names and
    /// [`crate::names`] in lockstep.
    async fn persist(pool: &DbPool, event: &PlatformEvent) -> Result<DbId, sqlx::Error> {
        let event_type = EventRepo::get_event_type_by_name(pool, &event.event_type)
            .await?
            .ok_or(sqlx::Error::RowNotFound)?;

        EventRepo::insert(
            pool,
            event_type.id,
            event.source_entity_type.as_deref(),
            event.source_entity_id,
            event.actor_user_id,
            &event.payload,
        )
        .await
    }
}
