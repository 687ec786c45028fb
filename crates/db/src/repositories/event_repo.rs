//! Queries for the `event_types` lookup and the `events` audit table.
//!
//! Events are append-only from the application's point of view: the
//! persistence subscriber inserts rows, and nothing edits them afterwards.

use sqlx::PgPool;

use postpilot_core::types::DbId;

use crate::models::event::EventType;

const EVENT_TYPE_COLUMNS: &str = "id, name, category, description, created_at, updated_at";

pub struct EventRepo;

impl EventRepo {
    /// Resolve a dot-separated event name (e.g. `"proposal.approved"`) to
    /// its seeded lookup row.
    pub async fn get_event_type_by_name(
        pool: &PgPool,
        name: &str,
    ) -> Result<Option<EventType>, sqlx::Error> {
        let query = format!("SELECT {EVENT_TYPE_COLUMNS} FROM event_types WHERE name = $1");
        sqlx::query_as::<_, EventType>(&query)
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    /// Append one event row and return its id.
    pub async fn insert(
        pool: &PgPool,
        event_type_id: DbId,
        source_entity_type: Option<&str>,
        source_entity_id: Option<DbId>,
        actor_user_id: Option<DbId>,
        payload: &serde_json::Value,
    ) -> Result<DbId, sqlx::Error> {
        sqlx::query_scalar(
            "INSERT INTO events (event_type_id, source_entity_type, source_entity_id,
                 actor_user_id, payload)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id",
        )
        .bind(event_type_id)
        .bind(source_entity_type)
        .bind(source_entity_id)
        .bind(actor_user_id)
        .bind(payload)
        .fetch_one(pool)
        .await
    }
}
