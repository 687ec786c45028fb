//! Broadcast-backed in-process event bus.
//!
//! Every domain event flows through one shared [`EventBus`]; the durable
//! persistence writer and the notification router each hold their own
//! subscription. Dropping the bus closes the channel, which is how the
//! subscriber loops learn to shut down.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use postpilot_core::types::DbId;

/// One domain event, e.g. an advertiser sync finishing or a proposal
/// being decided.
///
/// Built with [`PlatformEvent::new`] plus the `with_*` builders; only the
/// event name is mandatory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformEvent {
    /// Dot-separated name, e.g. `"advertiser.synced"`. See [`crate::names`].
    pub event_type: String,
    /// Kind of entity the event is about (`"advertiser"`, `"job"`, ...).
    pub source_entity_type: Option<String>,
    /// Id of that entity.
    pub source_entity_id: Option<DbId>,
    /// User whose action caused the event, when there is one.
    pub actor_user_id: Option<DbId>,
    /// Event-specific JSON payload.
    pub payload: serde_json::Value,
    /// Creation time (UTC).
    pub timestamp: DateTime<Utc>,
}

impl PlatformEvent {
    /// New event of the given type with an empty payload.
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            source_entity_type: None,
            source_entity_id: None,
            actor_user_id: None,
            payload: serde_json::Value::Object(Default::default()),
            timestamp: Utc::now(),
        }
    }

    /// Record which entity the event concerns.
    pub fn with_source(mut self, entity_type: impl Into<String>, entity_id: DbId) -> Self {
        self.source_entity_type = Some(entity_type.into());
        self.source_entity_id = Some(entity_id);
        self
    }

    /// Record the user behind the event.
    pub fn with_actor(mut self, user_id: DbId) -> Self {
        self.actor_user_id = Some(user_id);
        self
    }

    /// Replace the payload.
    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}

/// Broadcast buffer size. A subscriber that falls further behind than this
/// sees `RecvError::Lagged` and skips ahead.
const DEFAULT_BUS_CAPACITY: usize = 1024;

/// Publish/subscribe hub for [`PlatformEvent`]s, shared as `Arc<EventBus>`.
pub struct EventBus {
    sender: broadcast::Sender<PlatformEvent>,
}

impl EventBus {
    /// Bus with an explicit channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Fan the event out to every live subscriber.
    ///
    /// With zero subscribers the send "fails"; that is fine, the event
    /// simply has no audience yet.
    pub fn publish(&self, event: PlatformEvent) {
        let _ = self.sender.send(event);
    }

    /// Open a subscription receiving every event published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<PlatformEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_BUS_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::broadcast::error::RecvError;

    #[tokio::test]
    async fn subscriber_sees_builder_fields() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();

        bus.publish(
            PlatformEvent::new("advertiser.synced")
                .with_source("advertiser", 42)
                .with_actor(7)
                .with_payload(serde_json::json!({ "synced": 3 })),
        );

        let got = rx.recv().await.unwrap();
        assert_eq!(got.event_type, "advertiser.synced");
        assert_eq!(got.source_entity_type.as_deref(), Some("advertiser"));
        assert_eq!(got.source_entity_id, Some(42));
        assert_eq!(got.actor_user_id, Some(7));
        assert_eq!(got.payload["synced"], 3);
    }

    #[tokio::test]
    async fn every_subscriber_gets_every_event() {
        let bus = EventBus::default();
        let mut first = bus.subscribe();
        let mut second = bus.subscribe();

        bus.publish(PlatformEvent::new("proposal.approved"));

        assert_eq!(first.recv().await.unwrap().event_type, "proposal.approved");
        assert_eq!(second.recv().await.unwrap().event_type, "proposal.approved");
    }

    #[tokio::test]
    async fn overflowing_a_slow_subscriber_reports_lag() {
        let bus = EventBus::new(1);
        let mut rx = bus.subscribe();

        bus.publish(PlatformEvent::new("first"));
        bus.publish(PlatformEvent::new("second"));

        // Capacity 1: the first event was evicted before we read it.
        match rx.recv().await {
            Err(RecvError::Lagged(skipped)) => assert_eq!(skipped, 1),
            other => panic!("expected lag, got {other:?}"),
        }
        assert_eq!(rx.recv().await.unwrap().event_type, "second");
    }

    #[test]
    fn publishing_without_subscribers_is_a_noop() {
        let bus = EventBus::default();
        bus.publish(PlatformEvent::new("unheard.event"));
    }

    #[test]
    fn bare_event_has_no_source_or_actor() {
        let event = PlatformEvent::new("bare.event");
        assert!(event.source_entity_type.is_none());
        assert!(event.source_entity_id.is_none());
        assert!(event.actor_user_id.is_none());
        assert!(event.payload.is_object());
    }
}
