//! Turns platform events into user notifications.
//!
//! [`NotificationRouter`] subscribes to the event bus and, for each
//! event, determines the affected user and creates an in-app
//! notification with a Korean title and body. When email delivery is
//! configured, the same message also goes to the user's address.

use std::sync::Arc;

use tokio::sync::broadcast;

use postpilot_core::types::DbId;
use postpilot_db::models::notification::CreateNotification;
use postpilot_db::repositories::{NotificationRepo, UserRepo};
use postpilot_db::DbPool;
use postpilot_events::{names, EmailDelivery, PlatformEvent};

/// Consumes the event stream and writes notification rows.
///
/// For each event the recipient is resolved from the payload; events
/// with no identifiable recipient (e.g. a scheduled trend refresh with
/// no requesting admin) are dropped silently.
pub struct NotificationRouter {
    pool: DbPool,
    email: Option<Arc<EmailDelivery>>,
}

impl NotificationRouter {
    /// Create a new router. `email` is `None` when SMTP is not configured.
    pub fn new(pool: DbPool, email: Option<Arc<EmailDelivery>>) -> Self {
        Self { pool, email }
    }

    /// Routing loop. Processes events from `receiver` until the channel
    /// closes, which happens when the
    /// [`EventBus`](postpilot_events::EventBus) is dropped at shutdown.
    pub async fn run(self, mut receiver: broadcast::Receiver<PlatformEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    if let Err(e) = self.route_event(&event).await {
                        tracing::error!(
                            error = %e,
                            event_type = %event.event_type,
                            "Notification routing failed"
                        );
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Notification router lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Bus closed, notification router stopping");
                    break;
                }
            }
        }
    }

    /// Route a single event to its recipient.
    async fn route_event(
        &self,
        event: &PlatformEvent,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let Some(user_id) = determine_recipient(event) else {
            return Ok(());
        };

        let Some((title, body)) = render_message(event) else {
            tracing::debug!(event_type = %event.event_type, "No notification template for event");
            return Ok(());
        };

        // The notification row carries an FK to the persisted event.
        let event_id = self.find_latest_event_id(&event.event_type).await;

        NotificationRepo::create(
            &self.pool,
            &CreateNotification {
                user_id,
                event_id,
                title: title.clone(),
                body: body.clone(),
            },
        )
        .await?;

        if let Some(email) = &self.email {
            self.deliver_email(email, user_id, &title, body.as_deref())
                .await;
        }

        Ok(())
    }

    /// Newest persisted event row with the given type name, if any.
    ///
    /// Persistence runs asynchronously on its own subscription, so the
    /// row may not exist yet when we look; the notification is then
    /// stored without an event link.
    async fn find_latest_event_id(&self, event_type_name: &str) -> Option<DbId> {
        sqlx::query_scalar::<_, DbId>(
            "SELECT id FROM events \
             WHERE event_type_id = (SELECT id FROM event_types WHERE name = $1) \
             ORDER BY id DESC LIMIT 1",
        )
        .bind(event_type_name)
        .fetch_optional(&self.pool)
        .await
        .ok()
        .flatten()
    }

    /// Send the notification text to the user's email address.
    ///
    /// Failures are logged and swallowed; the in-app row is already written
    /// and email is a secondary channel.
    async fn deliver_email(
        &self,
        email: &EmailDelivery,
        user_id: DbId,
        title: &str,
        body: Option<&str>,
    ) {
        let user = match UserRepo::find_by_id(&self.pool, user_id).await {
            Ok(Some(user)) => user,
            Ok(None) => return,
            Err(e) => {
                tracing::warn!(error = %e, user_id, "Failed to load user for email delivery");
                return;
            }
        };

        if let Err(e) = email
            .deliver(&user.email, title, body.unwrap_or(title))
            .await
        {
            tracing::warn!(error = %e, user_id, "Failed to send notification email");
        }
    }
}

/// Determine which user should receive a notification for the event.
///
/// Each event type carries its recipient in a well-known payload field,
/// falling back to the event actor. Returns `None` when neither is present.
fn determine_recipient(event: &PlatformEvent) -> Option<DbId> {
    let field = match event.event_type.as_str() {
        // Sync events: notify the advertiser owner.
        names::ADVERTISER_SYNCED | names::ADVERTISER_SYNC_FAILED => "owner_id",

        // Bulk generation and trend refresh: notify the job submitter.
        names::CONTENT_BULK_GENERATED | names::TRENDS_REFRESHED => "submitted_by",

        // Proposal lifecycle: notify the user who sent the proposal.
        names::PROPOSAL_APPROVED | names::PROPOSAL_REJECTED | names::PROPOSAL_EXPIRED => {
            "created_by"
        }

        _ => return event.actor_user_id,
    };

    payload_user(event, field).or(event.actor_user_id)
}

/// Extract a user id from a payload field, tolerating JSON numbers and strings.
fn payload_user(event: &PlatformEvent, field: &str) -> Option<DbId> {
    let value = event.payload.get(field)?;
    value
        .as_i64()
        .or_else(|| value.as_str().and_then(|s| s.parse().ok()))
}

/// Build the Korean notification title and body for an event.
///
/// Returns `None` for event types that have no user-facing message.
fn render_message(event: &PlatformEvent) -> Option<(String, Option<String>)> {
    let payload = &event.payload;
    let str_field = |f: &str| payload.get(f).and_then(|v| v.as_str()).unwrap_or("");
    let num_field = |f: &str| payload.get(f).and_then(|v| v.as_i64()).unwrap_or(0);

    let (title, body) = match event.event_type.as_str() {
        names::ADVERTISER_SYNCED => (
            "채널 동기화 완료".to_string(),
            format!(
                "{}의 채널 정보가 업데이트되었습니다.",
                str_field("advertiser_name")
            ),
        ),
        names::ADVERTISER_SYNC_FAILED => (
            "채널 동기화 실패".to_string(),
            format!(
                "{}의 채널 수집에 실패했습니다. 채널 정보를 확인해 주세요.",
                str_field("advertiser_name")
            ),
        ),
        names::CONTENT_BULK_GENERATED => {
            let created = num_field("created");
            let failed = num_field("failed");
            let body = if failed > 0 {
                format!("초안 {created}건이 생성되었습니다 ({failed}건 실패).")
            } else {
                format!("초안 {created}건이 생성되었습니다.")
            };
            ("콘텐츠 생성 완료".to_string(), body)
        }
        names::PROPOSAL_APPROVED => (
            "제안 승인".to_string(),
            format!("'{}' 제안이 승인되었습니다.", str_field("title")),
        ),
        names::PROPOSAL_REJECTED => (
            "제안 반려".to_string(),
            format!("'{}' 제안이 반려되었습니다.", str_field("title")),
        ),
        names::PROPOSAL_EXPIRED => (
            "제안 만료".to_string(),
            format!(
                "'{}' 제안이 응답 없이 만료되었습니다.",
                str_field("title")
            ),
        ),
        names::TRENDS_REFRESHED => (
            "트렌드 갱신 완료".to_string(),
            format!("트렌드 키워드 {}개를 수집했습니다.", num_field("collected")),
        ),
        _ => return None,
    };

    Some((title, Some(body)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event(event_type: &str, payload: serde_json::Value) -> PlatformEvent {
        PlatformEvent::new(event_type).with_payload(payload)
    }

    #[test]
    fn sync_events_target_the_advertiser_owner() {
        let e = event(names::ADVERTISER_SYNCED, json!({ "owner_id": 7 }));
        assert_eq!(determine_recipient(&e), Some(7));
    }

    #[test]
    fn proposal_events_target_the_creator() {
        let e = event(names::PROPOSAL_APPROVED, json!({ "created_by": 3 }));
        assert_eq!(determine_recipient(&e), Some(3));
    }

    #[test]
    fn missing_recipient_falls_back_to_actor() {
        let e = event(names::TRENDS_REFRESHED, json!({})).with_actor(9);
        assert_eq!(determine_recipient(&e), Some(9));
    }

    #[test]
    fn no_recipient_yields_none() {
        let e = event(names::ADVERTISER_SYNC_FAILED, json!({}));
        assert_eq!(determine_recipient(&e), None);
    }

    #[test]
    fn payload_user_accepts_string_ids() {
        let e = event(names::ADVERTISER_SYNCED, json!({ "owner_id": "12" }));
        assert_eq!(determine_recipient(&e), Some(12));
    }

    #[test]
    fn bulk_generated_message_mentions_failures() {
        let e = event(
            names::CONTENT_BULK_GENERATED,
            json!({ "created": 4, "failed": 2 }),
        );
        let (title, body) = render_message(&e).unwrap();
        assert_eq!(title, "콘텐츠 생성 완료");
        assert!(body.unwrap().contains("2건 실패"));
    }

    #[test]
    fn unknown_event_type_has_no_message() {
        let e = event("something.else", json!({}));
        assert!(render_message(&e).is_none());
    }
}
