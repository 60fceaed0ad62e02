//! Realtime notification channel.
//!
//! A broadcast-based bus distributes freshly persisted notifications to the
//! realtime endpoints (WebSocket, SSE). Each connection subscribes and
//! forwards only the events addressed to its authenticated user — the
//! per-user room. Delivery is best-effort: slow or disconnected receivers
//! miss events, and the persisted record is the durable fallback.

use serde::Serialize;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::models::Notification;

/// Wire event name for a freshly created notification.
pub const EVENT_NOTIFICATION_CREATED: &str = "notification.created";

/// A notification addressed to one recipient's room.
#[derive(Debug, Clone, Serialize)]
pub struct NotificationEvent {
    pub recipient_id: Uuid,
    /// Namespaced event name, always [`EVENT_NOTIFICATION_CREATED`].
    pub event_type: &'static str,
    /// The persisted notification record.
    pub payload: Notification,
}

impl NotificationEvent {
    pub fn created(notification: Notification) -> Self {
        Self {
            recipient_id: notification.recipient_id,
            event_type: EVENT_NOTIFICATION_CREATED,
            payload: notification,
        }
    }
}

/// Broadcast-based bus for distributing notification events.
///
/// Uses `tokio::sync::broadcast` with a configurable buffer size. Receivers
/// that fall behind get a `Lagged` error and miss events — acceptable for a
/// realtime stream whose durable source of truth is the notification table.
#[derive(Clone)]
pub struct NotificationBus {
    tx: broadcast::Sender<NotificationEvent>,
}

impl NotificationBus {
    /// Create a new bus with the given buffer capacity.
    ///
    /// Recommended: 256 for production, 32 for tests.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publish an event to all subscribers. Fire-and-forget: with no active
    /// subscribers the event is silently dropped.
    pub fn publish(&self, event: NotificationEvent) {
        let subscriber_count = self.tx.receiver_count();
        tracing::debug!(
            recipient_id = %event.recipient_id,
            notification_id = %event.payload.id,
            subscriber_count,
            "NotificationBus publish"
        );
        let _ = self.tx.send(event);
    }

    /// Subscribe to the full event stream. Callers filter by recipient.
    pub fn subscribe(&self) -> broadcast::Receiver<NotificationEvent> {
        self.tx.subscribe()
    }

    /// Number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NotificationKind;
    use chrono::Utc;

    fn sample_notification(recipient_id: Uuid) -> Notification {
        Notification {
            id: Uuid::now_v7(),
            recipient_id,
            kind: NotificationKind::Comment,
            message: "New answer on your exercise".to_string(),
            link: "/exercises/123".to_string(),
            is_read: false,
            exercise_id: None,
            answer_id: None,
            created_at_utc: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_publish_subscribe() {
        let bus = NotificationBus::new(32);
        let mut rx = bus.subscribe();

        let recipient = Uuid::new_v4();
        bus.publish(NotificationEvent::created(sample_notification(recipient)));

        let event = rx.recv().await.unwrap();
        assert_eq!(event.recipient_id, recipient);
        assert_eq!(event.event_type, EVENT_NOTIFICATION_CREATED);
        assert!(!event.payload.is_read);
    }

    #[tokio::test]
    async fn test_multiple_subscribers_each_get_a_copy() {
        let bus = NotificationBus::new(32);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.publish(NotificationEvent::created(sample_notification(Uuid::new_v4())));

        assert!(rx1.recv().await.is_ok());
        assert!(rx2.recv().await.is_ok());
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_does_not_panic() {
        let bus = NotificationBus::new(32);
        bus.publish(NotificationEvent::created(sample_notification(Uuid::new_v4())));
        assert_eq!(bus.subscriber_count(), 0);
    }
}
