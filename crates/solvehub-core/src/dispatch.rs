//! Notification dispatch.
//!
//! [`NotificationDispatcher`] is the single write path for notification
//! records: it resolves the recipient, applies the preference gate, persists
//! the record, and publishes it on the realtime bus. Delivery is best-effort
//! by policy — dispatch never returns an error, so the triggering action
//! (posting an answer, liking an exercise) cannot fail because notification
//! delivery failed.

use std::sync::Arc;

use uuid::Uuid;

use crate::events::{NotificationBus, NotificationEvent};
use crate::models::{Notification, NotificationKind};
use crate::traits::{NotificationRepository, PreferenceRepository, UserRepository};

/// A notification-worthy event, as produced by the API handlers.
#[derive(Debug, Clone)]
pub struct NewNotification {
    pub recipient_id: Uuid,
    pub kind: NotificationKind,
    pub message: String,
    /// Navigation target shown to the recipient, e.g. `/exercises/{id}`.
    pub link: String,
    pub exercise_id: Option<Uuid>,
    pub answer_id: Option<Uuid>,
}

/// Checks preferences, persists, and pushes notifications.
///
/// Holds its collaborators explicitly — including the channel-publisher
/// capability — rather than reading process-wide state.
#[derive(Clone)]
pub struct NotificationDispatcher {
    users: Arc<dyn UserRepository>,
    preferences: Arc<dyn PreferenceRepository>,
    notifications: Arc<dyn NotificationRepository>,
    bus: NotificationBus,
}

impl NotificationDispatcher {
    pub fn new(
        users: Arc<dyn UserRepository>,
        preferences: Arc<dyn PreferenceRepository>,
        notifications: Arc<dyn NotificationRepository>,
        bus: NotificationBus,
    ) -> Self {
        Self {
            users,
            preferences,
            notifications,
            bus,
        }
    }

    /// Dispatch one notification.
    ///
    /// Returns the persisted record, or `None` when the recipient is absent
    /// or inactive, the controlling preference flag is off, or any step
    /// failed. Failures are logged at `warn` and swallowed.
    pub async fn dispatch(&self, req: NewNotification) -> Option<Notification> {
        // 1. Resolve the recipient; absent or deactivated aborts silently.
        let recipient = match self.users.fetch(req.recipient_id).await {
            Ok(Some(user)) if user.is_active => user,
            Ok(_) => {
                tracing::debug!(
                    subsystem = "dispatch",
                    recipient_id = %req.recipient_id,
                    "Recipient absent or inactive, dropping notification"
                );
                return None;
            }
            Err(e) => {
                tracing::warn!(
                    subsystem = "dispatch",
                    recipient_id = %req.recipient_id,
                    error = %e,
                    "Recipient lookup failed, dropping notification"
                );
                return None;
            }
        };

        // 2. Preference gate.
        let prefs = match self.preferences.effective_for(recipient.id).await {
            Ok(prefs) => prefs,
            Err(e) => {
                tracing::warn!(
                    subsystem = "dispatch",
                    recipient_id = %recipient.id,
                    error = %e,
                    "Preference lookup failed, dropping notification"
                );
                return None;
            }
        };
        if !prefs.allows(req.kind) {
            tracing::debug!(
                subsystem = "dispatch",
                recipient_id = %recipient.id,
                kind = req.kind.as_str(),
                "Preference flag off, dropping notification"
            );
            return None;
        }

        // 3. Persist.
        let notification = match self.notifications.insert(&req).await {
            Ok(n) => n,
            Err(e) => {
                tracing::warn!(
                    subsystem = "dispatch",
                    recipient_id = %recipient.id,
                    kind = req.kind.as_str(),
                    error = %e,
                    "Failed to persist notification"
                );
                return None;
            }
        };

        // 4. Push to the recipient's room. The persisted record is the
        // durable fallback for offline recipients.
        self.bus
            .publish(NotificationEvent::created(notification.clone()));

        Some(notification)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, Result};
    use crate::models::{
        ListNotificationsRequest, NotificationPreferences, Role, UpdateProfileRequest, User,
    };
    use crate::traits::NewUser;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::collections::HashMap;
    use std::sync::Mutex;

    fn sample_user(id: Uuid, active: bool) -> User {
        User {
            id,
            username: format!("user-{}", id.simple()),
            email: format!("{}@example.com", id.simple()),
            password_hash: "$argon2id$stub".to_string(),
            display_name: None,
            bio: None,
            avatar_url: None,
            role: Role::Student,
            is_active: active,
            created_at_utc: Utc::now(),
            updated_at_utc: Utc::now(),
        }
    }

    #[derive(Default)]
    struct FakeUsers {
        users: Mutex<HashMap<Uuid, User>>,
    }

    #[async_trait]
    impl UserRepository for FakeUsers {
        async fn insert(&self, _user: NewUser) -> Result<User> {
            unimplemented!()
        }

        async fn fetch(&self, id: Uuid) -> Result<Option<User>> {
            Ok(self.users.lock().unwrap().get(&id).cloned())
        }

        async fn fetch_by_login(&self, _login: &str) -> Result<Option<User>> {
            unimplemented!()
        }

        async fn fetch_by_username(&self, _username: &str) -> Result<Option<User>> {
            unimplemented!()
        }

        async fn update_profile(&self, _id: Uuid, _req: UpdateProfileRequest) -> Result<User> {
            unimplemented!()
        }

        async fn set_active(&self, _id: Uuid, _active: bool) -> Result<()> {
            unimplemented!()
        }

        async fn set_saved(&self, _u: Uuid, _e: Uuid, _saved: bool) -> Result<()> {
            unimplemented!()
        }

        async fn set_completed(&self, _u: Uuid, _e: Uuid, _completed: bool) -> Result<()> {
            unimplemented!()
        }
    }

    #[derive(Default)]
    struct FakePreferences {
        stored: Mutex<HashMap<Uuid, NotificationPreferences>>,
    }

    #[async_trait]
    impl PreferenceRepository for FakePreferences {
        async fn effective_for(&self, user_id: Uuid) -> Result<NotificationPreferences> {
            Ok(self
                .stored
                .lock()
                .unwrap()
                .get(&user_id)
                .copied()
                .unwrap_or_default())
        }

        async fn upsert(&self, user_id: Uuid, prefs: NotificationPreferences) -> Result<()> {
            self.stored.lock().unwrap().insert(user_id, prefs);
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakeNotifications {
        records: Mutex<Vec<Notification>>,
        fail: bool,
    }

    #[async_trait]
    impl NotificationRepository for FakeNotifications {
        async fn insert(&self, req: &NewNotification) -> Result<Notification> {
            if self.fail {
                return Err(Error::Internal("insert failed".to_string()));
            }
            let n = Notification {
                id: Uuid::now_v7(),
                recipient_id: req.recipient_id,
                kind: req.kind,
                message: req.message.clone(),
                link: req.link.clone(),
                is_read: false,
                exercise_id: req.exercise_id,
                answer_id: req.answer_id,
                created_at_utc: Utc::now(),
            };
            self.records.lock().unwrap().push(n.clone());
            Ok(n)
        }

        async fn list_for(
            &self,
            _recipient_id: Uuid,
            _req: ListNotificationsRequest,
        ) -> Result<Vec<Notification>> {
            unimplemented!()
        }

        async fn unread_count(&self, _recipient_id: Uuid) -> Result<i64> {
            unimplemented!()
        }

        async fn set_read(&self, _id: Uuid, _recipient: Uuid, _read: bool) -> Result<bool> {
            unimplemented!()
        }

        async fn mark_all_read(&self, _recipient: Uuid) -> Result<u64> {
            unimplemented!()
        }
    }

    struct Harness {
        users: Arc<FakeUsers>,
        preferences: Arc<FakePreferences>,
        notifications: Arc<FakeNotifications>,
        bus: NotificationBus,
        dispatcher: NotificationDispatcher,
    }

    fn harness() -> Harness {
        let users = Arc::new(FakeUsers::default());
        let preferences = Arc::new(FakePreferences::default());
        let notifications = Arc::new(FakeNotifications::default());
        let bus = NotificationBus::new(32);
        let dispatcher = NotificationDispatcher::new(
            users.clone(),
            preferences.clone(),
            notifications.clone(),
            bus.clone(),
        );
        Harness {
            users,
            preferences,
            notifications,
            bus,
            dispatcher,
        }
    }

    fn comment_for(recipient_id: Uuid) -> NewNotification {
        NewNotification {
            recipient_id,
            kind: NotificationKind::Comment,
            message: "user-b answered your exercise".to_string(),
            link: "/exercises/42".to_string(),
            exercise_id: Some(Uuid::new_v4()),
            answer_id: Some(Uuid::new_v4()),
        }
    }

    #[tokio::test]
    async fn test_dispatch_persists_and_publishes_with_default_prefs() {
        let h = harness();
        let recipient = Uuid::new_v4();
        h.users
            .users
            .lock()
            .unwrap()
            .insert(recipient, sample_user(recipient, true));
        let mut rx = h.bus.subscribe();

        let result = h.dispatcher.dispatch(comment_for(recipient)).await;

        let record = result.expect("comment notification should dispatch by default");
        assert_eq!(record.recipient_id, recipient);
        assert!(!record.is_read);
        assert_eq!(h.notifications.records.lock().unwrap().len(), 1);

        let event = rx.recv().await.unwrap();
        assert_eq!(event.recipient_id, recipient);
        assert_eq!(event.payload.id, record.id);
    }

    #[tokio::test]
    async fn test_dispatch_like_dropped_by_default_prefs() {
        let h = harness();
        let recipient = Uuid::new_v4();
        h.users
            .users
            .lock()
            .unwrap()
            .insert(recipient, sample_user(recipient, true));
        let mut rx = h.bus.subscribe();

        let result = h
            .dispatcher
            .dispatch(NewNotification {
                kind: NotificationKind::Like,
                ..comment_for(recipient)
            })
            .await;

        assert!(result.is_none());
        assert!(h.notifications.records.lock().unwrap().is_empty());
        assert!(rx.try_recv().is_err(), "no realtime push for a gated event");
    }

    #[tokio::test]
    async fn test_dispatch_respects_explicit_opt_out() {
        let h = harness();
        let recipient = Uuid::new_v4();
        h.users
            .users
            .lock()
            .unwrap()
            .insert(recipient, sample_user(recipient, true));
        h.preferences
            .upsert(
                recipient,
                NotificationPreferences {
                    reply_to_exercise: false,
                    reply_to_answer: true,
                    like_on_exercise: false,
                },
            )
            .await
            .unwrap();

        let result = h.dispatcher.dispatch(comment_for(recipient)).await;

        assert!(result.is_none());
        assert!(h.notifications.records.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_dispatch_unknown_recipient_aborts_silently() {
        let h = harness();
        let result = h.dispatcher.dispatch(comment_for(Uuid::new_v4())).await;
        assert!(result.is_none());
        assert!(h.notifications.records.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_dispatch_inactive_recipient_aborts_silently() {
        let h = harness();
        let recipient = Uuid::new_v4();
        h.users
            .users
            .lock()
            .unwrap()
            .insert(recipient, sample_user(recipient, false));

        let result = h.dispatcher.dispatch(comment_for(recipient)).await;
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_dispatch_swallows_persistence_failure() {
        let users = Arc::new(FakeUsers::default());
        let recipient = Uuid::new_v4();
        users
            .users
            .lock()
            .unwrap()
            .insert(recipient, sample_user(recipient, true));
        let notifications = Arc::new(FakeNotifications {
            records: Mutex::new(Vec::new()),
            fail: true,
        });
        let dispatcher = NotificationDispatcher::new(
            users,
            Arc::new(FakePreferences::default()),
            notifications,
            NotificationBus::new(32),
        );

        // Must not panic or propagate the repository error.
        let result = dispatcher.dispatch(comment_for(recipient)).await;
        assert!(result.is_none());
    }
}
