//! Integration tests for the notification dispatch flow.
//!
//! Requires a running PostgreSQL instance (see `test_fixtures`); each test
//! isolates itself in its own schema.

use std::sync::Arc;

use solvehub_core::{
    CreateAnswerRequest, ListNotificationsRequest, NewNotification, NotificationBus,
    NotificationDispatcher, NotificationKind, NotificationPreferences, NotificationRepository,
    PreferenceRepository,
};
use solvehub_db::test_fixtures::TestDatabase;
use solvehub_db::{AnswerRepository, Database};

fn dispatcher_for(db: &Database, bus: NotificationBus) -> NotificationDispatcher {
    NotificationDispatcher::new(
        Arc::new(db.users.clone()),
        Arc::new(db.preferences.clone()),
        Arc::new(db.notifications.clone()),
        bus,
    )
}

#[tokio::test]
async fn test_answer_by_other_user_yields_one_unread_comment_notification() {
    let test_db = TestDatabase::new().await;
    let author = test_db.create_user("ana").await;
    let responder = test_db.create_user("bruno").await;
    let exercise_id = test_db.create_exercise(author.id, "Integrals").await;

    let bus = NotificationBus::new(32);
    let mut rx = bus.subscribe();
    let dispatcher = dispatcher_for(&test_db.db, bus);

    let answer_id = test_db
        .db
        .answers
        .insert(
            exercise_id,
            responder.id,
            CreateAnswerRequest {
                content: "Integrate by parts.".to_string(),
                parent_answer_id: None,
            },
        )
        .await
        .unwrap();

    let dispatched = dispatcher
        .dispatch(NewNotification {
            recipient_id: author.id,
            kind: NotificationKind::Comment,
            message: "bruno answered your exercise".to_string(),
            link: format!("/exercises/{}", exercise_id),
            exercise_id: Some(exercise_id),
            answer_id: Some(answer_id),
        })
        .await;
    assert!(dispatched.is_some(), "default preferences allow comment events");

    // Exactly one unread notification for the author, pointing at the exercise.
    assert_eq!(test_db.db.notifications.unread_count(author.id).await.unwrap(), 1);
    let notifications = test_db
        .db
        .notifications
        .list_for(author.id, ListNotificationsRequest::default())
        .await
        .unwrap();
    assert_eq!(notifications.len(), 1);
    let n = &notifications[0];
    assert_eq!(n.kind, NotificationKind::Comment);
    assert_eq!(n.link, format!("/exercises/{}", exercise_id));
    assert!(!n.is_read);

    // And the realtime room saw the same record.
    let event = rx.recv().await.unwrap();
    assert_eq!(event.recipient_id, author.id);
    assert_eq!(event.payload.id, n.id);

    test_db.cleanup().await;
}

#[tokio::test]
async fn test_gated_event_creates_no_record_and_no_push() {
    let test_db = TestDatabase::new().await;
    let author = test_db.create_user("carla").await;
    let exercise_id = test_db.create_exercise(author.id, "Limits").await;

    let bus = NotificationBus::new(32);
    let mut rx = bus.subscribe();
    let dispatcher = dispatcher_for(&test_db.db, bus);

    // like_on_exercise defaults to off.
    let dispatched = dispatcher
        .dispatch(NewNotification {
            recipient_id: author.id,
            kind: NotificationKind::Like,
            message: "someone liked your exercise".to_string(),
            link: format!("/exercises/{}", exercise_id),
            exercise_id: Some(exercise_id),
            answer_id: None,
        })
        .await;

    assert!(dispatched.is_none());
    assert_eq!(test_db.db.notifications.unread_count(author.id).await.unwrap(), 0);
    assert!(rx.try_recv().is_err());

    test_db.cleanup().await;
}

#[tokio::test]
async fn test_explicit_preferences_override_defaults() {
    let test_db = TestDatabase::new().await;
    let user = test_db.create_user("daniel").await;

    // No stored row: documented defaults.
    let prefs = test_db.db.preferences.effective_for(user.id).await.unwrap();
    assert_eq!(prefs, NotificationPreferences::default());

    // Opt into likes, out of exercise replies.
    test_db
        .db
        .preferences
        .upsert(
            user.id,
            NotificationPreferences {
                reply_to_exercise: false,
                reply_to_answer: true,
                like_on_exercise: true,
            },
        )
        .await
        .unwrap();

    let prefs = test_db.db.preferences.effective_for(user.id).await.unwrap();
    assert!(!prefs.reply_to_exercise);
    assert!(prefs.like_on_exercise);

    let dispatcher = dispatcher_for(&test_db.db, NotificationBus::new(32));
    let gated = dispatcher
        .dispatch(NewNotification {
            recipient_id: user.id,
            kind: NotificationKind::Comment,
            message: "x".to_string(),
            link: "/exercises/x".to_string(),
            exercise_id: None,
            answer_id: None,
        })
        .await;
    assert!(gated.is_none(), "explicit opt-out beats the default");

    let allowed = dispatcher
        .dispatch(NewNotification {
            recipient_id: user.id,
            kind: NotificationKind::Like,
            message: "y".to_string(),
            link: "/exercises/y".to_string(),
            exercise_id: None,
            answer_id: None,
        })
        .await;
    assert!(allowed.is_some(), "explicit opt-in beats the default");

    test_db.cleanup().await;
}

#[tokio::test]
async fn test_read_state_toggles() {
    let test_db = TestDatabase::new().await;
    let user = test_db.create_user("elisa").await;
    let other = test_db.create_user("fred").await;

    let n = test_db
        .db
        .notifications
        .insert(&NewNotification {
            recipient_id: user.id,
            kind: NotificationKind::Reply,
            message: "fred replied to your answer".to_string(),
            link: "/exercises/1".to_string(),
            exercise_id: None,
            answer_id: None,
        })
        .await
        .unwrap();

    // Someone else cannot toggle my notification.
    assert!(!test_db.db.notifications.set_read(n.id, other.id, true).await.unwrap());
    assert_eq!(test_db.db.notifications.unread_count(user.id).await.unwrap(), 1);

    assert!(test_db.db.notifications.set_read(n.id, user.id, true).await.unwrap());
    assert_eq!(test_db.db.notifications.unread_count(user.id).await.unwrap(), 0);

    assert!(test_db.db.notifications.set_read(n.id, user.id, false).await.unwrap());
    assert_eq!(test_db.db.notifications.mark_all_read(user.id).await.unwrap(), 1);
    assert_eq!(test_db.db.notifications.unread_count(user.id).await.unwrap(), 0);

    test_db.cleanup().await;
}
