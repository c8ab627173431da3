//! `notifications` -> notification rows.

use serde_json::json;
use workforce_events::consumer::Step;
use workforce_events::envelope::{NotificationEvent, Topic};
use workforce_events::handlers::{Processed, SkipReason};
use workforce_events::ports::{NotificationType, User, UserId};
use workforce_events::publisher::Assignment;

use crate::support::{drain, Pipeline};

fn project_x(user_id: i64) -> serde_json::Value {
    json!({
        "user_id": user_id,
        "message": "Assigned to Project X",
        "type": "project",
        "url": "/projects/7/"
    })
}

// ============================================================================
// Known user: one unread row
// ============================================================================

#[test]
fn known_user_gets_one_unread_notification() {
    let pipeline = Pipeline::new();
    pipeline
        .publisher
        .publish(Topic::Notifications.name(), &project_x(42));

    let steps = drain(&mut pipeline.notification_runtime());

    assert!(matches!(
        steps[0],
        Step::Handled(Processed::NotificationCreated {
            user_id: UserId(42),
            notification_type: NotificationType::Project,
            ..
        })
    ));
    let rows = pipeline.store.for_user(UserId(42));
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].notification_type, NotificationType::Project);
    assert_eq!(rows[0].message, "Assigned to Project X");
    assert_eq!(rows[0].url.as_deref(), Some("/projects/7/"));
    assert!(!rows[0].is_read);
    assert!(pipeline.mailer.sent().is_empty());
}

#[test]
fn missing_type_is_stored_as_task() {
    let pipeline = Pipeline::new();
    pipeline.inject(Topic::Notifications, r#"{"user_id": 42, "message": "Standup moved"}"#);

    drain(&mut pipeline.notification_runtime());

    let rows = pipeline.store.all();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].notification_type, NotificationType::Task);
    assert_eq!(rows[0].url, None);
}

// ============================================================================
// Lookup misses
// ============================================================================

#[test]
fn unknown_user_writes_nothing_and_loop_stays_alive() {
    let pipeline = Pipeline::new();
    pipeline
        .publisher
        .publish(Topic::Notifications.name(), &project_x(9999));
    pipeline
        .publisher
        .publish(Topic::Notifications.name(), &project_x(42));

    let mut runtime = pipeline.notification_runtime();
    let steps = drain(&mut runtime);

    assert!(matches!(steps[0], Step::Skipped(SkipReason::LookupMiss(UserId(9999)))));
    assert!(matches!(steps[1], Step::Handled(_)));
    assert!(pipeline.store.for_user(UserId(9999)).is_empty());
    assert_eq!(pipeline.store.len(), 1);
    assert_eq!(pipeline.committed(Topic::Notifications), Some(2));
}

#[test]
fn missing_or_zero_user_id_is_poison() {
    let pipeline = Pipeline::new();
    pipeline.inject(Topic::Notifications, r#"{"message": "nobody"}"#);
    pipeline.inject(Topic::Notifications, r#"{"user_id": 0, "message": "nobody"}"#);

    let steps = drain(&mut pipeline.notification_runtime());

    assert_eq!(steps.len(), 2);
    assert!(steps
        .iter()
        .all(|step| matches!(step, Step::Skipped(SkipReason::Decode(_)))));
    assert!(pipeline.store.is_empty());
}

#[test]
fn numeric_string_user_id_is_accepted() {
    let pipeline = Pipeline::new();
    pipeline.inject(Topic::Notifications, r#"{"user_id": "42", "message": "hi", "type": "bug"}"#);

    drain(&mut pipeline.notification_runtime());

    assert_eq!(pipeline.store.all()[0].notification_type, NotificationType::Bug);
}

#[test]
fn unknown_type_is_unhandled() {
    let pipeline = Pipeline::new();
    pipeline.inject(Topic::Notifications, r#"{"user_id": 42, "message": "hi", "type": "leave"}"#);

    let steps = drain(&mut pipeline.notification_runtime());

    assert!(matches!(&steps[0], Step::Skipped(SkipReason::Unhandled(t)) if t == "leave"));
    assert!(pipeline.store.is_empty());
}

// ============================================================================
// Assignment notices, producer to row
// ============================================================================

#[test]
fn assignment_notices_reach_every_assignee() {
    let pipeline = Pipeline::new();
    pipeline.users.insert(User::new(7, "u7@x.com"));

    let delivered = pipeline
        .publisher
        .notify_assignment(&Assignment::task(3, "Write docs"), [UserId(42), UserId(7)]);
    assert_eq!(delivered, 2);

    drain(&mut pipeline.notification_runtime());

    for user in [UserId(42), UserId(7)] {
        let rows = pipeline.store.for_user(user);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].message, "You have been assigned to the task 'Write docs'.");
        assert_eq!(rows[0].url.as_deref(), Some("/tasks/3/"));
        assert_eq!(rows[0].notification_type, NotificationType::Task);
    }
}

#[test]
fn duplicate_events_create_duplicate_rows() {
    let pipeline = Pipeline::new();
    let event = NotificationEvent::new(UserId(42), NotificationType::Project, "Assigned")
        .with_url("/projects/1/");
    pipeline.publisher.notify(&event);
    pipeline.publisher.notify(&event);

    drain(&mut pipeline.notification_runtime());

    assert_eq!(pipeline.store.for_user(UserId(42)).len(), 2);
}
