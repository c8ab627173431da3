//! Failure isolation and commit timing.

use std::time::Duration;

use workforce_events::bus::{Consumer, Message};
use workforce_events::consumer::{ConsumerRuntime, RetryPolicy, Step};
use workforce_events::envelope::Topic;
use workforce_events::handlers::{Processed, Router, SkipReason};

use crate::support::{drain, Pipeline, POLL_TIMEOUT};

const WELCOME: &str =
    r#"{"event_type":"employee_created","email":"a@x.com","name":"Asha","company_name":"Acme"}"#;

// ============================================================================
// Poison messages
// ============================================================================

#[test]
fn non_json_body_is_skipped_and_next_message_succeeds() {
    let pipeline = Pipeline::new();
    pipeline.inject(Topic::EmployeeEvents, "not-json-at-all");
    pipeline.inject(Topic::EmployeeEvents, WELCOME);

    let mut runtime = pipeline.employee_runtime();
    let steps = drain(&mut runtime);

    assert!(matches!(steps[0], Step::Skipped(SkipReason::Decode(_))));
    assert!(matches!(steps[1], Step::Handled(_)));
    assert_eq!(pipeline.mailer.sent().len(), 1);
    assert!(pipeline.store.is_empty());
    // The poison message's offset advanced with everything else.
    assert_eq!(pipeline.committed(Topic::EmployeeEvents), Some(2));
}

#[test]
fn malformed_payloads_never_stop_the_loop() {
    let pipeline = Pipeline::new();
    let poison = [
        "",
        "null",
        "[]",
        "\"just a string\"",
        "{\"event_type\": 5, \"email\": \"a@x.com\"}",
        "{\"email\": \"a@x.com\"}",
        "{\"user_id\": 42",
    ];
    for payload in poison {
        pipeline.inject(Topic::EmployeeEvents, payload);
    }
    pipeline.inject(Topic::EmployeeEvents, WELCOME);

    let mut runtime = pipeline.employee_runtime();
    let steps = drain(&mut runtime);

    assert_eq!(steps.len(), poison.len() + 1);
    assert!(steps[..poison.len()]
        .iter()
        .all(|step| matches!(step, Step::Skipped(SkipReason::Decode(_)))));
    assert!(matches!(steps[poison.len()], Step::Handled(_)));
    assert_eq!(pipeline.mailer.sent_to("a@x.com").len(), 1);
}

#[test]
fn invalid_utf8_is_poison() {
    let pipeline = Pipeline::new();
    pipeline.broker.inject(Topic::Notifications.name(), vec![0xff, 0xfe, 0x00]);

    let steps = drain(&mut pipeline.notification_runtime());

    assert!(matches!(steps[0], Step::Skipped(SkipReason::Decode(_))));
}

// ============================================================================
// Collaborator failures
// ============================================================================

#[test]
fn failing_mailer_skips_by_default() {
    let pipeline = Pipeline::new();
    pipeline.mailer.fail_next(1);
    pipeline.inject(Topic::EmployeeEvents, WELCOME);
    pipeline.inject(Topic::EmployeeEvents, WELCOME);

    let mut runtime = pipeline.employee_runtime();
    let steps = drain(&mut runtime);

    assert!(matches!(steps[0], Step::Skipped(SkipReason::Sink(_))));
    assert!(matches!(steps[1], Step::Handled(_)));
    assert_eq!(pipeline.mailer.sent().len(), 1);
    assert_eq!(runtime.stats().retries, 0);
    assert_eq!(pipeline.committed(Topic::EmployeeEvents), Some(2));
}

#[test]
fn retry_policy_recovers_from_transient_store_failure() {
    let pipeline = Pipeline::new();
    pipeline.store.fail_next(2);
    pipeline.inject(Topic::Notifications, r#"{"user_id": 42, "message": "retry me"}"#);

    let mut runtime = pipeline
        .notification_runtime()
        .with_retry(RetryPolicy::attempts(3, Duration::from_millis(1)));
    let steps = drain(&mut runtime);

    assert!(matches!(steps[0], Step::Handled(Processed::NotificationCreated { .. })));
    assert_eq!(pipeline.store.len(), 1);
    assert_eq!(runtime.stats().retries, 2);
}

#[test]
fn retries_are_bounded() {
    let pipeline = Pipeline::new();
    pipeline.users.fail_next(10);
    pipeline.inject(Topic::Notifications, r#"{"user_id": 42, "message": "never"}"#);

    let mut runtime = pipeline
        .notification_runtime()
        .with_retry(RetryPolicy::attempts(2, Duration::ZERO));
    let steps = drain(&mut runtime);

    assert!(matches!(steps[0], Step::Skipped(SkipReason::Sink(_))));
    assert_eq!(runtime.stats().retries, 1);
    assert!(pipeline.store.is_empty());
    assert_eq!(pipeline.committed(Topic::Notifications), Some(1));
}

#[test]
fn panicking_handler_does_not_kill_the_loop() {
    let pipeline = Pipeline::new();
    pipeline.inject(Topic::EmployeeEvents, "explode");
    pipeline.inject(Topic::EmployeeEvents, WELCOME);

    let employee = pipeline.employee_router();
    let router = Router::new().route(Topic::EmployeeEvents.name(), move |message: &Message| {
        if message.payload_str() == Some("explode") {
            panic!("mail template missing");
        }
        employee.dispatch(message)
    });
    let mut runtime = pipeline.runtime(Topic::EmployeeEvents, router);
    let steps = drain(&mut runtime);

    assert!(matches!(
        &steps[0],
        Step::Skipped(SkipReason::Panicked(p)) if p == "mail template missing"
    ));
    assert!(matches!(steps[1], Step::Handled(_)));
    assert_eq!(pipeline.committed(Topic::EmployeeEvents), Some(2));
}

// ============================================================================
// Transport errors
// ============================================================================

#[test]
fn broker_outage_is_survived() {
    let pipeline = Pipeline::new();
    let mut runtime = pipeline.employee_runtime();

    pipeline.broker.set_unavailable(true);
    assert!(matches!(runtime.poll_once(), Step::TransportError));
    assert!(matches!(runtime.poll_once(), Step::TransportError));

    pipeline.broker.set_unavailable(false);
    pipeline.inject(Topic::EmployeeEvents, WELCOME);
    let steps = drain(&mut runtime);

    assert!(matches!(steps[0], Step::Handled(_)));
    assert_eq!(runtime.stats().transport_errors, 2);
}

#[test]
fn failed_commit_leads_to_redelivery() {
    let pipeline = Pipeline::new();
    pipeline.inject(Topic::EmployeeEvents, WELCOME);

    // Handled, but the commit cannot reach the broker.
    let consumer = pipeline
        .broker
        .consumer("employee-group", Topic::EmployeeEvents.name());
    let message = consumer.poll(POLL_TIMEOUT).unwrap().unwrap();
    pipeline.broker.set_unavailable(true);
    assert!(consumer.commit(&message).is_err());
    consumer.close();
    pipeline.broker.set_unavailable(false);

    // The next member of the group starts from the last committed offset.
    let steps = drain(&mut pipeline.employee_runtime());
    assert_eq!(steps.len(), 1);
    assert_eq!(pipeline.committed(Topic::EmployeeEvents), Some(1));
}

// ============================================================================
// At-least-once
// ============================================================================

#[test]
fn uncommitted_message_is_redelivered_to_the_group() {
    let pipeline = Pipeline::new();
    pipeline.inject(Topic::Notifications, r#"{"user_id": 42, "message": "one"}"#);
    pipeline.inject(Topic::Notifications, r#"{"user_id": 42, "message": "two"}"#);

    // First member handles "one", then dies after receiving "two".
    let mut first = pipeline.notification_runtime();
    assert!(matches!(first.poll_once(), Step::Handled(_)));
    let crashed = pipeline
        .broker
        .consumer("notification-group", Topic::Notifications.name());
    let _in_flight = crashed.poll(POLL_TIMEOUT).unwrap().unwrap();
    drop(crashed);
    drop(first);

    let steps = drain(&mut pipeline.notification_runtime());

    assert_eq!(steps.len(), 1);
    let messages: Vec<_> = pipeline.store.all().into_iter().map(|n| n.message).collect();
    assert_eq!(messages, vec!["one", "two"]);
}

#[test]
fn groups_consume_independently() {
    let pipeline = Pipeline::new();
    pipeline.inject(Topic::EmployeeEvents, WELCOME);

    drain(&mut pipeline.employee_runtime());
    let mut migration = ConsumerRuntime::new(
        pipeline
            .broker
            .consumer("migration-group", Topic::EmployeeEvents.name()),
        pipeline.employee_router(),
    )
    .with_poll_timeout(POLL_TIMEOUT);
    drain(&mut migration);

    // Same message, two groups, two emails.
    assert_eq!(pipeline.mailer.sent_to("a@x.com").len(), 2);
}
