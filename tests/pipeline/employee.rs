//! `employee-events` -> account emails.

use serde_json::json;
use workforce_events::consumer::Step;
use workforce_events::envelope::{
    EmployeeContact, EmployeeCreated, EmployeeEvent, EmployeeEventKind, Topic,
};
use workforce_events::handlers::{Processed, SkipReason};

use crate::support::{drain, Pipeline};

// ============================================================================
// Welcome email with defaults
// ============================================================================

#[test]
fn created_event_sends_one_welcome_email() {
    let pipeline = Pipeline::new();
    pipeline.publisher.publish(
        Topic::EmployeeEvents.name(),
        &json!({
            "event_type": "employee_created",
            "email": "a@x.com",
            "name": "Asha",
            "company_name": "Acme"
        }),
    );

    let mut runtime = pipeline.employee_runtime();
    let steps = drain(&mut runtime);

    assert_eq!(steps.len(), 1);
    let sent = pipeline.mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].recipients, vec!["a@x.com".to_string()]);
    assert!(sent[0].subject.contains("Acme"));
    assert!(sent[0].body.contains("Acme"));
    assert!(sent[0].body.contains("http://localhost:5173/login"));
    assert!(pipeline.store.is_empty());
}

#[test]
fn missing_login_url_and_password_use_defaults() {
    let pipeline = Pipeline::new();
    pipeline
        .publisher
        .publish_employee_event(&EmployeeEvent::Created(EmployeeCreated::new("new@x.com")));

    drain(&mut pipeline.employee_runtime());

    let email = &pipeline.mailer.sent_to("new@x.com")[0];
    assert!(email.body.starts_with("Hi New Employee,"));
    assert!(email.body.contains("http://localhost:5173/login"));
    assert!(email.body.contains("Pass@123"));
    assert_eq!(email.subject, "Welcome to Your Company Employee Management System");
}

// ============================================================================
// Routing: each event type fires its handler exactly once
// ============================================================================

#[test]
fn each_event_type_is_handled_exactly_once() {
    let pipeline = Pipeline::new();
    let events = [
        EmployeeEvent::Created(EmployeeCreated::new("c@x.com")),
        EmployeeEvent::Updated(EmployeeContact::new("u@x.com")),
        EmployeeEvent::Deactivated(EmployeeContact::new("d@x.com")),
    ];
    for event in &events {
        pipeline.publisher.publish_employee_event(event);
    }

    let steps = drain(&mut pipeline.employee_runtime());

    let kinds: Vec<_> = steps
        .iter()
        .map(|step| match step {
            Step::Handled(Processed::EmailSent { kind, .. }) => *kind,
            other => panic!("unexpected step {other:?}"),
        })
        .collect();
    assert_eq!(
        kinds,
        vec![
            EmployeeEventKind::Created,
            EmployeeEventKind::Updated,
            EmployeeEventKind::Deactivated
        ]
    );
    assert_eq!(pipeline.mailer.sent_to("u@x.com")[0].subject, "Employee Profile Updated");
    assert_eq!(pipeline.mailer.sent_to("d@x.com")[0].subject, "Account Deactivated");
    assert_eq!(pipeline.mailer.sent().len(), 3);
}

#[test]
fn unknown_event_type_sends_nothing_and_loop_continues() {
    let pipeline = Pipeline::new();
    pipeline.inject(
        Topic::EmployeeEvents,
        r#"{"event_type":"employee_something_unknown","email":"b@x.com"}"#,
    );
    pipeline.inject(
        Topic::EmployeeEvents,
        r#"{"event_type":"employee_updated","email":"after@x.com"}"#,
    );

    let mut runtime = pipeline.employee_runtime();
    let steps = drain(&mut runtime);

    assert!(matches!(
        &steps[0],
        Step::Skipped(SkipReason::Unhandled(t)) if t == "employee_something_unknown"
    ));
    assert!(matches!(steps[1], Step::Handled(_)));
    assert!(pipeline.mailer.sent_to("b@x.com").is_empty());
    assert_eq!(pipeline.mailer.sent_to("after@x.com").len(), 1);
    assert_eq!(pipeline.committed(Topic::EmployeeEvents), Some(2));
}

// ============================================================================
// Recipient checks and legacy producers
// ============================================================================

#[test]
fn missing_or_empty_email_is_skipped() {
    let pipeline = Pipeline::new();
    pipeline.inject(Topic::EmployeeEvents, r#"{"event_type":"employee_created","name":"X"}"#);
    pipeline.inject(Topic::EmployeeEvents, r#"{"event_type":"employee_updated","email":""}"#);

    let mut runtime = pipeline.employee_runtime();
    let steps = drain(&mut runtime);

    assert_eq!(steps.len(), 2);
    assert!(steps
        .iter()
        .all(|step| matches!(step, Step::Skipped(SkipReason::Decode(_)))));
    assert!(pipeline.mailer.sent().is_empty());
    assert_eq!(runtime.stats().skipped, 2);
}

#[test]
fn legacy_event_shape_is_understood() {
    let pipeline = Pipeline::new();
    pipeline.inject(
        Topic::EmployeeEvents,
        r#"{"event":"employee_deactivated","employee_id":17,"user_email":"old@x.com"}"#,
    );

    drain(&mut pipeline.employee_runtime());

    assert_eq!(pipeline.mailer.sent_to("old@x.com")[0].subject, "Account Deactivated");
}

#[test]
fn extra_fields_are_ignored() {
    let pipeline = Pipeline::new();
    pipeline.inject(
        Topic::EmployeeEvents,
        r#"{"event_type":"employee_updated","email":"u@x.com","department":"R&D","v":2}"#,
    );

    drain(&mut pipeline.employee_runtime());

    assert_eq!(pipeline.mailer.sent_to("u@x.com").len(), 1);
}
