//! Publisher - serializes events and hands them to the broker.
//!
//! Publishing is best-effort: [`EventPublisher::publish`] never fails the
//! caller's business operation, it only logs. Every call flushes before it
//! returns so the delivery outcome is known (and logged) by then.
//!
//! ```
//! use workforce_events::bus::InMemoryBroker;
//! use workforce_events::envelope::{EmployeeContact, EmployeeEvent};
//! use workforce_events::publisher::EventPublisher;
//!
//! let broker = InMemoryBroker::new();
//! let publisher = EventPublisher::new(broker.clone());
//!
//! publisher.publish_employee_event(&EmployeeEvent::Updated(EmployeeContact::new("u@x.com")));
//! assert_eq!(broker.len("employee-events"), 1);
//! ```

mod assignment;
mod error;

pub use assignment::{Assignment, AssignmentKind};
pub use error::PublishError;

use std::sync::mpsc;
use std::time::Duration;

use serde::Serialize;
use tracing::{error, info, warn};

use crate::bus::{DeliveryReport, Producer, Record};
use crate::envelope::{EmployeeEvent, Envelope, NotificationEvent, Topic};
use crate::ports::UserId;

/// How long a publish waits for its delivery report by default.
pub const DEFAULT_FLUSH_TIMEOUT: Duration = Duration::from_secs(10);

/// Publishes JSON events through any [`Producer`].
pub struct EventPublisher<P: Producer> {
    producer: P,
    flush_timeout: Duration,
}

impl<P: Producer> EventPublisher<P> {
    pub fn new(producer: P) -> Self {
        Self {
            producer,
            flush_timeout: DEFAULT_FLUSH_TIMEOUT,
        }
    }

    pub fn with_flush_timeout(mut self, flush_timeout: Duration) -> Self {
        self.flush_timeout = flush_timeout;
        self
    }

    pub fn producer(&self) -> &P {
        &self.producer
    }

    /// Publish `event` to `topic`, logging instead of returning any failure.
    pub fn publish<T: Serialize + ?Sized>(&self, topic: &str, event: &T) {
        if let Err(err) = self.send(topic, None, event) {
            warn!(topic, error = %err, "event not published");
        }
    }

    /// Publish `event` to `topic` and return the delivery report.
    pub fn try_publish<T: Serialize + ?Sized>(
        &self,
        topic: &str,
        event: &T,
    ) -> Result<DeliveryReport, PublishError> {
        self.send(topic, None, event)
    }

    /// Like [`try_publish`](Self::try_publish), with a message key for partition affinity.
    pub fn try_publish_keyed<T: Serialize + ?Sized>(
        &self,
        topic: &str,
        key: &str,
        event: &T,
    ) -> Result<DeliveryReport, PublishError> {
        self.send(topic, Some(key), event)
    }

    /// Publish a typed envelope to the topic it belongs on.
    pub fn publish_envelope(&self, envelope: &Envelope) {
        match envelope {
            Envelope::Employee(event) => self.publish_employee_event(event),
            Envelope::Notification(event) => self.notify(event),
        }
    }

    pub fn publish_employee_event(&self, event: &EmployeeEvent) {
        self.publish(Topic::EmployeeEvents.name(), event);
    }

    pub fn notify(&self, event: &NotificationEvent) {
        self.publish(Topic::Notifications.name(), event);
    }

    /// Publish one notification per assignee. Returns how many were delivered.
    pub fn notify_assignment(
        &self,
        assignment: &Assignment,
        assignees: impl IntoIterator<Item = UserId>,
    ) -> usize {
        let topic = Topic::Notifications.name();
        let mut delivered = 0;
        for event in assignment.notifications(assignees) {
            match self.try_publish(topic, &event) {
                Ok(_) => delivered += 1,
                Err(err) => {
                    warn!(
                        topic,
                        user_id = %event.user_id,
                        error = %err,
                        "assignment notice not published"
                    );
                }
            }
        }
        delivered
    }

    fn send<T: Serialize + ?Sized>(
        &self,
        topic: &str,
        key: Option<&str>,
        event: &T,
    ) -> Result<DeliveryReport, PublishError> {
        let payload = serde_json::to_vec(event)?;
        let mut record = Record::new(topic, payload);
        if let Some(key) = key {
            record = record.with_key(key);
        }

        let (tx, rx) = mpsc::channel();
        self.producer
            .produce(
                record,
                Box::new(move |result| {
                    match &result {
                        Ok(report) => info!(
                            topic = %report.topic,
                            partition = report.partition,
                            offset = report.offset,
                            "message delivered"
                        ),
                        Err(err) => error!(error = %err, "message delivery failed"),
                    }
                    let _ = tx.send(result);
                }),
            )
            .map_err(PublishError::Transport)?;

        if let Err(err) = self.producer.flush(self.flush_timeout) {
            warn!(topic, error = %err, "flush did not complete");
        }

        match rx.try_recv() {
            Ok(result) => result.map_err(PublishError::Delivery),
            Err(_) => Err(PublishError::Unconfirmed(self.flush_timeout)),
        }
    }
}
