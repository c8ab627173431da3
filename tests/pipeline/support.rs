//! Shared wiring: one in-memory broker, recording ports, and a runtime per topic.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use workforce_events::bus::{Consumer, InMemoryBroker, InMemoryConsumer, Message};
use workforce_events::consumer::{ConsumerRuntime, Step};
use workforce_events::envelope::Topic;
use workforce_events::handlers::Router;
use workforce_events::ports::{
    InMemoryNotificationStore, InMemoryUserDirectory, RecordingMailer, User,
};
use workforce_events::publisher::EventPublisher;

pub const POLL_TIMEOUT: Duration = Duration::from_millis(5);

pub struct Pipeline {
    pub broker: InMemoryBroker,
    pub publisher: EventPublisher<InMemoryBroker>,
    pub mailer: RecordingMailer,
    pub users: InMemoryUserDirectory,
    pub store: InMemoryNotificationStore,
}

impl Pipeline {
    /// A pipeline whose user directory knows user 42.
    pub fn new() -> Self {
        let broker = InMemoryBroker::new();
        Self {
            publisher: EventPublisher::new(broker.clone()),
            broker,
            mailer: RecordingMailer::new(),
            users: InMemoryUserDirectory::with_users([User::new(42, "u42@x.com")]),
            store: InMemoryNotificationStore::new(),
        }
    }

    pub fn employee_router(&self) -> Router {
        Router::employee_events(Arc::new(self.mailer.clone()))
    }

    pub fn notification_router(&self) -> Router {
        Router::notifications(Arc::new(self.users.clone()), Arc::new(self.store.clone()))
    }

    /// A runtime in the deployed `employee-group`.
    pub fn employee_runtime(&self) -> ConsumerRuntime<InMemoryConsumer> {
        self.runtime(Topic::EmployeeEvents, self.employee_router())
    }

    /// A runtime in the deployed `notification-group`.
    pub fn notification_runtime(&self) -> ConsumerRuntime<InMemoryConsumer> {
        self.runtime(Topic::Notifications, self.notification_router())
    }

    pub fn runtime(&self, topic: Topic, router: Router) -> ConsumerRuntime<InMemoryConsumer> {
        ConsumerRuntime::new(
            self.broker.consumer(topic.consumer_group(), topic.name()),
            router,
        )
        .with_poll_timeout(POLL_TIMEOUT)
    }

    /// Write a raw value straight onto `topic`, bypassing the publisher.
    pub fn inject(&self, topic: Topic, payload: &str) -> Message {
        self.broker.inject(topic.name(), payload)
    }

    pub fn committed(&self, topic: Topic) -> Option<i64> {
        self.broker
            .committed_offset(topic.consumer_group(), topic.name())
    }
}

/// Poll until the topic is drained, returning every non-idle step.
pub fn drain<C: Consumer>(runtime: &mut ConsumerRuntime<C>) -> Vec<Step> {
    let mut steps = Vec::new();
    loop {
        match runtime.poll_once() {
            Step::Idle | Step::Closed => return steps,
            step => steps.push(step),
        }
    }
}
