//! Topic-to-handler registry.

use std::collections::HashMap;
use std::sync::Arc;

use super::{EmployeeEmailHandler, EventHandler, NotificationHandler, Processed, SkipReason};
use crate::bus::Message;
use crate::envelope::Topic;
use crate::ports::{Mailer, NotificationStore, UserDirectory};

/// Maps topic names to the handler that owns them.
///
/// ```
/// use std::sync::Arc;
/// use workforce_events::bus::Message;
/// use workforce_events::handlers::{Processed, Router};
/// use workforce_events::ports::RecordingMailer;
///
/// let mailer = RecordingMailer::new();
/// let router = Router::employee_events(Arc::new(mailer.clone()));
///
/// let msg = Message::new(
///     "employee-events",
///     0,
///     0,
///     br#"{"event_type":"employee_updated","email":"u@x.com"}"#.to_vec(),
/// );
/// assert!(matches!(router.dispatch(&msg), Ok(Processed::EmailSent { .. })));
/// assert_eq!(mailer.sent_to("u@x.com").len(), 1);
/// ```
#[derive(Clone, Default)]
pub struct Router {
    handlers: HashMap<String, Arc<dyn EventHandler>>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `topic`. Returns `self` for chaining.
    pub fn route<H>(mut self, topic: &str, handler: H) -> Self
    where
        H: EventHandler + 'static,
    {
        self.handlers.insert(topic.to_string(), Arc::new(handler));
        self
    }

    /// Router for `employee-events` only.
    pub fn employee_events(mailer: Arc<dyn Mailer>) -> Self {
        Self::new().route(
            Topic::EmployeeEvents.name(),
            EmployeeEmailHandler::new(mailer),
        )
    }

    /// Router for `notifications` only.
    pub fn notifications(users: Arc<dyn UserDirectory>, store: Arc<dyn NotificationStore>) -> Self {
        Self::new().route(
            Topic::Notifications.name(),
            NotificationHandler::new(users, store),
        )
    }

    /// Hand a message to the handler registered for its topic.
    pub fn dispatch(&self, message: &Message) -> Result<Processed, SkipReason> {
        let handler = self
            .handlers
            .get(&message.topic)
            .ok_or_else(|| SkipReason::Unhandled(format!("topic {}", message.topic)))?;
        handler.handle(message)
    }

    /// Registered topic names.
    pub fn topics(&self) -> Vec<&str> {
        self.handlers.keys().map(|s| s.as_str()).collect()
    }
}

impl EventHandler for Router {
    fn handle(&self, message: &Message) -> Result<Processed, SkipReason> {
        self.dispatch(message)
    }
}
