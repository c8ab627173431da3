//! Event Envelope - the wire contract between publishers and consumers.
//!
//! Every message value is a UTF-8 JSON object. Each topic has one shape,
//! decoded at the boundary into a sum type so handlers are statically typed
//! while the wire stays schemaless:
//!
//! | topic             | discriminator | values                                                   |
//! |-------------------|---------------|----------------------------------------------------------|
//! | `employee-events` | `event_type`  | `employee_created`, `employee_updated`, `employee_deactivated` |
//! | `notifications`   | `type`        | `project`, `task`, `bug` (default `task`)                |
//!
//! Consumers tolerate unknown extra fields and missing optional fields.
//! There is no sequence number or key: ordering is whatever the broker
//! partition delivers.

mod employee;
mod error;
mod notification;
mod topic;

pub use employee::{
    EmployeeContact, EmployeeCreated, EmployeeEvent, EmployeeEventKind, DEFAULT_COMPANY_NAME,
    DEFAULT_EMPLOYEE_NAME, DEFAULT_LOGIN_URL, DEFAULT_PASSWORD,
};
pub use error::DecodeError;
pub use notification::NotificationEvent;
pub use topic::{
    Topic, UnknownTopic, EMPLOYEE_EVENTS_TOPIC, EMPLOYEE_GROUP, NOTIFICATIONS_TOPIC,
    NOTIFICATION_GROUP,
};

use serde_json::Value;

/// A decoded message from any known topic.
#[derive(Clone, Debug, PartialEq)]
pub enum Envelope {
    Employee(EmployeeEvent),
    Notification(NotificationEvent),
}

impl Envelope {
    /// Decode `payload` with the shape belonging to `topic`.
    pub fn decode(topic: Topic, payload: &[u8]) -> Result<Self, DecodeError> {
        match topic {
            Topic::EmployeeEvents => EmployeeEvent::decode(payload).map(Envelope::Employee),
            Topic::Notifications => NotificationEvent::decode(payload).map(Envelope::Notification),
        }
    }

    /// The topic this envelope is published on.
    pub fn topic(&self) -> Topic {
        match self {
            Envelope::Employee(_) => Topic::EmployeeEvents,
            Envelope::Notification(_) => Topic::Notifications,
        }
    }

    /// Serialize to the JSON bytes written as the message value.
    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        match self {
            Envelope::Employee(event) => serde_json::to_vec(event),
            Envelope::Notification(event) => serde_json::to_vec(event),
        }
    }
}

impl From<EmployeeEvent> for Envelope {
    fn from(event: EmployeeEvent) -> Self {
        Envelope::Employee(event)
    }
}

impl From<NotificationEvent> for Envelope {
    fn from(event: NotificationEvent) -> Self {
        Envelope::Notification(event)
    }
}

/// Parse a message value that must be a JSON object.
fn parse_object(payload: &[u8]) -> Result<Value, DecodeError> {
    let value: Value =
        serde_json::from_slice(payload).map_err(|e| DecodeError::InvalidJson(e.to_string()))?;
    if value.is_object() {
        Ok(value)
    } else {
        Err(DecodeError::InvalidEnvelope(format!(
            "expected a JSON object, got {}",
            json_kind(&value)
        )))
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
