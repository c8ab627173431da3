//! Topic names and consumer group ids shared with every producer and consumer.
//!
//! These strings are part of the wire and deployment contract: unmigrated
//! producers and consumers use the same names, and changing a group id
//! resets its committed offsets.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Topic carrying employee lifecycle events.
pub const EMPLOYEE_EVENTS_TOPIC: &str = "employee-events";
/// Topic carrying project, task and bug notifications.
pub const NOTIFICATIONS_TOPIC: &str = "notifications";

/// Consumer group for the employee-events consumer.
pub const EMPLOYEE_GROUP: &str = "employee-group";
/// Consumer group for the notifications consumer.
pub const NOTIFICATION_GROUP: &str = "notification-group";

/// The topics this pipeline knows how to consume.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Topic {
    EmployeeEvents,
    Notifications,
}

impl Topic {
    pub const ALL: [Topic; 2] = [Topic::EmployeeEvents, Topic::Notifications];

    pub fn name(self) -> &'static str {
        match self {
            Topic::EmployeeEvents => EMPLOYEE_EVENTS_TOPIC,
            Topic::Notifications => NOTIFICATIONS_TOPIC,
        }
    }

    /// The consumer group that owns this topic's consumer loop.
    pub fn consumer_group(self) -> &'static str {
        match self {
            Topic::EmployeeEvents => EMPLOYEE_GROUP,
            Topic::Notifications => NOTIFICATION_GROUP,
        }
    }

    /// The discriminator values routed through this topic.
    pub fn event_types(self) -> &'static [&'static str] {
        match self {
            Topic::EmployeeEvents => &[
                "employee_created",
                "employee_updated",
                "employee_deactivated",
            ],
            Topic::Notifications => &["project", "task", "bug"],
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|topic| topic.name() == name)
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, PartialEq, Eq, Error)]
#[error("unknown topic: {0}")]
pub struct UnknownTopic(pub String);

impl FromStr for Topic {
    type Err = UnknownTopic;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Topic::from_name(s).ok_or_else(|| UnknownTopic(s.to_string()))
    }
}
