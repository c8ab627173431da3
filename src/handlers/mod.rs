//! Event Handlers - turn one decoded event into one side effect.
//!
//! | topic             | event                  | side effect                     |
//! |-------------------|------------------------|---------------------------------|
//! | `employee-events` | `employee_created`     | welcome email with credentials  |
//! | `employee-events` | `employee_updated`     | profile-updated email           |
//! | `employee-events` | `employee_deactivated` | deactivation email              |
//! | `notifications`   | `project`/`task`/`bug` | user lookup, notification row   |
//!
//! Handlers never see transport details beyond the [`Message`](crate::bus::Message)
//! they are given, and never commit offsets; the consumer runtime does that
//! once `handle` returns, whatever the outcome.

mod employee;
mod notification;
mod outcome;
mod router;

pub use employee::{compose_email, EmailContent, EmployeeEmailHandler};
pub use notification::NotificationHandler;
pub use outcome::{Processed, SkipReason};
pub use router::Router;

use crate::bus::Message;

/// Processes a single consumed message.
pub trait EventHandler: Send + Sync {
    fn handle(&self, message: &Message) -> Result<Processed, SkipReason>;
}

impl<F> EventHandler for F
where
    F: Fn(&Message) -> Result<Processed, SkipReason> + Send + Sync,
{
    fn handle(&self, message: &Message) -> Result<Processed, SkipReason> {
        self(message)
    }
}
