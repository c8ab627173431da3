//! Lookup/Sink Ports - the only seams where the pipeline touches the outside.
//!
//! - `UserDirectory::find_user_by_id` - resolve a recipient (relational store)
//! - `NotificationStore::create_notification` - persist a notification row
//! - `Mailer::send_email` - hand an email to the mail transport
//!
//! Handlers receive these as trait objects, so they run unchanged against a
//! real database and SMTP relay or against the in-memory versions here.

mod error;
mod in_memory;
mod mailer;
mod notification;
mod user;

pub use error::PortError;
pub use in_memory::{InMemoryNotificationStore, InMemoryUserDirectory, RecordingMailer, SentEmail};
pub use mailer::{LogMailer, Mailer, DEFAULT_FROM_EMAIL};
pub use notification::{Notification, NotificationStore, NotificationType};
pub use user::{User, UserDirectory, UserId};
