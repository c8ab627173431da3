use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{PortError, User, UserId};

/// What a notification is about.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationType {
    Project,
    #[default]
    Task,
    Bug,
}

impl NotificationType {
    pub fn as_str(self) -> &'static str {
        match self {
            NotificationType::Project => "project",
            NotificationType::Task => "task",
            NotificationType::Bug => "bug",
        }
    }

    pub fn from_type(value: &str) -> Option<Self> {
        match value {
            "project" => Some(NotificationType::Project),
            "task" => Some(NotificationType::Task),
            "bug" => Some(NotificationType::Bug),
            _ => None,
        }
    }
}

impl fmt::Display for NotificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The durable record the notifications consumer writes.
///
/// Created once per handled event and never updated by the pipeline;
/// marking it read is an API concern.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: u64,
    pub user_id: UserId,
    pub message: String,
    pub notification_type: NotificationType,
    pub url: Option<String>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

/// Persistence sink for notifications.
pub trait NotificationStore: Send + Sync {
    /// Persist a new unread notification for `user`; the store sets `id` and `created_at`.
    fn create_notification(
        &self,
        user: &User,
        message: &str,
        notification_type: NotificationType,
        url: Option<&str>,
    ) -> Result<Notification, PortError>;
}
