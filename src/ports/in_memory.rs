//! In-memory collaborators for testing and single-process runs.
//!
//! Each one is thread-safe and cheap to clone (clones share state), and can
//! be told to fail its next calls so failure paths are easy to exercise.

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use chrono::Utc;

use super::{
    Mailer, Notification, NotificationStore, NotificationType, PortError, User, UserDirectory,
    UserId,
};

/// Counts down injected failures.
#[derive(Clone, Default)]
struct FailureBudget(Arc<AtomicUsize>);

impl FailureBudget {
    fn set(&self, count: usize) {
        self.0.store(count, Ordering::SeqCst);
    }

    /// Consume one injected failure, if any are left.
    fn take(&self) -> bool {
        self.0
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok()
    }
}

/// User directory backed by a map.
#[derive(Clone, Default)]
pub struct InMemoryUserDirectory {
    users: Arc<RwLock<HashMap<UserId, User>>>,
    failures: FailureBudget,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_users(users: impl IntoIterator<Item = User>) -> Self {
        let directory = Self::new();
        for user in users {
            directory.insert(user);
        }
        directory
    }

    /// Load a JSON array of users, e.g. `[{"id": 42, "email": "a@x.com"}]`.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, PortError> {
        let raw = std::fs::read_to_string(path)?;
        let users: Vec<User> = serde_json::from_str(&raw)?;
        Ok(Self::with_users(users))
    }

    pub fn insert(&self, user: User) {
        self.users
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(user.id, user);
    }

    pub fn len(&self) -> usize {
        self.users.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Make the next `count` lookups fail with [`PortError::Unavailable`].
    pub fn fail_next(&self, count: usize) {
        self.failures.set(count);
    }
}

impl UserDirectory for InMemoryUserDirectory {
    fn find_user_by_id(&self, id: UserId) -> Result<Option<User>, PortError> {
        if self.failures.take() {
            return Err(PortError::Unavailable("user directory unavailable".into()));
        }
        Ok(self
            .users
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&id)
            .cloned())
    }
}

/// Notification store backed by a vector. Ids start at 1.
#[derive(Clone, Default)]
pub struct InMemoryNotificationStore {
    rows: Arc<Mutex<Vec<Notification>>>,
    failures: FailureBudget,
}

impl InMemoryNotificationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all notifications, oldest first.
    pub fn all(&self) -> Vec<Notification> {
        self.rows.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Notifications for one user, newest first (the order the API lists them in).
    pub fn for_user(&self, user_id: UserId) -> Vec<Notification> {
        let mut rows: Vec<_> = self
            .rows
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter(|row| row.user_id == user_id)
            .cloned()
            .collect();
        rows.reverse();
        rows
    }

    pub fn len(&self) -> usize {
        self.rows.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Make the next `count` writes fail with [`PortError::Unavailable`].
    pub fn fail_next(&self, count: usize) {
        self.failures.set(count);
    }
}

impl NotificationStore for InMemoryNotificationStore {
    fn create_notification(
        &self,
        user: &User,
        message: &str,
        notification_type: NotificationType,
        url: Option<&str>,
    ) -> Result<Notification, PortError> {
        if self.failures.take() {
            return Err(PortError::Unavailable("notification store unavailable".into()));
        }

        let mut rows = self.rows.lock().unwrap_or_else(|e| e.into_inner());
        let notification = Notification {
            id: rows.len() as u64 + 1,
            user_id: user.id,
            message: message.to_string(),
            notification_type,
            url: url.map(str::to_string),
            is_read: false,
            created_at: Utc::now(),
        };
        rows.push(notification.clone());
        Ok(notification)
    }
}

/// An email captured by [`RecordingMailer`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SentEmail {
    pub subject: String,
    pub body: String,
    pub recipients: Vec<String>,
}

/// Mailer that records every email instead of sending it.
#[derive(Clone, Default)]
pub struct RecordingMailer {
    sent: Arc<Mutex<Vec<SentEmail>>>,
    failures: FailureBudget,
}

impl RecordingMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all successfully sent emails, in order.
    pub fn sent(&self) -> Vec<SentEmail> {
        self.sent.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Emails addressed to `recipient`.
    pub fn sent_to(&self, recipient: &str) -> Vec<SentEmail> {
        self.sent()
            .into_iter()
            .filter(|email| email.recipients.iter().any(|r| r == recipient))
            .collect()
    }

    /// Make the next `count` sends fail with [`PortError::Unavailable`].
    pub fn fail_next(&self, count: usize) {
        self.failures.set(count);
    }
}

impl Mailer for RecordingMailer {
    fn send_email(
        &self,
        subject: &str,
        body: &str,
        recipients: &[String],
    ) -> Result<(), PortError> {
        if self.failures.take() {
            return Err(PortError::Unavailable("mail transport unavailable".into()));
        }
        self.sent
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(SentEmail {
                subject: subject.to_string(),
                body: body.to_string(),
                recipients: recipients.to_vec(),
            });
        Ok(())
    }
}
