//! In-app notifications for the `notifications` topic.

use std::sync::Arc;

use tracing::{debug, info};

use super::{EventHandler, Processed, SkipReason};
use crate::bus::Message;
use crate::envelope::NotificationEvent;
use crate::ports::{NotificationStore, UserDirectory};

/// Resolves the addressed user and persists a notification for them.
pub struct NotificationHandler {
    users: Arc<dyn UserDirectory>,
    store: Arc<dyn NotificationStore>,
}

impl NotificationHandler {
    pub fn new(users: Arc<dyn UserDirectory>, store: Arc<dyn NotificationStore>) -> Self {
        Self { users, store }
    }

    /// Persist the notification for an already-decoded event.
    ///
    /// A missing user is a skip, not a failure: nothing is written.
    pub fn handle_event(&self, event: &NotificationEvent) -> Result<Processed, SkipReason> {
        let user = self
            .users
            .find_user_by_id(event.user_id)?
            .ok_or(SkipReason::LookupMiss(event.user_id))?;
        debug!(user_id = %user.id, email = %user.email, "notification recipient resolved");

        let notification = self.store.create_notification(
            &user,
            &event.message,
            event.notification_type,
            event.url.as_deref(),
        )?;

        info!(
            notification_id = notification.id,
            user_id = %notification.user_id,
            notification_type = %notification.notification_type,
            "notification created"
        );
        Ok(Processed::NotificationCreated {
            notification_id: notification.id,
            user_id: notification.user_id,
            notification_type: notification.notification_type,
        })
    }
}

impl EventHandler for NotificationHandler {
    fn handle(&self, message: &Message) -> Result<Processed, SkipReason> {
        let event = NotificationEvent::decode(&message.payload)?;
        self.handle_event(&event)
    }
}
