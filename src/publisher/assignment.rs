//! Builders for "you have been assigned" notices.

use crate::envelope::NotificationEvent;
use crate::ports::{NotificationType, UserId};

/// The kind of work item someone was assigned to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssignmentKind {
    Project,
    Task,
    Bug,
}

impl AssignmentKind {
    fn noun(self) -> &'static str {
        match self {
            AssignmentKind::Project => "project",
            AssignmentKind::Task => "task",
            AssignmentKind::Bug => "bug",
        }
    }

    fn path_segment(self) -> &'static str {
        match self {
            AssignmentKind::Project => "projects",
            AssignmentKind::Task => "tasks",
            AssignmentKind::Bug => "bugs",
        }
    }

    fn notification_type(self) -> NotificationType {
        match self {
            AssignmentKind::Project => NotificationType::Project,
            AssignmentKind::Task => NotificationType::Task,
            AssignmentKind::Bug => NotificationType::Bug,
        }
    }
}

/// A work item whose assignees should be notified.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Assignment {
    pub kind: AssignmentKind,
    pub id: u64,
    pub name: String,
}

impl Assignment {
    pub fn project(id: u64, name: impl Into<String>) -> Self {
        Self::new(AssignmentKind::Project, id, name)
    }

    pub fn task(id: u64, name: impl Into<String>) -> Self {
        Self::new(AssignmentKind::Task, id, name)
    }

    pub fn bug(id: u64, name: impl Into<String>) -> Self {
        Self::new(AssignmentKind::Bug, id, name)
    }

    fn new(kind: AssignmentKind, id: u64, name: impl Into<String>) -> Self {
        Self {
            kind,
            id,
            name: name.into(),
        }
    }

    /// e.g. `You have been assigned to the project 'Apollo'.`
    pub fn message(&self) -> String {
        format!(
            "You have been assigned to the {} '{}'.",
            self.kind.noun(),
            self.name
        )
    }

    /// Deep link to the item, e.g. `/projects/7/`.
    pub fn url(&self) -> String {
        format!("/{}/{}/", self.kind.path_segment(), self.id)
    }

    /// The notice addressed to one assignee.
    pub fn notification_for(&self, user_id: UserId) -> NotificationEvent {
        NotificationEvent::new(user_id, self.kind.notification_type(), self.message())
            .with_url(self.url())
    }

    /// One notice per assignee, in the order given.
    pub fn notifications(
        &self,
        assignees: impl IntoIterator<Item = UserId>,
    ) -> Vec<NotificationEvent> {
        assignees
            .into_iter()
            .map(|user_id| self.notification_for(user_id))
            .collect()
    }
}
