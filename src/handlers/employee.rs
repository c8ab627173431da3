//! Account emails for the `employee-events` topic.
//!
//! These events bypass the notification table and go straight to the mailer.

use std::sync::Arc;

use tracing::info;

use super::{EventHandler, Processed, SkipReason};
use crate::bus::Message;
use crate::envelope::{EmployeeCreated, EmployeeEvent};
use crate::ports::Mailer;

/// Subject and body of an outgoing email.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmailContent {
    pub subject: String,
    pub body: String,
}

/// Render the email an employee event turns into.
pub fn compose_email(event: &EmployeeEvent) -> EmailContent {
    match event {
        EmployeeEvent::Created(created) => welcome_email(created),
        EmployeeEvent::Updated(_) => EmailContent {
            subject: "Employee Profile Updated".to_string(),
            body: "Hi,\n\n\
                   Your employee profile has been updated in the system.\n\
                   If you did not request this, please contact HR.\n\n\
                   - HR Team"
                .to_string(),
        },
        EmployeeEvent::Deactivated(_) => EmailContent {
            subject: "Account Deactivated".to_string(),
            body: "Hi,\n\n\
                   Your employee account has been deactivated. You will no longer have access to the system.\n\
                   For questions, please contact your manager or HR.\n\n\
                   - HR Team"
                .to_string(),
        },
    }
}

fn welcome_email(created: &EmployeeCreated) -> EmailContent {
    let company = created.company_name();
    EmailContent {
        subject: format!("Welcome to {company} Employee Management System"),
        body: format!(
            "Hi {name},\n\n\
             Your account has been created.\n\
             Login: {login_url}\n\
             Email: {email}\n\
             Password: {password}\n\n\
             Please change your password after logging in.\n\n\
             - {company} HR Team",
            name = created.name(),
            login_url = created.login_url(),
            email = created.email,
            password = created.default_password(),
        ),
    }
}

/// Sends welcome, profile-updated and deactivation emails.
pub struct EmployeeEmailHandler {
    mailer: Arc<dyn Mailer>,
}

impl EmployeeEmailHandler {
    pub fn new(mailer: Arc<dyn Mailer>) -> Self {
        Self { mailer }
    }

    /// Send the email for an already-decoded event.
    pub fn handle_event(&self, event: &EmployeeEvent) -> Result<Processed, SkipReason> {
        let content = compose_email(event);
        let recipient = event.email().to_string();

        self.mailer
            .send_email(&content.subject, &content.body, std::slice::from_ref(&recipient))?;

        info!(event_type = %event.kind(), recipient = %recipient, "account email sent");
        Ok(Processed::EmailSent {
            kind: event.kind(),
            recipient,
        })
    }
}

impl EventHandler for EmployeeEmailHandler {
    fn handle(&self, message: &Message) -> Result<Processed, SkipReason> {
        let event = EmployeeEvent::decode(&message.payload)?;
        self.handle_event(&event)
    }
}
