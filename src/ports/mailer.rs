use tracing::{debug, info};

use super::PortError;

/// Sender address used when none is configured.
pub const DEFAULT_FROM_EMAIL: &str = "no-reply@yourcompany.com";

/// Outbound email sink. Delivery mechanics (SMTP, API) live behind it.
pub trait Mailer: Send + Sync {
    fn send_email(
        &self,
        subject: &str,
        body: &str,
        recipients: &[String],
    ) -> Result<(), PortError>;
}

/// A mailer that writes each email to the log instead of sending it.
///
/// The development stand-in for a real transport. Bodies can carry
/// credentials, so they are only written at `debug`.
pub struct LogMailer {
    from: String,
}

impl Default for LogMailer {
    fn default() -> Self {
        Self::new(DEFAULT_FROM_EMAIL)
    }
}

impl LogMailer {
    pub fn new(from: impl Into<String>) -> Self {
        Self { from: from.into() }
    }

    pub fn from_address(&self) -> &str {
        &self.from
    }
}

impl Mailer for LogMailer {
    fn send_email(
        &self,
        subject: &str,
        body: &str,
        recipients: &[String],
    ) -> Result<(), PortError> {
        let to = recipients.join(", ");
        info!(from = %self.from, to = %to, subject, "email");
        debug!(to = %to, subject, body, "email body");
        Ok(())
    }
}
