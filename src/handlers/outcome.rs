//! What a handler reports back to the consumer runtime.

use thiserror::Error;

use crate::envelope::{DecodeError, EmployeeEventKind};
use crate::ports::{NotificationType, PortError, UserId};

/// The side effect a handler completed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Processed {
    /// An account email went out to `recipient`.
    EmailSent {
        kind: EmployeeEventKind,
        recipient: String,
    },
    /// A notification row was written.
    NotificationCreated {
        notification_id: u64,
        user_id: UserId,
        notification_type: NotificationType,
    },
    /// Free-form outcome for handlers outside this crate.
    Handled(String),
}

/// Why a message was skipped without producing its side effect.
///
/// Every variant ends in a log line and an offset commit; none stops the loop.
#[derive(Debug, Error)]
pub enum SkipReason {
    /// Malformed value or missing discriminator/recipient: never retried
    #[error("poison message: {0}")]
    Decode(DecodeError),
    /// Well-formed, but nothing handles this event type (or topic)
    #[error("unhandled event type `{0}`")]
    Unhandled(String),
    /// The referenced user does not exist; retrying cannot help
    #[error("user {0} does not exist")]
    LookupMiss(UserId),
    /// A collaborator call (lookup, store write, email send) failed
    #[error("collaborator failed: {0}")]
    Sink(#[from] PortError),
    /// The handler panicked; the runtime caught it
    #[error("handler panicked: {0}")]
    Panicked(String),
}

impl SkipReason {
    /// Only collaborator failures may be transient.
    pub fn is_retryable(&self) -> bool {
        matches!(self, SkipReason::Sink(_))
    }

    /// Stable label used as the `reason` log field.
    pub fn category(&self) -> &'static str {
        match self {
            SkipReason::Decode(_) => "decode_error",
            SkipReason::Unhandled(_) => "unhandled",
            SkipReason::LookupMiss(_) => "lookup_miss",
            SkipReason::Sink(_) => "sink_error",
            SkipReason::Panicked(_) => "panic",
        }
    }
}

impl From<DecodeError> for SkipReason {
    fn from(err: DecodeError) -> Self {
        match err {
            DecodeError::UnknownEventType(event_type) => SkipReason::Unhandled(event_type),
            poison => SkipReason::Decode(poison),
        }
    }
}
