use thiserror::Error;

/// Why a raw message could not be turned into a typed event.
///
/// `InvalidJson`, `InvalidEnvelope` and `MissingField` mark a poison message:
/// it is permanently unprocessable and is skipped without retry.
/// `UnknownEventType` is not poison; the message is well formed but nothing
/// handles its discriminator.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Value is not UTF-8 JSON
    #[error("invalid JSON: {0}")]
    InvalidJson(String),
    /// Valid JSON, but not an object of the expected shape
    #[error("invalid envelope: {0}")]
    InvalidEnvelope(String),
    /// A required field (discriminator or recipient) is absent or empty
    #[error("missing required field `{0}`")]
    MissingField(&'static str),
    /// Discriminator present but not routed by this topic
    #[error("unhandled event type `{0}`")]
    UnknownEventType(String),
}

impl DecodeError {
    /// True for malformed messages; false for well-formed ones nobody handles.
    pub fn is_poison(&self) -> bool {
        !matches!(self, DecodeError::UnknownEventType(_))
    }
}

impl From<serde_json::Error> for DecodeError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_data() {
            DecodeError::InvalidEnvelope(err.to_string())
        } else {
            DecodeError::InvalidJson(err.to_string())
        }
    }
}
