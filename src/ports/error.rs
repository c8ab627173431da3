use thiserror::Error;

/// Failure reported by an external collaborator (user directory, notification
/// store, mail transport).
#[derive(Debug, Error)]
pub enum PortError {
    /// The collaborator could not be reached (database down, SMTP timeout)
    #[error("unavailable: {0}")]
    Unavailable(String),
    /// The collaborator refused the request (constraint violation, bad address)
    #[error("rejected: {0}")]
    Rejected(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid data: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    Other(Box<dyn std::error::Error + Send + Sync>),
}
