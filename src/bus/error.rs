use thiserror::Error;

/// Transport-level failure reported by a broker client.
///
/// Never fatal to a consumer loop: the runtime logs it and keeps polling.
#[derive(Debug, Error)]
pub enum BusError {
    /// Connection to the broker failed or the broker is unreachable
    #[error("connection failed: {0}")]
    ConnectionFailed(String),
    /// A partition-level error surfaced by poll
    #[error("partition error on {topic}[{partition}]: {reason}")]
    Partition {
        topic: String,
        partition: i32,
        reason: String,
    },
    /// The broker refused the record
    #[error("record rejected: {0}")]
    Rejected(String),
    /// Offset commit failed
    #[error("commit failed: {0}")]
    CommitFailed(String),
    /// Timed out waiting for in-flight deliveries
    #[error("timed out waiting for delivery")]
    Timeout,
    /// The client was already closed
    #[error("client closed")]
    Closed,
    #[error("bus error: {0}")]
    Other(Box<dyn std::error::Error + Send + Sync>),
}
