use thiserror::Error;

use crate::bus::BusError;

/// Why a publish did not reach the broker.
#[derive(Debug, Error)]
pub enum PublishError {
    /// The event could not be serialized to JSON
    #[error("failed to serialize event: {0}")]
    Serialize(#[from] serde_json::Error),
    /// The client refused the record before sending it
    #[error("failed to enqueue record: {0}")]
    Transport(#[source] BusError),
    /// The broker reported a failed delivery
    #[error("delivery failed: {0}")]
    Delivery(#[source] BusError),
    /// Flush returned without a delivery report
    #[error("no delivery report within {0:?}")]
    Unconfirmed(std::time::Duration),
}
