//! Producer side of the broker client.

use std::time::Duration;

use super::{BusError, DeliveryReport, Record};

/// Callback invoked exactly once per produced record with its delivery outcome.
///
/// Purely observability: nothing in the pipeline depends on what it does.
pub type DeliveryCallback = Box<dyn FnOnce(Result<DeliveryReport, BusError>) + Send + Sync>;

/// Trait for handing records to a broker.
///
/// Implementations:
/// - `InMemoryBroker` - tests and single-process runs
/// - `KafkaProducer` - Apache Kafka (requires the `kafka` feature)
pub trait Producer: Send + Sync {
    /// Enqueue a record. `on_delivery` fires once the broker confirms or
    /// rejects it, at the latest during the next [`flush`](Producer::flush).
    ///
    /// An `Err` here means the record never left the client; in that case
    /// `on_delivery` is not called.
    fn produce(&self, record: Record, on_delivery: DeliveryCallback) -> Result<(), BusError>;

    /// Block until every in-flight record is delivered or failed, or the timeout expires.
    fn flush(&self, timeout: Duration) -> Result<(), BusError>;
}

impl<P: Producer + ?Sized> Producer for std::sync::Arc<P> {
    fn produce(&self, record: Record, on_delivery: DeliveryCallback) -> Result<(), BusError> {
        (**self).produce(record, on_delivery)
    }

    fn flush(&self, timeout: Duration) -> Result<(), BusError> {
        (**self).flush(timeout)
    }
}
