//! Consumer side of the broker client.

use std::time::Duration;

use super::{BusError, Message};

/// Trait for pulling records from a subscribed topic as a member of a consumer group.
///
/// This is a pull-based interface: the consumer runtime owns the loop and
/// decides when to commit. Partition assignment within the group is left
/// entirely to the broker.
pub trait Consumer: Send {
    /// The consumer group this member belongs to.
    fn group(&self) -> &str;

    /// Poll for the next message, blocking until one is available or the timeout expires.
    ///
    /// `Ok(None)` means the timeout elapsed with nothing to deliver.
    fn poll(&self, timeout: Duration) -> Result<Option<Message>, BusError>;

    /// Mark `message` (and everything before it on its partition) as processed
    /// for this consumer's group.
    fn commit(&self, message: &Message) -> Result<(), BusError>;

    /// Release the broker connection. Called once when the loop exits; further
    /// polls return [`BusError::Closed`].
    fn close(&self);
}

impl<C: Consumer + ?Sized> Consumer for Box<C> {
    fn group(&self) -> &str {
        (**self).group()
    }

    fn poll(&self, timeout: Duration) -> Result<Option<Message>, BusError> {
        (**self).poll(timeout)
    }

    fn commit(&self, message: &Message) -> Result<(), BusError> {
        (**self).commit(message)
    }

    fn close(&self) {
        (**self).close()
    }
}
