//! Event and notification pipeline for the workforce platform.
//!
//! Business actions publish JSON events onto two topics; one consumer loop
//! per topic turns each event into a side effect:
//!
//! ```text
//! EventPublisher ──▶ broker ──▶ ConsumerRuntime ──▶ Router ──▶ handler ──▶ ports
//!                              (poll, commit)                  (email, notification row)
//! ```
//!
//! The broker client, the user directory, the notification store and the
//! mailer are all injected, so the whole pipeline runs against
//! [`bus::InMemoryBroker`] and the in-memory [`ports`] in tests.

pub mod bus;
pub mod config;
pub mod consumer;
pub mod envelope;
pub mod handlers;
pub mod logging;
pub mod ports;
pub mod publisher;

pub use bus::{BusError, Consumer, InMemoryBroker, Message, Producer, Record};
pub use consumer::{ConsumerRuntime, ConsumerThread, RetryPolicy, RuntimeStats};
pub use envelope::{DecodeError, EmployeeEvent, Envelope, NotificationEvent, Topic};
pub use handlers::{EventHandler, Processed, Router, SkipReason};
pub use ports::{Mailer, NotificationStore, PortError, UserDirectory};
pub use publisher::{EventPublisher, PublishError};
