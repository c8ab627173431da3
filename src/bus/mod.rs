//! Broker client abstractions.
//!
//! This module provides the traits the pipeline uses to talk to a message
//! broker, plus the implementations it ships with.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────┐      ┌─────────────────────────────┐
//! │ EventPublisher              │      │ ConsumerRuntime             │
//! │  produce() + flush()        │      │  poll() / commit() / close()│
//! └─────────────────────────────┘      └─────────────────────────────┘
//!                │                                    │
//!                ▼                                    ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                 Producer + Consumer Traits                      │
//! └─────────────────────────────────────────────────────────────────┘
//!          │                                        │
//!          ▼                                        ▼
//! ┌──────────────────┐                  ┌──────────────────────────┐
//! │  InMemoryBroker  │                  │ KafkaProducer /          │
//! │   (included)     │                  │ KafkaConsumer (`kafka`)  │
//! └──────────────────┘                  └──────────────────────────┘
//! ```
//!
//! Clients are always constructed explicitly and passed in; nothing in the
//! pipeline reaches for a process-wide broker connection.

mod consumer;
mod error;
mod in_memory;
#[cfg(feature = "kafka")]
mod kafka;
mod message;
mod producer;

pub use consumer::Consumer;
pub use error::BusError;
pub use in_memory::{InMemoryBroker, InMemoryConsumer};
#[cfg(feature = "kafka")]
pub use kafka::{DeliveryContext, KafkaConsumer, KafkaProducer};
pub use message::{DeliveryReport, Message, Record};
pub use producer::{DeliveryCallback, Producer};
