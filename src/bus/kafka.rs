//! Apache Kafka adapters built on `rdkafka`'s synchronous clients.
//!
//! Both adapters are constructed explicitly at process start and owned by
//! whoever drives them; nothing here is a global.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use rdkafka::config::ClientConfig;
use rdkafka::consumer::{BaseConsumer, CommitMode, Consumer as _};
use rdkafka::error::KafkaError;
use rdkafka::message::Message as _;
use rdkafka::producer::{BaseProducer, BaseRecord, DeliveryResult, Producer as _, ProducerContext};
use rdkafka::{ClientContext, Offset, TopicPartitionList};
use tracing::{debug, info};

use super::{BusError, Consumer, DeliveryCallback, DeliveryReport, Message, Producer, Record};

/// Routes librdkafka delivery reports to the per-record callback.
pub struct DeliveryContext;

impl ClientContext for DeliveryContext {}

impl ProducerContext for DeliveryContext {
    type DeliveryOpaque = Box<DeliveryCallback>;

    fn delivery(&self, delivery_result: &DeliveryResult<'_>, on_delivery: Self::DeliveryOpaque) {
        let outcome = match delivery_result {
            Ok(message) => Ok(DeliveryReport {
                topic: message.topic().to_string(),
                partition: message.partition(),
                offset: message.offset(),
            }),
            Err((err, _message)) => Err(BusError::Rejected(err.to_string())),
        };
        on_delivery(outcome);
    }
}

/// Kafka producer. Delivery callbacks are served during `flush`.
pub struct KafkaProducer {
    producer: BaseProducer<DeliveryContext>,
}

impl KafkaProducer {
    /// Connect to `bootstrap_servers` (comma separated `host:port` list).
    pub fn new(bootstrap_servers: &str) -> Result<Self, BusError> {
        let producer = ClientConfig::new()
            .set("bootstrap.servers", bootstrap_servers)
            .create_with_context(DeliveryContext)
            .map_err(|e| BusError::ConnectionFailed(e.to_string()))?;
        info!(bootstrap_servers, "kafka producer created");
        Ok(Self { producer })
    }
}

impl Producer for KafkaProducer {
    fn produce(&self, record: Record, on_delivery: DeliveryCallback) -> Result<(), BusError> {
        let mut base = BaseRecord::<[u8], [u8], Box<DeliveryCallback>>::with_opaque_to(
            &record.topic,
            Box::new(on_delivery),
        )
        .payload(record.payload.as_slice());
        if let Some(key) = record.key.as_deref() {
            base = base.key(key);
        }

        self.producer
            .send(base)
            .map_err(|(err, _record)| BusError::Rejected(err.to_string()))?;
        // Serve callbacks for anything that already completed.
        self.producer.poll(Duration::ZERO);
        Ok(())
    }

    fn flush(&self, timeout: Duration) -> Result<(), BusError> {
        self.producer.flush(timeout).map_err(|err| match err {
            KafkaError::Flush(_) => BusError::Timeout,
            other => BusError::Other(Box::new(other)),
        })
    }
}

/// Kafka consumer-group member subscribed to one topic.
///
/// Auto-commit is disabled: offsets move only through [`Consumer::commit`],
/// which the runtime calls after the handler returns.
pub struct KafkaConsumer {
    consumer: BaseConsumer,
    group: String,
    closed: AtomicBool,
}

impl KafkaConsumer {
    /// Join `group` and subscribe to `topic`, starting from the earliest
    /// offset when the group has no committed position.
    pub fn subscribe(bootstrap_servers: &str, group: &str, topic: &str) -> Result<Self, BusError> {
        let consumer: BaseConsumer = ClientConfig::new()
            .set("bootstrap.servers", bootstrap_servers)
            .set("group.id", group)
            .set("auto.offset.reset", "earliest")
            .set("enable.auto.commit", "false")
            .create()
            .map_err(|e| BusError::ConnectionFailed(e.to_string()))?;

        consumer
            .subscribe(&[topic])
            .map_err(|e| BusError::ConnectionFailed(e.to_string()))?;

        info!(bootstrap_servers, group, topic, "kafka consumer subscribed");
        Ok(Self {
            consumer,
            group: group.to_string(),
            closed: AtomicBool::new(false),
        })
    }
}

impl Consumer for KafkaConsumer {
    fn group(&self) -> &str {
        &self.group
    }

    fn poll(&self, timeout: Duration) -> Result<Option<Message>, BusError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(BusError::Closed);
        }

        match self.consumer.poll(timeout) {
            None => Ok(None),
            Some(Err(KafkaError::PartitionEOF(partition))) => {
                debug!(partition, "reached end of partition");
                Ok(None)
            }
            Some(Err(err)) => Err(BusError::ConnectionFailed(err.to_string())),
            Some(Ok(borrowed)) => Ok(Some(Message {
                topic: borrowed.topic().to_string(),
                partition: borrowed.partition(),
                offset: borrowed.offset(),
                key: borrowed.key().map(<[u8]>::to_vec),
                payload: borrowed.payload().map(<[u8]>::to_vec).unwrap_or_default(),
            })),
        }
    }

    fn commit(&self, message: &Message) -> Result<(), BusError> {
        let mut offsets = TopicPartitionList::new();
        offsets
            .add_partition_offset(
                &message.topic,
                message.partition,
                Offset::Offset(message.offset + 1),
            )
            .map_err(|e| BusError::CommitFailed(e.to_string()))?;

        self.consumer
            .commit(&offsets, CommitMode::Sync)
            .map_err(|e| BusError::CommitFailed(e.to_string()))
    }

    fn close(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            self.consumer.unsubscribe();
            info!(group = %self.group, "kafka consumer closed");
        }
    }
}
