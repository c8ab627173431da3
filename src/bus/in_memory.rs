//! In-memory broker for testing and single-process scenarios.
//!
//! This module provides a thread-safe fake broker that implements
//! `Producer` and hands out `Consumer`s bound to a consumer group, useful for:
//! - Unit and integration testing without a live Kafka cluster
//! - Exercising commit/redelivery semantics deterministically
//! - Development and prototyping

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::{Duration, Instant};

use super::{BusError, Consumer, DeliveryCallback, DeliveryReport, Message, Producer, Record};

/// Every topic has exactly one partition in the in-memory broker.
const PARTITION: i32 = 0;

struct StoredRecord {
    key: Option<Vec<u8>>,
    payload: Vec<u8>,
}

struct BrokerState {
    /// Append-only log per topic; the index is the offset.
    topics: RwLock<HashMap<String, Vec<StoredRecord>>>,
    /// Next offset to read, per (group, topic).
    committed: Mutex<HashMap<(String, String), i64>>,
    /// Records produced but not yet flushed.
    pending: Mutex<Vec<(Record, DeliveryCallback)>>,
    /// Held for a whole drain-and-deliver pass, so a flush that finds
    /// `pending` empty still waits for records another flush is delivering.
    delivering: Mutex<()>,
    unavailable: AtomicBool,
}

/// In-memory broker with topics, consumer groups and committed offsets.
///
/// Features:
/// - Thread-safe (can be shared across threads via `Clone`)
/// - One append-only log per topic, single partition
/// - Committed offsets tracked per consumer group, so a new consumer in the
///   same group resumes after the last commit (uncommitted messages are redelivered)
/// - Delivery callbacks fire during `flush`, like a real client
/// - `set_unavailable` simulates an outage for both producing and polling
///
/// There is no partition assignment: every live consumer of a group reads the
/// whole topic, so two members of one group both receive every message. Use
/// it for commit and redelivery behavior, not for group scale-out.
///
/// ## Example
///
/// ```
/// use std::time::Duration;
/// use workforce_events::bus::{Consumer, InMemoryBroker, Producer, Record};
///
/// let broker = InMemoryBroker::new();
/// let record = Record::new("notifications", br#"{"user_id":1}"#.to_vec());
/// broker.produce(record, Box::new(|_| {})).unwrap();
/// broker.flush(Duration::from_millis(10)).unwrap();
///
/// let consumer = broker.consumer("notification-group", "notifications");
/// let message = consumer.poll(Duration::from_millis(10)).unwrap().unwrap();
/// assert_eq!(message.offset, 0);
/// consumer.commit(&message).unwrap();
/// ```
#[derive(Clone)]
pub struct InMemoryBroker {
    state: Arc<BrokerState>,
}

impl Default for InMemoryBroker {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryBroker {
    /// Create a new, empty broker.
    pub fn new() -> Self {
        Self {
            state: Arc::new(BrokerState {
                topics: RwLock::new(HashMap::new()),
                committed: Mutex::new(HashMap::new()),
                pending: Mutex::new(Vec::new()),
                delivering: Mutex::new(()),
                unavailable: AtomicBool::new(false),
            }),
        }
    }

    /// Join `group` and subscribe to `topic`.
    ///
    /// The consumer starts at the group's committed offset, or at the
    /// beginning of the topic when the group has never committed
    /// (`auto.offset.reset = earliest`).
    pub fn consumer(&self, group: &str, topic: &str) -> InMemoryConsumer {
        let start = self.committed_offset(group, topic).unwrap_or(0);
        InMemoryConsumer {
            broker: self.clone(),
            group: group.to_string(),
            topic: topic.to_string(),
            position: Mutex::new(start),
            closed: AtomicBool::new(false),
        }
    }

    /// Append a raw value to a topic, bypassing delivery callbacks.
    ///
    /// Handy for injecting payloads no well-behaved producer would write.
    pub fn inject(&self, topic: &str, payload: impl Into<Vec<u8>>) -> Message {
        self.append(topic, None, payload.into())
    }

    /// Simulate a broker outage (or recovery).
    pub fn set_unavailable(&self, unavailable: bool) {
        self.state.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn is_unavailable(&self) -> bool {
        self.state.unavailable.load(Ordering::SeqCst)
    }

    /// Get all messages on a topic, in offset order.
    pub fn messages(&self, topic: &str) -> Vec<Message> {
        let topics = self.state.topics.read().unwrap_or_else(|e| e.into_inner());
        topics
            .get(topic)
            .map(|log| {
                log.iter()
                    .enumerate()
                    .map(|(offset, stored)| to_message(topic, offset as i64, stored))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Number of messages on a topic.
    pub fn len(&self, topic: &str) -> usize {
        let topics = self.state.topics.read().unwrap_or_else(|e| e.into_inner());
        topics.get(topic).map_or(0, Vec::len)
    }

    /// Check if a topic has no messages.
    pub fn is_empty(&self, topic: &str) -> bool {
        self.len(topic) == 0
    }

    /// Next offset the group will read on `topic`, if it ever committed.
    pub fn committed_offset(&self, group: &str, topic: &str) -> Option<i64> {
        let committed = self.state.committed.lock().unwrap_or_else(|e| e.into_inner());
        committed
            .get(&(group.to_string(), topic.to_string()))
            .copied()
    }

    fn append(&self, topic: &str, key: Option<Vec<u8>>, payload: Vec<u8>) -> Message {
        let mut topics = self.state.topics.write().unwrap_or_else(|e| e.into_inner());
        let log = topics.entry(topic.to_string()).or_default();
        let stored = StoredRecord { key, payload };
        let message = to_message(topic, log.len() as i64, &stored);
        log.push(stored);
        message
    }

    fn read(&self, topic: &str, offset: i64) -> Option<Message> {
        let topics = self.state.topics.read().unwrap_or_else(|e| e.into_inner());
        let index = usize::try_from(offset).ok()?;
        topics
            .get(topic)
            .and_then(|log| log.get(index))
            .map(|stored| to_message(topic, offset, stored))
    }

    fn commit_offset(&self, group: &str, topic: &str, next: i64) {
        let mut committed = self.state.committed.lock().unwrap_or_else(|e| e.into_inner());
        let entry = committed
            .entry((group.to_string(), topic.to_string()))
            .or_insert(0);
        if next > *entry {
            *entry = next;
        }
    }
}

fn to_message(topic: &str, offset: i64, stored: &StoredRecord) -> Message {
    Message {
        topic: topic.to_string(),
        partition: PARTITION,
        offset,
        key: stored.key.clone(),
        payload: stored.payload.clone(),
    }
}

impl Producer for InMemoryBroker {
    fn produce(&self, record: Record, on_delivery: DeliveryCallback) -> Result<(), BusError> {
        self.state
            .pending
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((record, on_delivery));
        Ok(())
    }

    /// Callbacks run on the flushing thread; a callback must not flush the
    /// same broker.
    fn flush(&self, _timeout: Duration) -> Result<(), BusError> {
        let _delivering = self
            .state
            .delivering
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        let pending: Vec<_> = self
            .state
            .pending
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .drain(..)
            .collect();

        for (record, on_delivery) in pending {
            if self.is_unavailable() {
                on_delivery(Err(BusError::ConnectionFailed(
                    "broker unavailable".to_string(),
                )));
                continue;
            }
            let message = self.append(&record.topic, record.key, record.payload);
            on_delivery(Ok(DeliveryReport {
                topic: message.topic,
                partition: message.partition,
                offset: message.offset,
            }));
        }
        Ok(())
    }
}

/// A consumer-group member subscribed to one topic of an [`InMemoryBroker`].
///
/// The topic's single partition is assigned to this consumer for its lifetime.
pub struct InMemoryConsumer {
    broker: InMemoryBroker,
    group: String,
    topic: String,
    /// Next offset to hand out.
    position: Mutex<i64>,
    closed: AtomicBool,
}

impl InMemoryConsumer {
    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Next offset this consumer will hand out.
    pub fn current_position(&self) -> i64 {
        *self.position.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Consumer for InMemoryConsumer {
    fn group(&self) -> &str {
        &self.group
    }

    fn poll(&self, timeout: Duration) -> Result<Option<Message>, BusError> {
        let deadline = Instant::now() + timeout;

        loop {
            if self.is_closed() {
                return Err(BusError::Closed);
            }
            if self.broker.is_unavailable() {
                return Err(BusError::ConnectionFailed(
                    "broker unavailable".to_string(),
                ));
            }

            {
                let mut position = self.position.lock().unwrap_or_else(|e| e.into_inner());
                if let Some(message) = self.broker.read(&self.topic, *position) {
                    *position += 1;
                    return Ok(Some(message));
                }
            }

            if Instant::now() >= deadline {
                return Ok(None);
            }

            // Small sleep to avoid busy-waiting
            std::thread::sleep(Duration::from_millis(1));
        }
    }

    fn commit(&self, message: &Message) -> Result<(), BusError> {
        if self.is_closed() {
            return Err(BusError::Closed);
        }
        if self.broker.is_unavailable() {
            return Err(BusError::CommitFailed("broker unavailable".to_string()));
        }
        self.broker
            .commit_offset(&self.group, &message.topic, message.offset + 1);
        Ok(())
    }

    fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}
