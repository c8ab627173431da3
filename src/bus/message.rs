//! Records flowing through the broker.

/// A record handed to a [`Producer`](super::Producer).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Record {
    /// Destination topic (e.g., "employee-events", "notifications")
    pub topic: String,
    /// Optional partitioning key. Existing producers never set one.
    pub key: Option<Vec<u8>>,
    /// Serialized value (UTF-8 JSON for every topic in this crate)
    pub payload: Vec<u8>,
}

impl Record {
    /// Create an unkeyed record.
    pub fn new(topic: impl Into<String>, payload: Vec<u8>) -> Self {
        Self {
            topic: topic.into(),
            key: None,
            payload,
        }
    }

    /// Set the partitioning key.
    pub fn with_key(mut self, key: impl Into<Vec<u8>>) -> Self {
        self.key = Some(key.into());
        self
    }
}

/// A record received from a [`Consumer`](super::Consumer).
///
/// Carries the broker coordinates (`topic`, `partition`, `offset`) needed
/// to commit it and to identify it in log lines.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    pub topic: String,
    pub partition: i32,
    pub offset: i64,
    pub key: Option<Vec<u8>>,
    /// Raw message value, exactly as the producer wrote it.
    pub payload: Vec<u8>,
}

impl Message {
    pub fn new(topic: impl Into<String>, partition: i32, offset: i64, payload: Vec<u8>) -> Self {
        Self {
            topic: topic.into(),
            partition,
            offset,
            key: None,
            payload,
        }
    }

    /// Get the payload as a string (if valid UTF-8).
    pub fn payload_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.payload).ok()
    }

    /// Payload rendered for log lines; invalid UTF-8 is replaced, never rejected.
    pub fn payload_lossy(&self) -> String {
        String::from_utf8_lossy(&self.payload).into_owned()
    }
}

/// Where a produced record landed, reported by the broker once delivery completes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeliveryReport {
    pub topic: String,
    pub partition: i32,
    pub offset: i64,
}
