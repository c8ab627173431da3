//! Events on the `notifications` topic.
//!
//! Wire shape: a flat JSON object discriminated by `type`, e.g.
//!
//! ```json
//! {"user_id": 42, "message": "Assigned to Project X", "type": "project", "url": "/projects/7/"}
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::DecodeError;
use super::parse_object;
use crate::ports::{NotificationType, UserId};

/// A notification addressed to one user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NotificationEvent {
    pub user_id: UserId,
    pub message: String,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Deserialize)]
struct NotificationWire {
    #[serde(default)]
    user_id: Option<Value>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default, rename = "type")]
    notification_type: Option<String>,
    #[serde(default)]
    url: Option<String>,
}

impl NotificationEvent {
    pub fn new(
        user_id: UserId,
        notification_type: NotificationType,
        message: impl Into<String>,
    ) -> Self {
        Self {
            user_id,
            message: message.into(),
            notification_type,
            url: None,
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Decode a raw `notifications` value.
    ///
    /// `user_id` is required (JSON integer or numeric string; `0` and `""`
    /// count as absent). `type` defaults to `task`, `message` to the empty
    /// string; an empty `url` is treated as absent.
    pub fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        let wire: NotificationWire = serde_json::from_value(parse_object(payload)?)?;

        let user_id = parse_user_id(wire.user_id)?;
        let notification_type = match wire.notification_type.as_deref() {
            None | Some("") => NotificationType::default(),
            Some(other) => NotificationType::from_type(other)
                .ok_or_else(|| DecodeError::UnknownEventType(other.to_string()))?,
        };

        Ok(Self {
            user_id,
            message: wire.message.unwrap_or_default(),
            notification_type,
            url: wire.url.filter(|url| !url.is_empty()),
        })
    }
}

fn parse_user_id(raw: Option<Value>) -> Result<UserId, DecodeError> {
    let missing = DecodeError::MissingField("user_id");
    match raw {
        None | Some(Value::Null) | Some(Value::Bool(false)) => Err(missing),
        Some(Value::Number(number)) => match number.as_i64() {
            Some(0) => Err(missing),
            Some(id) => Ok(UserId(id)),
            None => Err(DecodeError::InvalidEnvelope(format!(
                "user_id {number} is not an integer"
            ))),
        },
        Some(Value::String(text)) if text.is_empty() => Err(missing),
        Some(Value::String(text)) => match text.trim().parse::<i64>() {
            Ok(0) => Err(missing),
            Ok(id) => Ok(UserId(id)),
            Err(_) => Err(DecodeError::InvalidEnvelope(format!(
                "user_id {text:?} is not an integer"
            ))),
        },
        Some(other) => Err(DecodeError::InvalidEnvelope(format!(
            "user_id must be an integer, got {other}"
        ))),
    }
}
