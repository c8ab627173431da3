//! Events on the `employee-events` topic.
//!
//! Wire shape: a flat JSON object discriminated by `event_type`, e.g.
//!
//! ```json
//! {"event_type": "employee_created", "email": "a@x.com", "name": "Asha", "company_name": "Acme"}
//! ```
//!
//! Older producers wrote `event` and `user_email` instead of `event_type` and
//! `email`; both spellings decode. Unknown extra fields are ignored.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::DecodeError;
use super::parse_object;

pub const DEFAULT_EMPLOYEE_NAME: &str = "New Employee";
pub const DEFAULT_COMPANY_NAME: &str = "Your Company";
pub const DEFAULT_LOGIN_URL: &str = "http://localhost:5173/login";
pub const DEFAULT_PASSWORD: &str = "Pass@123";

/// Discriminator values on the `employee-events` topic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EmployeeEventKind {
    Created,
    Updated,
    Deactivated,
}

impl EmployeeEventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EmployeeEventKind::Created => "employee_created",
            EmployeeEventKind::Updated => "employee_updated",
            EmployeeEventKind::Deactivated => "employee_deactivated",
        }
    }

    pub fn from_event_type(event_type: &str) -> Option<Self> {
        match event_type {
            "employee_created" => Some(EmployeeEventKind::Created),
            "employee_updated" => Some(EmployeeEventKind::Updated),
            "employee_deactivated" => Some(EmployeeEventKind::Deactivated),
            _ => None,
        }
    }
}

impl fmt::Display for EmployeeEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload of `employee_created`. Optional fields fall back to the documented defaults.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EmployeeCreated {
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub login_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employee_id: Option<Value>,
}

impl EmployeeCreated {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            ..Self::default()
        }
    }

    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or(DEFAULT_EMPLOYEE_NAME)
    }

    pub fn company_name(&self) -> &str {
        self.company_name.as_deref().unwrap_or(DEFAULT_COMPANY_NAME)
    }

    pub fn login_url(&self) -> &str {
        self.login_url.as_deref().unwrap_or(DEFAULT_LOGIN_URL)
    }

    pub fn default_password(&self) -> &str {
        self.default_password.as_deref().unwrap_or(DEFAULT_PASSWORD)
    }
}

/// Payload of `employee_updated` and `employee_deactivated`: just the recipient.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EmployeeContact {
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employee_id: Option<Value>,
}

impl EmployeeContact {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            employee_id: None,
        }
    }
}

/// One variant per `event_type` routed on `employee-events`.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "event_type")]
pub enum EmployeeEvent {
    #[serde(rename = "employee_created")]
    Created(EmployeeCreated),
    #[serde(rename = "employee_updated")]
    Updated(EmployeeContact),
    #[serde(rename = "employee_deactivated")]
    Deactivated(EmployeeContact),
}

/// Everything any producer has ever put on the topic; all optional so that
/// required-field checks happen in one place with precise errors.
#[derive(Deserialize)]
struct EmployeeWire {
    #[serde(default, alias = "event")]
    event_type: Option<String>,
    #[serde(default, alias = "user_email")]
    email: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    company_name: Option<String>,
    #[serde(default)]
    login_url: Option<String>,
    #[serde(default)]
    default_password: Option<String>,
    #[serde(default)]
    employee_id: Option<Value>,
}

impl EmployeeEvent {
    /// Decode a raw `employee-events` value.
    ///
    /// The recipient is checked before the discriminator, so a message with
    /// neither reports the missing `email`.
    pub fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        let wire: EmployeeWire = serde_json::from_value(parse_object(payload)?)?;

        let email = wire
            .email
            .filter(|email| !email.is_empty())
            .ok_or(DecodeError::MissingField("email"))?;
        let event_type = wire
            .event_type
            .filter(|event_type| !event_type.is_empty())
            .ok_or(DecodeError::MissingField("event_type"))?;
        let kind = EmployeeEventKind::from_event_type(&event_type)
            .ok_or(DecodeError::UnknownEventType(event_type))?;

        let employee_id = wire.employee_id.filter(|id| !id.is_null());
        Ok(match kind {
            EmployeeEventKind::Created => EmployeeEvent::Created(EmployeeCreated {
                email,
                name: wire.name,
                company_name: wire.company_name,
                login_url: wire.login_url,
                default_password: wire.default_password,
                employee_id,
            }),
            EmployeeEventKind::Updated => {
                EmployeeEvent::Updated(EmployeeContact { email, employee_id })
            }
            EmployeeEventKind::Deactivated => {
                EmployeeEvent::Deactivated(EmployeeContact { email, employee_id })
            }
        })
    }

    pub fn kind(&self) -> EmployeeEventKind {
        match self {
            EmployeeEvent::Created(_) => EmployeeEventKind::Created,
            EmployeeEvent::Updated(_) => EmployeeEventKind::Updated,
            EmployeeEvent::Deactivated(_) => EmployeeEventKind::Deactivated,
        }
    }

    /// The recipient address every variant carries.
    pub fn email(&self) -> &str {
        match self {
            EmployeeEvent::Created(created) => &created.email,
            EmployeeEvent::Updated(contact) | EmployeeEvent::Deactivated(contact) => {
                &contact.email
            }
        }
    }
}
