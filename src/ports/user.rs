use std::fmt;

use serde::{Deserialize, Serialize};

use super::PortError;

/// Opaque identifier of a user account in the relational store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for UserId {
    fn from(id: i64) -> Self {
        UserId(id)
    }
}

/// The slice of a user account the pipeline needs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

impl User {
    pub fn new(id: i64, email: impl Into<String>) -> Self {
        Self {
            id: UserId(id),
            email: email.into(),
            username: None,
        }
    }
}

/// Resolves user ids referenced by events.
pub trait UserDirectory: Send + Sync {
    /// `Ok(None)` when no such user exists; `Err` only when the lookup itself failed.
    fn find_user_by_id(&self, id: UserId) -> Result<Option<User>, PortError>;
}
