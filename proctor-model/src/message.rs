use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::key::Key;
use crate::user::{Character, User, UserStatus};

/// Server-stamped provenance of a stored message.
///
/// Assigned by the authorization layer on every accepted `Put`; whatever meta
/// a client sends is discarded. The fields are a snapshot of the owning user
/// at put time, except `readiness`/`status` which reflect the owner row at
/// read time (message reads join the users table).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meta {
    pub owner: String,
    pub role: String,
    pub character: Character,
    pub readiness: bool,
    pub status: UserStatus,
    pub creation_time: DateTime<Utc>,
}

impl Meta {
    /// Snapshot taken from an authenticated user at put time.
    pub fn stamp(user: &User, creation_time: DateTime<Utc>) -> Self {
        Self {
            owner: user.name.clone(),
            role: user.role.clone(),
            character: user.character,
            readiness: user.readiness,
            status: user.status,
            creation_time,
        }
    }
}

/// A key-addressed datum in the room. At most one message exists per key;
/// `Put` replaces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub key: Key,
    #[serde(default)]
    pub content: String,
    /// `None` only on inbound `Put` bodies, before stamping.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
}
