use serde::{Deserialize, Serialize};

/// Terminal verdict of a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultStatus {
    Success,
    Failed,
}

/// The one result a room publishes before shutting down. `id` is the room
/// identifier the process was started with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomResult {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub message: String,
    pub status: ResultStatus,
}
