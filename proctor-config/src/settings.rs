//! Runtime settings assembled by the server binary from its flags and
//! environment, passed into the core as plain data.

use std::net::SocketAddr;
use std::path::PathBuf;

/// Which result publisher the room finalizes through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EpilogueSettings {
    /// Serialize the result as JSON on stdout.
    Console,
    /// Publish the result to a durable AMQP queue.
    Queue { uri: String, queue: String },
}

#[derive(Debug, Clone)]
pub struct Settings {
    /// Directory holding `rules.yaml` and `credentials.yaml`.
    pub config_dir: PathBuf,
    /// Address the RPC surface binds to.
    pub listen: SocketAddr,
    /// Room identifier stamped onto the published result.
    pub room_id: String,
    pub epilogue: EpilogueSettings,
}
