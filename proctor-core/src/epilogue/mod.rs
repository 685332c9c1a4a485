//! Result publication.
//!
//! A room publishes exactly one terminal result, either to stdout or to a
//! durable AMQP queue, and then shuts down. The publisher is picked once at
//! bootstrap from settings and probed with `test()` so a dead queue fails
//! the process early instead of at finalize time.

mod console;
mod finalizer;
mod queue;

use std::sync::Arc;

use async_trait::async_trait;

use proctor_config::EpilogueSettings;
use proctor_model::RoomResult;

use crate::error::Result;

pub use console::ConsoleEpilogue;
pub use finalizer::{Finalizer, ShutdownReceiver};
pub use queue::QueueEpilogue;

/// Capability set of a result publisher.
#[async_trait]
pub trait Epilogue: Send + Sync {
    /// Publishes the result. Transient failures return `Unavailable` and are
    /// retried by the finalize protocol.
    async fn write(&self, result: &RoomResult) -> Result<()>;

    /// Connectivity probe, run once at bootstrap.
    async fn test(&self) -> Result<()>;
}

/// Builds the publisher selected by the settings.
pub async fn from_settings(settings: &EpilogueSettings) -> Result<Arc<dyn Epilogue>> {
    match settings {
        EpilogueSettings::Console => Ok(Arc::new(ConsoleEpilogue::new())),
        EpilogueSettings::Queue { uri, queue } => {
            Ok(Arc::new(QueueEpilogue::connect(uri, queue).await?))
        }
    }
}
