use async_trait::async_trait;
use lapin::options::{BasicPublishOptions, QueueDeclareOptions};
use lapin::types::FieldTable;
use lapin::{BasicProperties, Channel, Connection, ConnectionProperties};
use tracing::info;

use proctor_model::RoomResult;

use crate::error::{CoreError, Result};

use super::Epilogue;

// Historical media-type label, preserved for wire compatibility with
// existing consumers; the payload is JSON.
const CONTENT_TYPE: &str = "application/x-yaml";

/// Publishes the result to a named durable AMQP queue.
pub struct QueueEpilogue {
    // Held so the underlying connection outlives the channel.
    _connection: Connection,
    channel: Channel,
    queue: String,
}

impl QueueEpilogue {
    pub async fn connect(uri: &str, queue: &str) -> Result<Self> {
        let connection = Connection::connect(uri, ConnectionProperties::default())
            .await
            .map_err(|e| CoreError::unavailable(format!("could not connect to queue: {e}")))?;

        let channel = connection
            .create_channel()
            .await
            .map_err(|e| CoreError::unavailable(format!("could not open channel: {e}")))?;

        Ok(Self {
            _connection: connection,
            channel,
            queue: queue.to_string(),
        })
    }

    async fn declare_queue(&self) -> Result<()> {
        self.channel
            .queue_declare(
                &self.queue,
                QueueDeclareOptions {
                    durable: true,
                    ..QueueDeclareOptions::default()
                },
                FieldTable::default(),
            )
            .await
            .map_err(|e| CoreError::unavailable(format!("could not declare queue: {e}")))?;
        Ok(())
    }
}

#[async_trait]
impl Epilogue for QueueEpilogue {
    async fn write(&self, result: &RoomResult) -> Result<()> {
        let body = serde_json::to_vec(result)
            .map_err(|e| CoreError::internal(format!("could not marshal result: {e}")))?;

        self.declare_queue().await?;

        self.channel
            .basic_publish(
                "",
                &self.queue,
                BasicPublishOptions::default(),
                &body,
                BasicProperties::default().with_content_type(CONTENT_TYPE.into()),
            )
            .await
            .map_err(|e| CoreError::unavailable(format!("could not publish result: {e}")))?
            .await
            .map_err(|e| CoreError::unavailable(format!("publish not confirmed: {e}")))?;

        info!(room = %result.id, queue = %self.queue, "result published");
        Ok(())
    }

    async fn test(&self) -> Result<()> {
        self.declare_queue().await
    }
}
