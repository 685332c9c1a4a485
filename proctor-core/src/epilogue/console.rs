use async_trait::async_trait;
use tracing::info;

use proctor_model::RoomResult;

use crate::error::{CoreError, Result};

use super::Epilogue;

/// Serializes the result as JSON and prints it on stdout. The default
/// publisher for local rooms and tests.
#[derive(Debug, Default)]
pub struct ConsoleEpilogue;

impl ConsoleEpilogue {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Epilogue for ConsoleEpilogue {
    async fn write(&self, result: &RoomResult) -> Result<()> {
        let body = serde_json::to_string(result)
            .map_err(|e| CoreError::internal(format!("could not marshal result: {e}")))?;

        println!("{body}");
        info!(room = %result.id, "result written to console");
        Ok(())
    }

    async fn test(&self) -> Result<()> {
        Ok(())
    }
}
