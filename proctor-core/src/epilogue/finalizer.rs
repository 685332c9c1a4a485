use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::sleep;
use tracing::{info, warn};

use proctor_model::RoomResult;

use crate::error::Result;

use super::Epilogue;

const RETRY_BACKOFF: Duration = Duration::from_secs(5);

/// Signals the server root that the result is out and the process should
/// exit 0.
pub type ShutdownReceiver = mpsc::Receiver<()>;

/// Owns the finalize protocol: publish the one room result, retrying forever
/// with a fixed backoff, then trigger shutdown.
///
/// Both triggers (the director's `PutResult` and the operator marking a
/// director failed) go through [`Finalizer::finalize`]; whichever fires
/// first wins, later calls are ignored. The broker keeps serving while the
/// detached task retries.
pub struct Finalizer {
    room_id: String,
    epilogue: Arc<dyn Epilogue>,
    fired: AtomicBool,
    shutdown: mpsc::Sender<()>,
}

impl Finalizer {
    pub fn new(
        room_id: impl Into<String>,
        epilogue: Arc<dyn Epilogue>,
    ) -> (Arc<Self>, ShutdownReceiver) {
        let (shutdown, receiver) = mpsc::channel(1);
        let finalizer = Arc::new(Self {
            room_id: room_id.into(),
            epilogue,
            fired: AtomicBool::new(false),
            shutdown,
        });
        (finalizer, receiver)
    }

    /// Probes the configured publisher; called once at bootstrap.
    pub async fn test(&self) -> Result<()> {
        self.epilogue.test().await
    }

    /// Kicks off the detached publish-then-shutdown task. Results with an
    /// empty id get the configured room id stamped in.
    pub fn finalize(&self, mut result: RoomResult) {
        if self.fired.swap(true, Ordering::SeqCst) {
            warn!(room = %self.room_id, "result already published, ignoring");
            return;
        }

        if result.id.is_empty() {
            result.id = self.room_id.clone();
        }

        let epilogue = Arc::clone(&self.epilogue);
        let shutdown = self.shutdown.clone();
        tokio::spawn(async move {
            loop {
                match epilogue.write(&result).await {
                    Ok(()) => {
                        info!(room = %result.id, status = ?result.status, "room finalized");
                        let _ = shutdown.send(()).await;
                        return;
                    }
                    Err(e) => {
                        warn!(error = %e, "could not publish result, retrying");
                        sleep(RETRY_BACKOFF).await;
                    }
                }
            }
        });
    }
}
