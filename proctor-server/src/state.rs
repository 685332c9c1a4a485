use std::sync::Arc;

use proctor_core::{Broker, Manager};

/// Server application state, cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    pub broker: Arc<Broker>,
    pub manager: Arc<Manager>,
}
