//! The user service: readiness reporting and liveness.

use axum::Json;
use axum::extract::{Extension, State};

use proctor_model::{Method, User};

use crate::errors::AppResult;
use crate::state::AppState;

use super::ack;

pub async fn im_ready(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> AppResult<Json<serde_json::Value>> {
    state.manager.authorize(&user, Method::ImReady, None).await?;
    state.manager.update_readiness(&user.name, true).await?;
    Ok(ack())
}

/// Liveness probe. Authenticated like everything else, but deliberately
/// skips authorization.
pub async fn ping() -> Json<serde_json::Value> {
    ack()
}
