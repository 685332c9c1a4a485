//! The director service: actor inspection and the terminal room result.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Extension, State};
use axum::response::sse::{Event, Sse};
use axum::response::{IntoResponse, Response};
use futures::stream;
use tracing::info;

use proctor_core::CoreError;
use proctor_model::{Method, RoomResult, User};

use crate::errors::AppResult;
use crate::state::AppState;

use super::{ack, body};

pub async fn get_actors(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> AppResult<Response> {
    state
        .manager
        .authorize(&user, Method::GetActors, None)
        .await?;

    let actors = state.manager.actors().await?;
    let stream = stream::iter(
        actors
            .into_iter()
            .map(|actor| Event::default().json_data(&actor)),
    );
    Ok(Sse::new(stream).into_response())
}

/// Acks immediately; the finalize protocol publishes in a detached task and
/// shuts the room down once the result is out. Requests keep being served
/// until then.
pub async fn put_result(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    payload: Result<Json<Option<RoomResult>>, JsonRejection>,
) -> AppResult<Json<serde_json::Value>> {
    let result = body(payload)?;
    let result =
        result.ok_or_else(|| CoreError::invalid_argument("nil result in put-result request"))?;

    state
        .manager
        .authorize(&user, Method::PutResult, None)
        .await?;

    info!(director = %user.name, status = ?result.status, "room result submitted");
    state.manager.put_result(result);
    Ok(ack())
}
