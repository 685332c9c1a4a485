//! The message service: exact CRUD, pattern bulk operations and watch.

use std::time::Duration;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Extension, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use futures::StreamExt;
use futures::stream;
use tokio_stream::wrappers::ReceiverStream;
use tracing::debug;

use proctor_core::CoreError;
use proctor_model::{Key, Message, Method, User};

use crate::errors::AppResult;
use crate::state::AppState;

use super::{ack, body};

/// Idle ping interval on watch transports.
const KEEPALIVE_INTERVAL: Duration = Duration::from_secs(3);

fn require_key(key: Option<Key>, method: Method) -> AppResult<Key> {
    // Authorize has already validated presence; this keeps the handler
    // honest without panicking on a broken pipeline.
    key.ok_or_else(|| CoreError::invalid_argument(format!("method {method} requires a key")).into())
}

pub async fn get(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    payload: Result<Json<Option<Key>>, JsonRejection>,
) -> AppResult<Json<Message>> {
    let key = body(payload)?;
    state
        .manager
        .authorize(&user, Method::Get, key.as_ref())
        .await?;
    let key = require_key(key, Method::Get)?;

    let message = state.broker.get(&key).await?;
    Ok(Json(message))
}

pub async fn get_all(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    payload: Result<Json<Option<Key>>, JsonRejection>,
) -> AppResult<Response> {
    let key = body(payload)?;
    state
        .manager
        .authorize(&user, Method::GetAll, key.as_ref())
        .await?;
    let key = require_key(key, Method::GetAll)?;

    let messages = state.broker.get_all(&key).await;
    debug!(pattern = %key, count = messages.len(), "streaming pattern read");

    let stream = stream::iter(
        messages
            .into_iter()
            .map(|message| Event::default().json_data(&message)),
    );
    Ok(Sse::new(stream).into_response())
}

pub async fn put(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    payload: Result<Json<Option<Message>>, JsonRejection>,
) -> AppResult<Json<serde_json::Value>> {
    let message = body(payload)?;
    let mut message =
        message.ok_or_else(|| CoreError::invalid_argument("nil message in put request"))?;

    state
        .manager
        .authorize(&user, Method::Put, Some(&message.key))
        .await?;
    state.manager.stamp_message(&user, &mut message);

    state.broker.put(message).await?;
    Ok(ack())
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    payload: Result<Json<Option<Key>>, JsonRejection>,
) -> AppResult<Json<serde_json::Value>> {
    let key = body(payload)?;
    state
        .manager
        .authorize(&user, Method::Delete, key.as_ref())
        .await?;
    let key = require_key(key, Method::Delete)?;

    state.broker.delete(&key).await?;
    Ok(ack())
}

pub async fn delete_all(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    payload: Result<Json<Option<Key>>, JsonRejection>,
) -> AppResult<Json<serde_json::Value>> {
    let key = body(payload)?;
    state
        .manager
        .authorize(&user, Method::DeleteAll, key.as_ref())
        .await?;
    let key = require_key(key, Method::DeleteAll)?;

    state.broker.delete_all(&key).await?;
    Ok(ack())
}

/// Registers a watcher and streams its sink until the client goes away. The
/// drain side lives in this response stream, outside the broker lock; when
/// the transport errors or the client cancels, dropping the stream closes
/// the sink and the registry reaps the watcher on the next fan-out.
pub async fn watch(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    payload: Result<Json<Option<Key>>, JsonRejection>,
) -> AppResult<Response> {
    let key = body(payload)?;
    state
        .manager
        .authorize(&user, Method::Watch, key.as_ref())
        .await?;
    let key = require_key(key, Method::Watch)?;

    debug!(pattern = %key, watcher = %user.name, "watch stream opened");
    let receiver = state.broker.watch(key).await;
    let stream =
        ReceiverStream::new(receiver).map(|message| Event::default().json_data(&message));

    Ok(Sse::new(stream)
        .keep_alive(
            KeepAlive::new()
                .interval(KEEPALIVE_INTERVAL)
                .text("ping"),
        )
        .into_response())
}
