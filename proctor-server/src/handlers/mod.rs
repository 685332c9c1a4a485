//! RPC-style handlers, one module per logical service. Every handler runs
//! the same pipeline: the middleware has already authenticated, so handlers
//! authorize, validate, then execute against the broker.

pub mod director;
pub mod messages;
pub mod operator;
pub mod user;

use axum::Json;
use axum::extract::rejection::JsonRejection;

use proctor_core::CoreError;

use crate::errors::AppResult;

/// Unwraps a JSON body, mapping malformed payloads onto `InvalidArgument`
/// instead of axum's default rejection.
fn body<T>(payload: Result<Json<T>, JsonRejection>) -> AppResult<T> {
    match payload {
        Ok(Json(value)) => Ok(value),
        Err(rejection) => Err(CoreError::invalid_argument(format!(
            "malformed request body: {rejection}"
        ))
        .into()),
    }
}

/// Empty ack reply shared by all mutating endpoints.
fn ack() -> Json<serde_json::Value> {
    Json(serde_json::json!({}))
}
