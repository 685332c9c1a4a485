//! The operator service: per-user status reports.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Extension, State};
use serde::Deserialize;
use tracing::info;

use proctor_model::{Method, User, UserStatus};

use crate::errors::AppResult;
use crate::state::AppState;

use super::{ack, body};

/// Body of a status report.
#[derive(Debug, Deserialize)]
pub struct Report {
    pub name: String,
    pub status: UserStatus,
}

pub async fn set_user_status(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    payload: Result<Json<Report>, JsonRejection>,
) -> AppResult<Json<serde_json::Value>> {
    let report = body(payload)?;
    state
        .manager
        .authorize(&user, Method::SetUserStatus, None)
        .await?;

    info!(subject = %report.name, status = %report.status, reporter = %user.name, "status report");
    state
        .manager
        .update_status(&report.name, report.status)
        .await?;
    Ok(ack())
}
