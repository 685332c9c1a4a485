use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;

use proctor_core::CoreError;

use crate::errors::AppError;
use crate::state::AppState;

/// Metadata key carrying the bearer token on every request.
pub const TOKEN_HEADER: &str = "token";

/// Stages 1 and 2 of the pipeline, shared by every route: pull the token out
/// of the request metadata, resolve it to a user, attach the user to the
/// request. Authorization stays per-handler because it needs the method and
/// key.
pub async fn token_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_token(&request)?;
    let user = state.manager.authenticate(&token).await?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

fn extract_token(request: &Request) -> Result<String, AppError> {
    let mut values = request.headers().get_all(TOKEN_HEADER).iter();

    let value = values
        .next()
        .ok_or_else(|| AppError(CoreError::invalid_argument("missing token metadata")))?;
    if values.next().is_some() {
        return Err(AppError(CoreError::invalid_argument(
            "duplicate token metadata",
        )));
    }

    let token = value
        .to_str()
        .map_err(|_| AppError(CoreError::invalid_argument("malformed token metadata")))?;
    Ok(token.to_string())
}
