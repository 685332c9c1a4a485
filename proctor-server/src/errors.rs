use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use proctor_core::CoreError;

pub type AppResult<T> = Result<T, AppError>;

/// Transport-side wrapper of the core error taxonomy. The mapping onto HTTP
/// statuses is the only place the taxonomy meets the wire.
#[derive(Debug)]
pub struct AppError(pub CoreError);

impl AppError {
    fn status(&self) -> StatusCode {
        match self.0 {
            CoreError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            CoreError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            CoreError::PermissionDenied(_) => StatusCode::FORBIDDEN,
            CoreError::NotFound(_) => StatusCode::NOT_FOUND,
            CoreError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            CoreError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        Self(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({
            "error": {
                "message": self.0.to_string(),
                "status": status.as_u16(),
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn taxonomy_maps_onto_canonical_statuses() {
        let cases = [
            (CoreError::invalid_argument("x"), StatusCode::BAD_REQUEST),
            (CoreError::unauthenticated("x"), StatusCode::UNAUTHORIZED),
            (CoreError::permission_denied("x"), StatusCode::FORBIDDEN),
            (CoreError::not_found("x"), StatusCode::NOT_FOUND),
            (CoreError::unavailable("x"), StatusCode::SERVICE_UNAVAILABLE),
            (CoreError::internal("x"), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(AppError(err).status(), status);
        }
    }
}
