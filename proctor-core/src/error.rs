use std::fmt::Display;

/// Canonical error kinds every pipeline stage maps into. The server
/// translates these onto HTTP statuses; nothing below the RPC boundary deals
/// in transport codes.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("unauthenticated: {0}")]
    Unauthenticated(String),
    #[error("permission denied: {0}")]
    PermissionDenied(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("internal: {0}")]
    Internal(String),
    #[error("unavailable: {0}")]
    Unavailable(String),
}

impl CoreError {
    pub fn invalid_argument(msg: impl Display) -> Self {
        Self::InvalidArgument(msg.to_string())
    }

    pub fn unauthenticated(msg: impl Display) -> Self {
        Self::Unauthenticated(msg.to_string())
    }

    pub fn permission_denied(msg: impl Display) -> Self {
        Self::PermissionDenied(msg.to_string())
    }

    pub fn not_found(msg: impl Display) -> Self {
        Self::NotFound(msg.to_string())
    }

    pub fn internal(msg: impl Display) -> Self {
        Self::Internal(msg.to_string())
    }

    pub fn unavailable(msg: impl Display) -> Self {
        Self::Unavailable(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
