use crate::key::Key;
use crate::method::Method;

/// Rejection produced by [`validate_key`]. Maps to `InvalidArgument` at the
/// RPC boundary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeyValidationError {
    #[error("method {0} requires a key")]
    MissingKey(Method),
    #[error("method {0} requires a complete key, component {1} is empty")]
    IncompleteKey(Method, &'static str),
}

/// Method-specific key well-formedness.
///
/// Exact-match methods (`get`, `put`, `delete`) need every component;
/// pattern methods (`get-all`, `delete-all`, `watch`) accept empty
/// components as wildcards but still reject an absent key. Key-less methods
/// accept anything.
pub fn validate_key(method: Method, key: Option<&Key>) -> Result<(), KeyValidationError> {
    if !method.takes_key() {
        return Ok(());
    }

    let key = key.ok_or(KeyValidationError::MissingKey(method))?;

    match method {
        Method::Get | Method::Put | Method::Delete => {
            if key.r#type.is_empty() {
                return Err(KeyValidationError::IncompleteKey(method, "type"));
            }
            if key.name.is_empty() {
                return Err(KeyValidationError::IncompleteKey(method, "name"));
            }
            if key.namespace.is_empty() {
                return Err(KeyValidationError::IncompleteKey(method, "namespace"));
            }
            Ok(())
        }
        _ => Ok(()),
    }
}
