//! Core data model definitions shared across Proctor crates.

pub mod key;
pub mod message;
pub mod method;
pub mod result;
pub mod rule;
pub mod user;
pub mod validate;

// Intentionally curated re-exports for downstream consumers.
pub use key::Key;
pub use message::{Message, Meta};
pub use method::{Method, ParseMethodError};
pub use result::{ResultStatus, RoomResult};
pub use rule::Rule;
pub use user::{Character, ParseCharacterError, ParseStatusError, User, UserStatus};
pub use validate::{KeyValidationError, validate_key};
