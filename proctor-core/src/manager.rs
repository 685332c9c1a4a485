//! Token resolution, rule-match authorization and user state writes.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use proctor_model::{
    Character, Key, Message, Meta, Method, ResultStatus, RoomResult, User, UserStatus,
    validate_key,
};

use crate::broker::Broker;
use crate::epilogue::Finalizer;
use crate::error::{CoreError, Result};
use crate::storage::{StorageBackend as _, UserFilter};

pub struct Manager {
    broker: Arc<Broker>,
    finalizer: Arc<Finalizer>,
}

impl Manager {
    pub fn new(broker: Arc<Broker>, finalizer: Arc<Finalizer>) -> Self {
        Self { broker, finalizer }
    }

    /// Token → user. Unknown tokens are `Unauthenticated`; anything else the
    /// storage engine reports stays `Internal`.
    pub async fn authenticate(&self, token: &str) -> Result<User> {
        self.broker
            .storage()
            .user_by_token(token)
            .await?
            .ok_or_else(|| CoreError::unauthenticated("invalid token"))
    }

    /// Rule-match authorization.
    ///
    /// Key validation runs first, so a malformed key is `InvalidArgument`
    /// no matter what rules the caller holds. Rules are disjunctive: one
    /// match permits. Methods without a key argument are permitted when any
    /// rule row exists for `(character, role, method)`.
    pub async fn authorize(&self, user: &User, method: Method, key: Option<&Key>) -> Result<()> {
        validate_key(method, key).map_err(CoreError::invalid_argument)?;

        let role = match user.character {
            Character::Actor => user.role.as_str(),
            _ => "",
        };
        let rules = self
            .broker
            .storage()
            .rules_for(user.character, role, method)
            .await?;

        let permitted = match key {
            Some(key) if method.takes_key() => rules.iter().any(|rule| rule.key.matches(key)),
            _ => !rules.is_empty(),
        };

        if permitted {
            debug!(user = %user.name, method = %method, "authorized");
            Ok(())
        } else {
            Err(CoreError::permission_denied(format!(
                "no rule permits {method} for user {}",
                user.name
            )))
        }
    }

    /// Stamps the server-side meta onto an accepted `put`. Whatever the
    /// client sent in `meta` is discarded.
    pub fn stamp_message(&self, user: &User, message: &mut Message) {
        message.meta = Some(Meta::stamp(user, Utc::now()));
    }

    /// Operator-reported status write. Marking a director failed is room
    /// terminal: it synthesizes a failed result and starts the finalize
    /// protocol.
    pub async fn update_status(&self, name: &str, status: UserStatus) -> Result<()> {
        let user = self.broker.update_user_status(name, status).await?;

        if user.character == Character::Director && status == UserStatus::Failed {
            info!(director = %user.name, "director failed, finalizing room");
            self.finalizer.finalize(RoomResult {
                id: String::new(),
                message: "director failed".to_string(),
                status: ResultStatus::Failed,
            });
        }
        Ok(())
    }

    pub async fn update_readiness(&self, name: &str, readiness: bool) -> Result<()> {
        self.broker.update_user_readiness(name, readiness).await
    }

    /// Snapshot of every actor in the room, for the director surface.
    pub async fn actors(&self) -> Result<Vec<User>> {
        self.broker
            .list_users(&UserFilter::by_character(Character::Actor))
            .await
    }

    /// The director's terminal result; acked immediately, published by the
    /// detached finalize task.
    pub fn put_result(&self, result: RoomResult) {
        self.finalizer.finalize(result);
    }
}
