//! Relational view over messages, users and rules.
//!
//! Two backends implement the same port: an embedded SQLite engine (the
//! default, optionally file-backed for post-mortem inspection) and a plain
//! in-process map store. Both are populated exactly once at startup from
//! the loaded room config; nothing inserts users or rules afterwards.

mod memory;
mod sqlite;

use async_trait::async_trait;

use proctor_model::{Character, Key, Message, Method, Rule, User, UserStatus};

use crate::error::Result;

pub use memory::MemoryStorage;
pub use sqlite::SqliteStorage;

/// Conjunctive filter over the users table; `None` fields are ignored.
#[derive(Debug, Default, Clone)]
pub struct UserFilter {
    pub name: Option<String>,
    pub token: Option<String>,
    pub character: Option<Character>,
    pub role: Option<String>,
    pub readiness: Option<bool>,
    pub status: Option<UserStatus>,
}

impl UserFilter {
    pub fn by_character(character: Character) -> Self {
        Self {
            character: Some(character),
            ..Self::default()
        }
    }
}

/// Port every storage backend implements.
///
/// Exact-match operations assume keys validated complete upstream; pattern
/// operations treat empty key components as "any value". `NotFound` is
/// reserved for missing single-key reads and deletes; engine failures are
/// `Internal`.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Primary-key upsert on the key triple.
    async fn upsert_message(&self, message: &Message) -> Result<()>;

    async fn get_message(&self, key: &Key) -> Result<Message>;

    async fn select_messages(&self, pattern: &Key) -> Result<Vec<Message>>;

    async fn delete_message(&self, key: &Key) -> Result<()>;

    /// Returns how many rows went away.
    async fn delete_messages(&self, pattern: &Key) -> Result<u64>;

    /// Single indexed lookup backing authentication. `None` means the token
    /// is unknown; the caller decides what that implies.
    async fn user_by_token(&self, token: &str) -> Result<Option<User>>;

    async fn user_by_name(&self, name: &str) -> Result<User>;

    async fn list_users(&self, filter: &UserFilter) -> Result<Vec<User>>;

    async fn update_user_status(&self, name: &str, status: UserStatus) -> Result<()>;

    async fn update_user_readiness(&self, name: &str, readiness: bool) -> Result<()>;

    /// All rules applying to `(character, role, method)`. Non-actor rules
    /// are stored with an empty role, so passing the caller's role verbatim
    /// only matters for actors.
    async fn rules_for(&self, character: Character, role: &str, method: Method)
    -> Result<Vec<Rule>>;
}
