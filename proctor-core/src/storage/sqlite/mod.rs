//! The embedded SQLite backend.

mod messages;
mod rules;
mod users;

use std::path::Path;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::info;

use proctor_config::RoomConfig;
use proctor_model::{Character, Key, Message, Method, Rule, User, UserStatus};

use crate::error::{CoreError, Result};

use super::{StorageBackend, UserFilter};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    name      TEXT PRIMARY KEY NOT NULL,
    token     TEXT NOT NULL UNIQUE,
    character TEXT NOT NULL,
    role      TEXT NOT NULL DEFAULT '',
    readiness INTEGER NOT NULL DEFAULT 0,
    status    TEXT NOT NULL DEFAULT 'unknown'
);

CREATE TABLE IF NOT EXISTS rules (
    id        INTEGER PRIMARY KEY AUTOINCREMENT,
    character TEXT NOT NULL,
    role      TEXT NOT NULL DEFAULT '',
    method    TEXT NOT NULL,
    type      TEXT NOT NULL DEFAULT '',
    name      TEXT NOT NULL DEFAULT '',
    namespace TEXT NOT NULL DEFAULT ''
);

CREATE INDEX IF NOT EXISTS idx_rules_lookup ON rules (character, role, method);

CREATE TABLE IF NOT EXISTS messages (
    type       TEXT NOT NULL,
    name       TEXT NOT NULL,
    namespace  TEXT NOT NULL,
    content    TEXT NOT NULL DEFAULT '',
    owner_name TEXT NOT NULL REFERENCES users (name),
    created_at TEXT NOT NULL,
    PRIMARY KEY (type, name, namespace)
);
"#;

/// Handle on the embedded engine. Cheap to clone; all clones share the pool.
///
/// The pool is capped at a single connection: with `:memory:` databases each
/// connection would otherwise see its own empty database, and the broker
/// mutex already serializes every write.
#[derive(Debug, Clone)]
pub struct SqliteStorage {
    pool: SqlitePool,
}

impl SqliteStorage {
    /// Opens the database (in-memory when `path` is `None`), creates the
    /// tables and seeds them from the room config.
    pub async fn open(path: Option<&Path>, config: &RoomConfig) -> Result<Self> {
        let options = match path {
            Some(path) => SqliteConnectOptions::new()
                .filename(path)
                .create_if_missing(true),
            None => SqliteConnectOptions::new().in_memory(true),
        };

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(|e| CoreError::internal(format!("could not open sqlite database: {e}")))?;

        let storage = Self { pool };
        storage.prepare(config).await?;
        Ok(storage)
    }

    pub(crate) fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn prepare(&self, config: &RoomConfig) -> Result<()> {
        sqlx::raw_sql(SCHEMA)
            .execute(self.pool())
            .await
            .map_err(|e| CoreError::internal(format!("could not create tables: {e}")))?;

        for user in &config.users {
            self.insert_user(user).await?;
        }
        for rule in &config.rules {
            self.insert_rule(rule).await?;
        }

        info!(
            users = config.users.len(),
            rules = config.rules.len(),
            "sqlite storage seeded"
        );
        Ok(())
    }
}

#[async_trait]
impl StorageBackend for SqliteStorage {
    async fn upsert_message(&self, message: &Message) -> Result<()> {
        self.upsert_message(message).await
    }

    async fn get_message(&self, key: &Key) -> Result<Message> {
        self.get_message(key).await
    }

    async fn select_messages(&self, pattern: &Key) -> Result<Vec<Message>> {
        self.select_messages(pattern).await
    }

    async fn delete_message(&self, key: &Key) -> Result<()> {
        self.delete_message(key).await
    }

    async fn delete_messages(&self, pattern: &Key) -> Result<u64> {
        self.delete_messages(pattern).await
    }

    async fn user_by_token(&self, token: &str) -> Result<Option<User>> {
        self.user_by_token(token).await
    }

    async fn user_by_name(&self, name: &str) -> Result<User> {
        self.user_by_name(name).await
    }

    async fn list_users(&self, filter: &UserFilter) -> Result<Vec<User>> {
        self.list_users(filter).await
    }

    async fn update_user_status(&self, name: &str, status: UserStatus) -> Result<()> {
        self.update_user_status(name, status).await
    }

    async fn update_user_readiness(&self, name: &str, readiness: bool) -> Result<()> {
        self.update_user_readiness(name, readiness).await
    }

    async fn rules_for(
        &self,
        character: Character,
        role: &str,
        method: Method,
    ) -> Result<Vec<Rule>> {
        self.rules_for(character, role, method).await
    }
}
