//! Messages table: primary key is the full key triple. Reads join the users
//! table so a message's meta reflects its owner's current row.

use chrono::{DateTime, Utc};
use sqlx::QueryBuilder;
use sqlx::Sqlite;

use proctor_model::{Key, Message, Meta};

use crate::error::{CoreError, Result};

use super::SqliteStorage;

const SELECT_MESSAGES: &str = "SELECT m.type, m.name, m.namespace, m.content, m.created_at, \
     u.name AS owner_name, u.role AS owner_role, u.character AS owner_character, \
     u.readiness AS owner_readiness, u.status AS owner_status \
     FROM messages m JOIN users u ON u.name = m.owner_name WHERE 1 = 1";

#[derive(sqlx::FromRow)]
struct MessageRow {
    #[sqlx(rename = "type")]
    kind: String,
    name: String,
    namespace: String,
    content: String,
    created_at: DateTime<Utc>,
    owner_name: String,
    owner_role: String,
    owner_character: String,
    owner_readiness: bool,
    owner_status: String,
}

impl MessageRow {
    fn into_message(self) -> Result<Message> {
        Ok(Message {
            key: Key::new(self.kind, self.name, self.namespace),
            content: self.content,
            meta: Some(Meta {
                owner: self.owner_name,
                role: self.owner_role,
                character: self
                    .owner_character
                    .parse()
                    .map_err(|e| CoreError::internal(format!("corrupt message row: {e}")))?,
                readiness: self.owner_readiness,
                status: self
                    .owner_status
                    .parse()
                    .map_err(|e| CoreError::internal(format!("corrupt message row: {e}")))?,
                creation_time: self.created_at,
            }),
        })
    }
}

fn push_key_filters<'a>(qb: &mut QueryBuilder<'a, Sqlite>, pattern: &'a Key) {
    if !pattern.r#type.is_empty() {
        qb.push(" AND m.type = ").push_bind(&pattern.r#type);
    }
    if !pattern.name.is_empty() {
        qb.push(" AND m.name = ").push_bind(&pattern.name);
    }
    if !pattern.namespace.is_empty() {
        qb.push(" AND m.namespace = ").push_bind(&pattern.namespace);
    }
}

impl SqliteStorage {
    /// Primary-key upsert. The caller has already stamped `meta`; a message
    /// without it is an upstream invariant violation.
    pub async fn upsert_message(&self, message: &Message) -> Result<()> {
        let meta = message
            .meta
            .as_ref()
            .ok_or_else(|| CoreError::internal("message reached storage without meta"))?;

        sqlx::query(
            "INSERT INTO messages (type, name, namespace, content, owner_name, created_at) \
             VALUES (?, ?, ?, ?, ?, ?) \
             ON CONFLICT (type, name, namespace) DO UPDATE SET \
             content = excluded.content, owner_name = excluded.owner_name, \
             created_at = excluded.created_at",
        )
        .bind(&message.key.r#type)
        .bind(&message.key.name)
        .bind(&message.key.namespace)
        .bind(&message.content)
        .bind(&meta.owner)
        .bind(meta.creation_time)
        .execute(self.pool())
        .await
        .map_err(|e| {
            CoreError::internal(format!("could not put message {}: {e}", message.key))
        })?;
        Ok(())
    }

    /// Exact-match read; the key is validated complete upstream.
    pub async fn get_message(&self, key: &Key) -> Result<Message> {
        let row: Option<MessageRow> = sqlx::query_as(
            "SELECT m.type, m.name, m.namespace, m.content, m.created_at, \
             u.name AS owner_name, u.role AS owner_role, u.character AS owner_character, \
             u.readiness AS owner_readiness, u.status AS owner_status \
             FROM messages m JOIN users u ON u.name = m.owner_name \
             WHERE m.type = ? AND m.name = ? AND m.namespace = ?",
        )
        .bind(&key.r#type)
        .bind(&key.name)
        .bind(&key.namespace)
        .fetch_optional(self.pool())
        .await
        .map_err(|e| CoreError::internal(format!("could not get message {key}: {e}")))?;

        row.ok_or_else(|| CoreError::not_found(format!("no message with key {key}")))?
            .into_message()
    }

    /// Pattern read; empty components match any value.
    pub async fn select_messages(&self, pattern: &Key) -> Result<Vec<Message>> {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(SELECT_MESSAGES);
        push_key_filters(&mut qb, pattern);
        qb.push(" ORDER BY m.type, m.namespace, m.name");

        let rows: Vec<MessageRow> = qb
            .build_query_as()
            .fetch_all(self.pool())
            .await
            .map_err(|e| CoreError::internal(format!("could not select messages: {e}")))?;

        rows.into_iter().map(MessageRow::into_message).collect()
    }

    /// Exact-match delete.
    pub async fn delete_message(&self, key: &Key) -> Result<()> {
        let result =
            sqlx::query("DELETE FROM messages WHERE type = ? AND name = ? AND namespace = ?")
                .bind(&key.r#type)
                .bind(&key.name)
                .bind(&key.namespace)
                .execute(self.pool())
                .await
                .map_err(|e| {
                    CoreError::internal(format!("could not delete message {key}: {e}"))
                })?;

        if result.rows_affected() == 0 {
            return Err(CoreError::not_found(format!("no message with key {key}")));
        }
        Ok(())
    }

    /// Pattern delete; returns how many rows went away.
    pub async fn delete_messages(&self, pattern: &Key) -> Result<u64> {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("DELETE FROM messages WHERE 1 = 1");
        if !pattern.r#type.is_empty() {
            qb.push(" AND type = ").push_bind(&pattern.r#type);
        }
        if !pattern.name.is_empty() {
            qb.push(" AND name = ").push_bind(&pattern.name);
        }
        if !pattern.namespace.is_empty() {
            qb.push(" AND namespace = ").push_bind(&pattern.namespace);
        }

        let result = qb
            .build()
            .execute(self.pool())
            .await
            .map_err(|e| CoreError::internal(format!("could not delete messages: {e}")))?;
        Ok(result.rows_affected())
    }
}
