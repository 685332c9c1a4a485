//! Plain in-process map backend.
//!
//! Functionally equivalent to the SQLite backend minus durability; useful
//! for throwaway rooms and tests. All state sits behind one `RwLock`, which
//! is never held across an await.

use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::info;

use proctor_config::RoomConfig;
use proctor_model::{Character, Key, Message, Meta, Method, Rule, User, UserStatus};

use crate::error::{CoreError, Result};

use super::{StorageBackend, UserFilter};

struct StoredMessage {
    content: String,
    owner: String,
    created_at: DateTime<Utc>,
}

#[derive(Default)]
struct MemoryInner {
    /// name → user; BTreeMap keeps listings name-ordered like the engine.
    users: BTreeMap<String, User>,
    /// token → name.
    tokens: HashMap<String, String>,
    rules: Vec<Rule>,
    messages: HashMap<(String, String, String), StoredMessage>,
}

pub struct MemoryStorage {
    inner: RwLock<MemoryInner>,
}

impl MemoryStorage {
    pub fn new(config: &RoomConfig) -> Self {
        let mut inner = MemoryInner::default();
        for user in &config.users {
            inner.tokens.insert(user.token.clone(), user.name.clone());
            inner.users.insert(user.name.clone(), user.clone());
        }
        inner.rules = config.rules.clone();

        info!(
            users = config.users.len(),
            rules = config.rules.len(),
            "memory storage seeded"
        );
        Self {
            inner: RwLock::new(inner),
        }
    }
}

fn triple(key: &Key) -> (String, String, String) {
    (key.r#type.clone(), key.name.clone(), key.namespace.clone())
}

impl MemoryInner {
    fn rebuild(&self, key: &(String, String, String), stored: &StoredMessage) -> Result<Message> {
        let owner = self
            .users
            .get(&stored.owner)
            .ok_or_else(|| CoreError::internal(format!("message owned by unknown user {}", stored.owner)))?;

        Ok(Message {
            key: Key::new(key.0.clone(), key.1.clone(), key.2.clone()),
            content: stored.content.clone(),
            meta: Some(Meta {
                owner: owner.name.clone(),
                role: owner.role.clone(),
                character: owner.character,
                readiness: owner.readiness,
                status: owner.status,
                creation_time: stored.created_at,
            }),
        })
    }
}

fn matches_filter(user: &User, filter: &UserFilter) -> bool {
    filter.name.as_ref().is_none_or(|n| *n == user.name)
        && filter.token.as_ref().is_none_or(|t| *t == user.token)
        && filter.character.is_none_or(|c| c == user.character)
        && filter.role.as_ref().is_none_or(|r| *r == user.role)
        && filter.readiness.is_none_or(|r| r == user.readiness)
        && filter.status.is_none_or(|s| s == user.status)
}

#[async_trait]
impl StorageBackend for MemoryStorage {
    async fn upsert_message(&self, message: &Message) -> Result<()> {
        let meta = message
            .meta
            .as_ref()
            .ok_or_else(|| CoreError::internal("message reached storage without meta"))?;

        let mut inner = self.inner.write().expect("storage lock");
        inner.messages.insert(
            triple(&message.key),
            StoredMessage {
                content: message.content.clone(),
                owner: meta.owner.clone(),
                created_at: meta.creation_time,
            },
        );
        Ok(())
    }

    async fn get_message(&self, key: &Key) -> Result<Message> {
        let inner = self.inner.read().expect("storage lock");
        let triple = triple(key);
        let stored = inner
            .messages
            .get(&triple)
            .ok_or_else(|| CoreError::not_found(format!("no message with key {key}")))?;
        inner.rebuild(&triple, stored)
    }

    async fn select_messages(&self, pattern: &Key) -> Result<Vec<Message>> {
        let inner = self.inner.read().expect("storage lock");
        let mut messages = Vec::new();
        for (key, stored) in &inner.messages {
            let concrete = Key::new(key.0.clone(), key.1.clone(), key.2.clone());
            if pattern.matches(&concrete) {
                messages.push(inner.rebuild(key, stored)?);
            }
        }
        messages.sort_by(|a, b| {
            (&a.key.r#type, &a.key.namespace, &a.key.name)
                .cmp(&(&b.key.r#type, &b.key.namespace, &b.key.name))
        });
        Ok(messages)
    }

    async fn delete_message(&self, key: &Key) -> Result<()> {
        let mut inner = self.inner.write().expect("storage lock");
        inner
            .messages
            .remove(&triple(key))
            .map(|_| ())
            .ok_or_else(|| CoreError::not_found(format!("no message with key {key}")))
    }

    async fn delete_messages(&self, pattern: &Key) -> Result<u64> {
        let mut inner = self.inner.write().expect("storage lock");
        let before = inner.messages.len();
        inner.messages.retain(|key, _| {
            let concrete = Key::new(key.0.clone(), key.1.clone(), key.2.clone());
            !pattern.matches(&concrete)
        });
        Ok((before - inner.messages.len()) as u64)
    }

    async fn user_by_token(&self, token: &str) -> Result<Option<User>> {
        let inner = self.inner.read().expect("storage lock");
        Ok(inner
            .tokens
            .get(token)
            .and_then(|name| inner.users.get(name))
            .cloned())
    }

    async fn user_by_name(&self, name: &str) -> Result<User> {
        let inner = self.inner.read().expect("storage lock");
        inner
            .users
            .get(name)
            .cloned()
            .ok_or_else(|| CoreError::not_found(format!("no user with name {name}")))
    }

    async fn list_users(&self, filter: &UserFilter) -> Result<Vec<User>> {
        let inner = self.inner.read().expect("storage lock");
        Ok(inner
            .users
            .values()
            .filter(|user| matches_filter(user, filter))
            .cloned()
            .collect())
    }

    async fn update_user_status(&self, name: &str, status: UserStatus) -> Result<()> {
        let mut inner = self.inner.write().expect("storage lock");
        let user = inner
            .users
            .get_mut(name)
            .ok_or_else(|| CoreError::not_found(format!("no user with name {name}")))?;
        user.status = status;
        Ok(())
    }

    async fn update_user_readiness(&self, name: &str, readiness: bool) -> Result<()> {
        let mut inner = self.inner.write().expect("storage lock");
        let user = inner
            .users
            .get_mut(name)
            .ok_or_else(|| CoreError::not_found(format!("no user with name {name}")))?;
        user.readiness = readiness;
        Ok(())
    }

    async fn rules_for(
        &self,
        character: Character,
        role: &str,
        method: Method,
    ) -> Result<Vec<Rule>> {
        let inner = self.inner.read().expect("storage lock");
        Ok(inner
            .rules
            .iter()
            .filter(|rule| {
                rule.character == character && rule.role == role && rule.method == method
            })
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::room_config;
    use super::*;

    fn storage() -> MemoryStorage {
        MemoryStorage::new(&room_config(&["player"]))
    }

    async fn put(storage: &MemoryStorage, key: Key, content: &str) {
        let owner = storage.user_by_name("player-1").await.unwrap();
        let message = Message {
            key,
            content: content.into(),
            meta: Some(Meta::stamp(&owner, Utc::now())),
        };
        storage.upsert_message(&message).await.unwrap();
    }

    #[tokio::test]
    async fn behaves_like_the_engine_for_crud() -> anyhow::Result<()> {
        let storage = storage();

        let key = Key::new("action", "m1", "game1");
        put(&storage, key.clone(), "N").await;
        put(&storage, key.clone(), "S").await;
        put(&storage, Key::new("world", "state", "game1"), "w").await;

        // Upsert kept one row per key, pattern select honors wildcards.
        let message = storage.get_message(&key).await?;
        assert_eq!(message.content, "S");
        assert_eq!(message.meta.unwrap().owner, "player-1");

        let actions = storage.select_messages(&Key::new("action", "", "")).await?;
        assert_eq!(actions.len(), 1);
        assert_eq!(storage.select_messages(&Key::default()).await?.len(), 2);

        assert_eq!(storage.delete_messages(&Key::new("action", "", "")).await?, 1);
        assert!(matches!(
            storage.get_message(&key).await,
            Err(CoreError::NotFound(_))
        ));
        Ok(())
    }

    #[tokio::test]
    async fn user_reads_and_writes_match_the_engine() -> anyhow::Result<()> {
        let storage = storage();

        assert!(storage.user_by_token("tok-player").await?.is_some());
        assert!(storage.user_by_token("bogus").await?.is_none());

        storage.update_user_status("player-1", UserStatus::Running).await?;
        storage.update_user_readiness("player-1", true).await?;
        let user = storage.user_by_name("player-1").await?;
        assert_eq!(user.status, UserStatus::Running);
        assert!(user.readiness);

        let actors = storage
            .list_users(&UserFilter::by_character(Character::Actor))
            .await?;
        assert_eq!(actors.len(), 1);

        let rules = storage
            .rules_for(Character::Actor, "player", Method::Put)
            .await?;
        assert_eq!(rules.len(), 1);
        Ok(())
    }
}
