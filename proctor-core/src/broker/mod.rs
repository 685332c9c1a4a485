//! The broker facade: one critical section over storage, user mutations and
//! fan-out.
//!
//! A single process-wide mutex deliberately trades throughput for a total
//! order: the order in which `put` critical sections commit is the order in
//! which messages reach every matching watcher sink. Delivery to the client
//! transport happens outside the lock, in the server's stream tasks.

mod registry;

use std::sync::Arc;

use tokio::sync::{Mutex, mpsc};
use tracing::warn;

use proctor_model::{Key, Message, User, UserStatus};

use crate::error::Result;
use crate::storage::{StorageBackend, UserFilter};

use registry::WatcherRegistry;

pub use registry::SINK_CAPACITY;

pub struct Broker {
    storage: Arc<dyn StorageBackend>,
    registry: Mutex<WatcherRegistry>,
}

impl Broker {
    pub fn new(storage: Arc<dyn StorageBackend>) -> Self {
        Self {
            storage,
            registry: Mutex::new(WatcherRegistry::new()),
        }
    }

    /// Read access for the authentication path; token and rule lookups are
    /// immutable post-init and may bypass the broker lock.
    pub fn storage(&self) -> &dyn StorageBackend {
        self.storage.as_ref()
    }

    pub async fn get(&self, key: &Key) -> Result<Message> {
        let _registry = self.registry.lock().await;
        self.storage.get_message(key).await
    }

    /// Pattern read. Engine failures degrade to an empty result set; a
    /// wildcard query has no not-found case.
    pub async fn get_all(&self, pattern: &Key) -> Vec<Message> {
        let _registry = self.registry.lock().await;
        match self.storage.select_messages(pattern).await {
            Ok(messages) => messages,
            Err(e) => {
                warn!(pattern = %pattern, error = %e, "pattern read failed, returning empty");
                Vec::new()
            }
        }
    }

    /// Upsert-and-spread. Fan-out happens inside the critical section, so
    /// watchers observe puts in commit order; on storage failure nothing is
    /// spread.
    pub async fn put(&self, message: Message) -> Result<()> {
        let mut registry = self.registry.lock().await;
        self.storage.upsert_message(&message).await?;
        registry.broadcast(&message);
        Ok(())
    }

    /// Exact delete. Deletes are not forwarded to watchers; tombstones are
    /// modeled as explicit put values by consumers that need them.
    pub async fn delete(&self, key: &Key) -> Result<()> {
        let _registry = self.registry.lock().await;
        self.storage.delete_message(key).await
    }

    pub async fn delete_all(&self, pattern: &Key) -> Result<()> {
        let _registry = self.registry.lock().await;
        self.storage.delete_messages(pattern).await?;
        Ok(())
    }

    /// Registers a watcher and returns the drain side of its sink. The
    /// watcher is reaped on the first fan-out after the receiver is dropped.
    pub async fn watch(&self, pattern: Key) -> mpsc::Receiver<Message> {
        let mut registry = self.registry.lock().await;
        registry.register(pattern)
    }

    /// Status write under the broker lock; returns the updated user so the
    /// caller can react to what it just changed.
    pub async fn update_user_status(&self, name: &str, status: UserStatus) -> Result<User> {
        let _registry = self.registry.lock().await;
        self.storage.update_user_status(name, status).await?;
        self.storage.user_by_name(name).await
    }

    pub async fn update_user_readiness(&self, name: &str, readiness: bool) -> Result<()> {
        let _registry = self.registry.lock().await;
        self.storage.update_user_readiness(name, readiness).await
    }

    pub async fn list_users(&self, filter: &UserFilter) -> Result<Vec<User>> {
        let _registry = self.registry.lock().await;
        self.storage.list_users(filter).await
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use proctor_model::Meta;

    use crate::storage::test_support::storage;

    use super::*;

    async fn broker() -> Broker {
        Broker::new(Arc::new(storage(&["player"]).await))
    }

    async fn stamped(broker: &Broker, name: &str, content: &str) -> Message {
        let owner = broker.storage().user_by_name("player-1").await.unwrap();
        Message {
            key: Key::new("action", name, "game1"),
            content: content.into(),
            meta: Some(Meta::stamp(&owner, Utc::now())),
        }
    }

    #[tokio::test]
    async fn puts_fan_out_in_commit_order() -> anyhow::Result<()> {
        let broker = broker().await;
        let mut watcher = broker.watch(Key::new("action", "", "")).await;

        for i in 0..10 {
            let message = stamped(&broker, &format!("m{i}"), &format!("c{i}")).await;
            broker.put(message).await?;
        }

        for i in 0..10 {
            assert_eq!(watcher.recv().await.unwrap().content, format!("c{i}"));
        }
        Ok(())
    }

    #[tokio::test]
    async fn slow_watcher_keeps_a_prefix_and_put_still_succeeds() -> anyhow::Result<()> {
        let broker = broker().await;
        let mut fast = broker.watch(Key::new("action", "", "")).await;
        let mut slow = broker.watch(Key::new("action", "", "")).await;

        for i in 0..200 {
            let message = stamped(&broker, &format!("m{i}"), &format!("c{i}")).await;
            broker.put(message).await?;
            assert_eq!(fast.recv().await.unwrap().content, format!("c{i}"));
        }

        // The stalled watcher observed exactly the first SINK_CAPACITY puts.
        for i in 0..SINK_CAPACITY {
            assert_eq!(slow.try_recv().unwrap().content, format!("c{i}"));
        }
        assert!(slow.try_recv().is_err());
        Ok(())
    }

    #[tokio::test]
    async fn deletes_do_not_reach_watchers() -> anyhow::Result<()> {
        let broker = broker().await;
        let message = stamped(&broker, "m1", "c1").await;
        let key = message.key.clone();
        broker.put(message).await?;

        let mut watcher = broker.watch(Key::new("action", "", "")).await;
        broker.delete(&key).await?;

        assert!(watcher.try_recv().is_err());
        assert!(matches!(
            broker.get(&key).await,
            Err(crate::error::CoreError::NotFound(_))
        ));
        Ok(())
    }

    #[tokio::test]
    async fn storage_failure_on_put_spreads_nothing() -> anyhow::Result<()> {
        let broker = broker().await;
        let mut watcher = broker.watch(Key::new("action", "", "")).await;

        // No meta: the storage layer rejects it before fan-out.
        let bare = Message {
            key: Key::new("action", "m1", "game1"),
            content: "c1".into(),
            meta: None,
        };
        assert!(broker.put(bare).await.is_err());
        assert!(watcher.try_recv().is_err());
        Ok(())
    }
}
