//! Watcher bookkeeping and fan-out.
//!
//! Each watcher owns a bounded sink. Enqueueing is non-blocking: a full sink
//! costs that watcher the message, nobody else. Closed watchers are reaped
//! in the same pass, swap-removed to keep the scan linear.

use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, warn};

use proctor_model::{Key, Message};

/// Capacity of every watcher sink.
pub const SINK_CAPACITY: usize = 128;

struct Watcher {
    pattern: Key,
    sink: mpsc::Sender<Message>,
}

#[derive(Default)]
pub(super) struct WatcherRegistry {
    watchers: Vec<Watcher>,
}

impl WatcherRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a watcher for `pattern` and hands back the drain side of
    /// its sink. The watcher lives until that receiver is dropped.
    pub fn register(&mut self, pattern: Key) -> mpsc::Receiver<Message> {
        let (sink, drain) = mpsc::channel(SINK_CAPACITY);
        debug!(pattern = %pattern, watchers = self.watchers.len() + 1, "watcher registered");
        self.watchers.push(Watcher { pattern, sink });
        drain
    }

    /// Offers `message` to every matching watcher, reaping closed ones.
    pub fn broadcast(&mut self, message: &Message) {
        let mut index = 0;
        while index < self.watchers.len() {
            let watcher = &self.watchers[index];

            if watcher.sink.is_closed() {
                self.watchers.swap_remove(index);
                continue;
            }

            if watcher.pattern.matches(&message.key) {
                match watcher.sink.try_send(message.clone()) {
                    Ok(()) => {}
                    Err(TrySendError::Full(_)) => {
                        warn!(key = %message.key, "watcher sink full, dropping message");
                    }
                    Err(TrySendError::Closed(_)) => {
                        self.watchers.swap_remove(index);
                        continue;
                    }
                }
            }

            index += 1;
        }
    }

    pub fn len(&self) -> usize {
        self.watchers.len()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use proctor_model::{Character, Meta, UserStatus};

    use super::*;

    fn message(name: &str) -> Message {
        Message {
            key: Key::new("action", name, "game1"),
            content: name.into(),
            meta: Some(Meta {
                owner: "alice".into(),
                role: "player".into(),
                character: Character::Actor,
                readiness: false,
                status: UserStatus::Unknown,
                creation_time: Utc::now(),
            }),
        }
    }

    #[tokio::test]
    async fn only_matching_watchers_receive() {
        let mut registry = WatcherRegistry::new();
        let mut actions = registry.register(Key::new("action", "", ""));
        let mut worlds = registry.register(Key::new("world", "", ""));

        registry.broadcast(&message("m1"));

        assert_eq!(actions.try_recv().unwrap().content, "m1");
        assert!(worlds.try_recv().is_err());
    }

    #[tokio::test]
    async fn full_sinks_drop_without_affecting_others() {
        let mut registry = WatcherRegistry::new();
        let mut draining = registry.register(Key::new("action", "", ""));
        let mut stuck = registry.register(Key::new("action", "", ""));

        for i in 0..SINK_CAPACITY + 72 {
            registry.broadcast(&message(&format!("m{i}")));
            // One consumer keeps up, the other never reads.
            assert_eq!(draining.try_recv().unwrap().content, format!("m{i}"));
        }

        // The stuck watcher kept exactly the first SINK_CAPACITY, in order.
        for i in 0..SINK_CAPACITY {
            assert_eq!(stuck.try_recv().unwrap().content, format!("m{i}"));
        }
        assert!(stuck.try_recv().is_err());
        assert_eq!(registry.len(), 2);
    }

    #[tokio::test]
    async fn closed_watchers_are_reaped_on_broadcast() {
        let mut registry = WatcherRegistry::new();
        let gone = registry.register(Key::new("action", "", ""));
        let _alive = registry.register(Key::new("action", "", ""));
        assert_eq!(registry.len(), 2);

        drop(gone);
        registry.broadcast(&message("m1"));
        assert_eq!(registry.len(), 1);
    }
}
