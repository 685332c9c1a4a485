//! Core of the Proctor coordination broker.
//!
//! Everything behind the RPC surface lives here: the SQLite-backed relational
//! store, the mutex-serialized broker with its watcher registry, the
//! token/rule manager, and the epilogue publishers with the finalize
//! protocol. The server crate composes these behind axum handlers.

pub mod broker;
pub mod epilogue;
pub mod error;
pub mod manager;
pub mod storage;

pub use broker::Broker;
pub use epilogue::{ConsoleEpilogue, Epilogue, Finalizer, QueueEpilogue, ShutdownReceiver};
pub use error::{CoreError, Result};
pub use manager::Manager;
pub use storage::{MemoryStorage, SqliteStorage, StorageBackend, UserFilter};
