//! # Proctor Server
//!
//! Single-room coordination broker for competition and simulation platforms.
//!
//! ## Overview
//!
//! A room hosts four kinds of participants: actors produce and consume
//! messages under a typed key space, a director orchestrates the room and
//! submits the final result, an operator reports per-participant status, and
//! a master observes. Every interaction goes through the same pipeline:
//! token extraction, authentication, rule-based authorization, key
//! validation, then the broker operation, unary or server-streamed.
//!
//! ## Architecture
//!
//! The server is built on axum and composes the `proctor-core` pieces:
//! - SQLite (in-memory by default) for messages, users and rules
//! - a mutex-serialized broker with bounded watcher sinks
//! - console or AMQP result publication with the finalize protocol

/// Error types and handling
pub mod errors;

/// Request pipeline stages shared by every handler
pub mod middleware;

/// RPC-style request handlers
pub mod handlers;

/// Versioned route organization
pub mod routes;

/// Server application state
pub mod state;

pub use errors::{AppError, AppResult};
pub use routes::api_router;
pub use state::AppState;
