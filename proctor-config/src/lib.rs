//! Static configuration for a Proctor room.
//!
//! A room is configured by exactly two YAML documents, read once at startup
//! and never re-read: `rules.yaml` (the authorization table) and
//! `credentials.yaml` (the participant roster). This crate owns the document
//! shapes, the load/validation pass, and the runtime [`Settings`] the server
//! binary assembles from its flags.

pub mod documents;
pub mod loader;
pub mod settings;

pub use documents::{Credential, RuleEntry, RulesDoc};
pub use loader::{ConfigError, RoomConfig, load_room_config};
pub use settings::{EpilogueSettings, Settings};

/// File name of the authorization document inside the config directory.
pub const RULES_FILE: &str = "rules.yaml";

/// File name of the participant roster inside the config directory.
pub const CREDENTIALS_FILE: &str = "credentials.yaml";
