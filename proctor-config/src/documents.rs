//! Serde shapes of the two on-disk documents.

use std::collections::BTreeMap;

use serde::Deserialize;

use proctor_model::{Character, Key, Method};

/// One entry of a rule list: a key pattern and the methods it permits.
#[derive(Debug, Clone, Deserialize)]
pub struct RuleEntry {
    #[serde(default)]
    pub key: Key,
    pub methods: Vec<Method>,
}

/// `rules.yaml`: per-character rule lists, with actor lists grouped by role.
///
/// Absent sections mean "no explicit rules"; the loader still appends the
/// implicit per-character rules afterwards.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RulesDoc {
    #[serde(default)]
    pub director: Vec<RuleEntry>,
    #[serde(default)]
    pub operator: Vec<RuleEntry>,
    #[serde(default)]
    pub master: Vec<RuleEntry>,
    #[serde(default)]
    pub actors: BTreeMap<String, Vec<RuleEntry>>,
}

/// One entry of `credentials.yaml`.
#[derive(Debug, Clone, Deserialize)]
pub struct Credential {
    pub name: String,
    pub token: String,
    pub character: Character,
    /// Required for actors, must be absent or empty for everyone else.
    #[serde(default)]
    pub role: String,
}
