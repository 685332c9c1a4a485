//! Loading and validation of the room documents.

use std::collections::BTreeSet;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use proctor_model::{Character, Key, Method, Rule, User, UserStatus};

use crate::documents::{Credential, RuleEntry, RulesDoc};
use crate::{CREDENTIALS_FILE, RULES_FILE};

/// Typed load failures. The server treats any of these as a fatal bootstrap
/// error (non-zero exit).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("duplicate user name in credentials: {0}")]
    DuplicateName(String),
    #[error("duplicate token in credentials (user {0})")]
    DuplicateToken(String),
    #[error("actor credential {0} has no role")]
    MissingRole(String),
    #[error("credential {0} carries a role but is not an actor")]
    UnexpectedRole(String),
}

/// Everything the storage layer is seeded with at startup.
#[derive(Debug, Clone)]
pub struct RoomConfig {
    pub users: Vec<User>,
    pub rules: Vec<Rule>,
}

/// Reads `rules.yaml` and `credentials.yaml` from `dir`, flattens the rule
/// lists, appends the implicit per-character rules and validates the roster.
pub fn load_room_config(dir: &Path) -> Result<RoomConfig, ConfigError> {
    let rules_doc: RulesDoc = read_yaml(&dir.join(RULES_FILE))?;
    let credentials: Vec<Credential> = read_yaml(&dir.join(CREDENTIALS_FILE))?;

    let users = build_users(&credentials)?;
    let rules = build_rules(&rules_doc, &credentials);

    Ok(RoomConfig { users, rules })
}

fn read_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn build_users(credentials: &[Credential]) -> Result<Vec<User>, ConfigError> {
    let mut names = HashSet::new();
    let mut tokens = HashSet::new();
    let mut users = Vec::with_capacity(credentials.len());

    for cred in credentials {
        if !names.insert(cred.name.as_str()) {
            return Err(ConfigError::DuplicateName(cred.name.clone()));
        }
        if !tokens.insert(cred.token.as_str()) {
            return Err(ConfigError::DuplicateToken(cred.name.clone()));
        }
        match cred.character {
            Character::Actor if cred.role.is_empty() => {
                return Err(ConfigError::MissingRole(cred.name.clone()));
            }
            Character::Actor => {}
            _ if !cred.role.is_empty() => {
                return Err(ConfigError::UnexpectedRole(cred.name.clone()));
            }
            _ => {}
        }

        users.push(User {
            name: cred.name.clone(),
            token: cred.token.clone(),
            character: cred.character,
            role: cred.role.clone(),
            readiness: false,
            status: UserStatus::default(),
        });
    }

    Ok(users)
}

fn build_rules(doc: &RulesDoc, credentials: &[Credential]) -> Vec<Rule> {
    let mut rules = Vec::new();

    flatten(&mut rules, Character::Director, "", &doc.director);
    flatten(&mut rules, Character::Operator, "", &doc.operator);
    flatten(&mut rules, Character::Master, "", &doc.master);
    for (role, entries) in &doc.actors {
        flatten(&mut rules, Character::Actor, role, entries);
    }

    // Implicit rules every room gets, independent of the documents.
    for method in [Method::GetActors, Method::PutResult, Method::Ping] {
        rules.push(implicit(Character::Director, "", method));
    }
    for method in [Method::SetUserStatus, Method::Ping] {
        rules.push(implicit(Character::Operator, "", method));
    }

    // Every actor role in play, whether it appears in the rules document or
    // only on a credential, may report readiness and ping.
    let roles: BTreeSet<&str> = doc
        .actors
        .keys()
        .map(String::as_str)
        .chain(credentials.iter().filter_map(|c| {
            (c.character == Character::Actor).then_some(c.role.as_str())
        }))
        .collect();
    for role in roles {
        for method in [Method::ImReady, Method::Ping] {
            rules.push(implicit(Character::Actor, role, method));
        }
    }

    rules
}

fn flatten(rules: &mut Vec<Rule>, character: Character, role: &str, entries: &[RuleEntry]) {
    for entry in entries {
        for method in &entry.methods {
            rules.push(Rule {
                character,
                role: role.to_string(),
                method: *method,
                key: entry.key.clone(),
            });
        }
    }
}

fn implicit(character: Character, role: &str, method: Method) -> Rule {
    Rule {
        character,
        role: role.to_string(),
        method,
        key: Key::default(),
    }
}
