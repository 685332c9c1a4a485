use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Participant class. Determines which rule group applies to a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Character {
    Director,
    Master,
    Operator,
    Actor,
}

impl Character {
    pub fn as_str(&self) -> &'static str {
        match self {
            Character::Director => "director",
            Character::Master => "master",
            Character::Operator => "operator",
            Character::Actor => "actor",
        }
    }
}

impl fmt::Display for Character {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown character: {0}")]
pub struct ParseCharacterError(pub String);

impl FromStr for Character {
    type Err = ParseCharacterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "director" => Ok(Character::Director),
            "master" => Ok(Character::Master),
            "operator" => Ok(Character::Operator),
            "actor" => Ok(Character::Actor),
            other => Err(ParseCharacterError(other.to_string())),
        }
    }
}

/// Operator-reported liveness of a user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    #[default]
    Unknown,
    Running,
    Failed,
}

impl UserStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserStatus::Unknown => "unknown",
            UserStatus::Running => "running",
            UserStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for UserStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown status: {0}")]
pub struct ParseStatusError(pub String);

impl FromStr for UserStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unknown" => Ok(UserStatus::Unknown),
            "running" => Ok(UserStatus::Running),
            "failed" => Ok(UserStatus::Failed),
            other => Err(ParseStatusError(other.to_string())),
        }
    }
}

/// A room participant. Created once at startup from the credentials document.
///
/// `name`, `token`, `character` and `role` are immutable for the life of the
/// process; only `readiness` and `status` ever change. The bearer token never
/// leaves the process: it is accepted on deserialization (credentials, test
/// fixtures) but skipped when a user is serialized onto the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub name: String,
    #[serde(default, skip_serializing)]
    pub token: String,
    pub character: Character,
    /// Discriminator within actors (e.g. `player`, `judge`); empty for
    /// directors, masters and operators.
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub readiness: bool,
    #[serde(default)]
    pub status: UserStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn character_round_trips_through_str() {
        for c in [
            Character::Director,
            Character::Master,
            Character::Operator,
            Character::Actor,
        ] {
            assert_eq!(c.as_str().parse::<Character>().unwrap(), c);
        }
        assert!("referee".parse::<Character>().is_err());
    }

    #[test]
    fn token_is_never_serialized() {
        let user = User {
            name: "alice".into(),
            token: "secret".into(),
            character: Character::Actor,
            role: "player".into(),
            readiness: false,
            status: UserStatus::Unknown,
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("secret"));
        assert!(!json.contains("token"));
    }

    #[test]
    fn status_defaults_to_unknown() {
        let user: User = serde_json::from_str(
            r#"{"name":"d","character":"director"}"#,
        )
        .unwrap();
        assert_eq!(user.status, UserStatus::Unknown);
        assert!(!user.readiness);
        assert!(user.role.is_empty());
    }
}
