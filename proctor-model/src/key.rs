use std::fmt;

use serde::{Deserialize, Serialize};

/// Hierarchical address of a message: `(type, namespace, name)`.
///
/// Keys play two roles. As the primary key of a stored message every
/// component is concrete. In match contexts (`GetAll`, `DeleteAll`, `Watch`,
/// and rule patterns) an empty component means "any value".
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Key {
    #[serde(default)]
    pub r#type: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub namespace: String,
}

impl Key {
    pub fn new(
        r#type: impl Into<String>,
        name: impl Into<String>,
        namespace: impl Into<String>,
    ) -> Self {
        Self {
            r#type: r#type.into(),
            name: name.into(),
            namespace: namespace.into(),
        }
    }

    /// True when every component is non-empty, i.e. the key addresses exactly
    /// one message.
    pub fn is_complete(&self) -> bool {
        !self.r#type.is_empty() && !self.name.is_empty() && !self.namespace.is_empty()
    }

    /// Componentwise empty-or-equal match of `self` (the pattern) against a
    /// concrete key.
    pub fn matches(&self, concrete: &Key) -> bool {
        if !self.r#type.is_empty() && self.r#type != concrete.r#type {
            return false;
        }
        if !self.name.is_empty() && self.name != concrete.name {
            return false;
        }
        if !self.namespace.is_empty() && self.namespace != concrete.namespace {
            return false;
        }
        true
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.r#type, self.namespace, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complete_key_requires_all_components() {
        assert!(Key::new("action", "move-1", "game1").is_complete());
        assert!(!Key::new("", "move-1", "game1").is_complete());
        assert!(!Key::new("action", "", "game1").is_complete());
        assert!(!Key::new("action", "move-1", "").is_complete());
    }

    #[test]
    fn empty_components_match_anything() {
        let concrete = Key::new("action", "move-1", "game1");

        assert!(Key::default().matches(&concrete));
        assert!(Key::new("action", "", "").matches(&concrete));
        assert!(Key::new("", "move-1", "game1").matches(&concrete));
        assert!(concrete.matches(&concrete));
    }

    #[test]
    fn non_empty_components_must_be_equal() {
        let concrete = Key::new("action", "move-1", "game1");

        assert!(!Key::new("world", "", "").matches(&concrete));
        assert!(!Key::new("action", "move-2", "").matches(&concrete));
        assert!(!Key::new("action", "move-1", "game2").matches(&concrete));
    }

    #[test]
    fn serde_uses_plain_component_names() {
        let key = Key::new("action", "move-1", "game1");
        let json = serde_json::to_value(&key).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "type": "action",
                "name": "move-1",
                "namespace": "game1",
            })
        );
    }

    #[test]
    fn missing_components_deserialize_as_wildcards() {
        let key: Key = serde_json::from_str(r#"{"type":"action"}"#).unwrap();
        assert_eq!(key, Key::new("action", "", ""));
    }
}
