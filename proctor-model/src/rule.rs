use serde::{Deserialize, Serialize};

use crate::key::Key;
use crate::method::Method;
use crate::user::Character;

/// One row of the static authorization table: `(character, role, method)`
/// may act on keys matching the pattern. Rules are disjunctive; there are no
/// negative rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub character: Character,
    /// Only meaningful for actor rules; empty otherwise.
    #[serde(default)]
    pub role: String,
    pub method: Method,
    pub key: Key,
}
