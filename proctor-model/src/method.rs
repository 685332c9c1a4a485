use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Every RPC method the broker dispatches on. Rule documents refer to these
/// by their kebab-case names (`get-all`, `im-ready`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Method {
    Get,
    GetAll,
    Put,
    Delete,
    DeleteAll,
    Watch,
    SetUserStatus,
    GetActors,
    PutResult,
    ImReady,
    Ping,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "get",
            Method::GetAll => "get-all",
            Method::Put => "put",
            Method::Delete => "delete",
            Method::DeleteAll => "delete-all",
            Method::Watch => "watch",
            Method::SetUserStatus => "set-user-status",
            Method::GetActors => "get-actors",
            Method::PutResult => "put-result",
            Method::ImReady => "im-ready",
            Method::Ping => "ping",
        }
    }

    /// Whether the method carries a key argument subject to validation.
    pub fn takes_key(&self) -> bool {
        matches!(
            self,
            Method::Get
                | Method::GetAll
                | Method::Put
                | Method::Delete
                | Method::DeleteAll
                | Method::Watch
        )
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown method: {0}")]
pub struct ParseMethodError(pub String);

impl FromStr for Method {
    type Err = ParseMethodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "get" => Ok(Method::Get),
            "get-all" => Ok(Method::GetAll),
            "put" => Ok(Method::Put),
            "delete" => Ok(Method::Delete),
            "delete-all" => Ok(Method::DeleteAll),
            "watch" => Ok(Method::Watch),
            "set-user-status" => Ok(Method::SetUserStatus),
            "get-actors" => Ok(Method::GetActors),
            "put-result" => Ok(Method::PutResult),
            "im-ready" => Ok(Method::ImReady),
            "ping" => Ok(Method::Ping),
            other => Err(ParseMethodError(other.to_string())),
        }
    }
}

impl TryFrom<String> for Method {
    type Error = ParseMethodError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Method> for String {
    fn from(method: Method) -> Self {
        method.as_str().to_string()
    }
}
