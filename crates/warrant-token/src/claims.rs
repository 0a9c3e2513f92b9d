//! Token claims.
//!
//! [`Claims`] is the untyped, ordered claim set carried in a token payload.
//! The typed structs cover the shapes the server issues and can be converted
//! to and from a [`Claims`] value.

use crate::error::TokenError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Reserved payload field holding the expiry as Unix seconds.
pub const EXPIRE_AT_CLAIM: &str = "expireAt";

/// An ordered mapping of claim names to JSON values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Claims(Map<String, Value>);

impl Claims {
    /// Create an empty claim set.
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Build claims from any value that serializes to a JSON object.
    pub fn from_serializable<T: Serialize>(value: &T) -> Result<Self, TokenError> {
        match serde_json::to_value(value)? {
            Value::Object(map) => Ok(Self(map)),
            other => Err(TokenError::InvalidClaims(format!(
                "expected a JSON object, got {}",
                json_kind(&other)
            ))),
        }
    }

    /// Parse claims from a JSON object string.
    pub fn from_json(json: &str) -> Result<Self, TokenError> {
        let value: Value =
            serde_json::from_str(json).map_err(|e| TokenError::InvalidClaims(e.to_string()))?;
        Self::from_serializable(&value)
    }

    /// Deserialize the claim set into a typed struct.
    pub fn to_typed<T: DeserializeOwned>(&self) -> Result<T, TokenError> {
        serde_json::from_value(Value::Object(self.0.clone()))
            .map_err(|e| TokenError::InvalidClaims(e.to_string()))
    }

    /// Add a claim, replacing any existing value under the same name.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Insert a claim, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    /// Get a claim by name.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Get a string claim by name.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// The `username` claim, if present and a string.
    pub fn username(&self) -> Option<&str> {
        self.get_str("username")
    }

    /// The `permissions` claim, if present and an array of strings.
    pub fn permissions(&self) -> Option<Vec<String>> {
        let items = self.0.get("permissions")?.as_array()?;
        items
            .iter()
            .map(|v| v.as_str().map(str::to_string))
            .collect()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Borrow the underlying map.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Consume the claim set, returning the underlying map.
    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for Claims {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Claims issued to a user at registration or login.
///
/// Unknown fields are rejected so a session token, which also names a
/// `username`, never reads as a user token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserClaims {
    pub username: String,
}

/// Claims issued to an agent at login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentClaims {
    pub agent_name: String,
}

/// Claims issued to an agent acting for a user under a grant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Permissions granted by the user to the agent.
    pub permissions: Vec<String>,
    /// The granting user.
    pub username: String,
}

impl SessionClaims {
    /// Create session claims.
    pub fn new(username: impl Into<String>, permissions: Vec<String>) -> Self {
        Self {
            permissions,
            username: username.into(),
        }
    }

    /// Check if a permission was granted.
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.iter().any(|p| p == permission)
    }
}
