//! User records as exchanged with the remote collection.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Integer identity of a row in the collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserKey(pub i64);

impl UserKey {
    pub fn get(self) -> i64 {
        self.0
    }

    pub fn parse(s: &str) -> Option<Self> {
        s.trim().parse::<i64>().ok().map(Self)
    }
}

impl std::fmt::Display for UserKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A user as returned by the remote store.
///
/// Fields the client does not interpret are kept in `extra` so the record
/// round-trips unchanged through the journal.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct UserRecord {
    #[serde(
        default,
        deserialize_with = "lenient_key",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<UserKey>,
    #[serde(
        default,
        deserialize_with = "lenient_key",
        skip_serializing_if = "Option::is_none"
    )]
    pub idx: Option<UserKey>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub username: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserRecord {
    #[cfg(test)]
    pub fn new(id: i64, name: &str, username: &str) -> Self {
        Self {
            id: Some(UserKey(id)),
            name: name.to_string(),
            username: username.to_string(),
            ..Self::default()
        }
    }

    /// First name: everything before the first space
    pub fn first_name(&self) -> &str {
        split_name(&self.name).0
    }

    /// Last name: everything after the first space
    pub fn last_name(&self) -> &str {
        split_name(&self.name).1
    }
}

/// Body sent on create and update
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserPayload {
    pub idx: UserKey,
    pub name: String,
    pub username: String,
}

/// Split a display name on its first space
pub fn split_name(name: &str) -> (&str, &str) {
    name.split_once(' ').unwrap_or((name, ""))
}

/// Accepts integers, integral floats and numeric strings. Anything else,
/// including null and booleans, decodes as absent.
fn lenient_key<'de, D>(deserializer: D) -> Result<Option<UserKey>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(key_from_value))
}

fn key_from_value(value: &Value) -> Option<UserKey> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
    .map(UserKey)
}
