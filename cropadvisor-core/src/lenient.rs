//! Serde helpers for loosely typed client input
//!
//! Form-driven clients send numeric form values as either strings or numbers
//! for fields stored as text. These helpers coerce both into strings.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

fn coerce(value: Value) -> Result<Option<String>, String> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Number(n) => Ok(Some(n.to_string())),
        Value::Bool(b) => Ok(Some(b.to_string())),
        other => Err(format!("expected a string, found {}", other)),
    }
}

/// Deserialize an optional text field that may arrive as a number
pub fn opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    coerce(Value::deserialize(deserializer)?).map_err(serde::de::Error::custom)
}
