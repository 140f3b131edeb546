//! Document creation and update semantics
//!
//! Documents are created from a client JSON object plus a server-assigned
//! `_id`, and updated by merging top-level keys of a client JSON object onto
//! the stored document. Unknown keys are dropped on the way back into the
//! typed document; protected keys are never taken from the client.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::{Error, ObjectId, Result};

/// A stored, id-addressed document
pub trait Document: Serialize + DeserializeOwned {
    /// Keys a client may never overwrite
    const PROTECTED: &'static [&'static str] = &["_id"];

    fn id(&self) -> ObjectId;

    /// Check constraints serde cannot express (non-empty required text)
    fn validate(&self) -> Result<()> {
        Ok(())
    }
}

/// Build a new document from a client body, assigning a fresh id
///
/// Protected keys sent by the client are dropped, so creation timestamps
/// fall back to their defaults.
pub fn create<T: Document>(body: Value) -> Result<T> {
    let mut fields = into_object(body)?;
    fields.retain(|key, _| !T::PROTECTED.contains(&key.as_str()));
    fields.insert("_id".to_string(), Value::String(ObjectId::new().to_hex()));

    let doc: T = serde_json::from_value(Value::Object(fields))?;
    doc.validate()?;
    Ok(doc)
}

/// Merge top-level keys of `patch` onto `doc`
pub fn apply_update<T: Document>(doc: &T, patch: Value) -> Result<T> {
    let patch = into_object(patch)?;
    let mut fields = into_object(serde_json::to_value(doc)?)?;

    for (key, value) in patch {
        if T::PROTECTED.contains(&key.as_str()) {
            continue;
        }
        fields.insert(key, value);
    }

    let updated: T = serde_json::from_value(Value::Object(fields))?;
    updated.validate()?;
    Ok(updated)
}

/// Serialize a document without the given keys
pub fn redacted<T: Serialize>(doc: &T, hidden: &[&str]) -> Result<Value> {
    let mut fields = into_object(serde_json::to_value(doc)?)?;
    for key in hidden {
        fields.remove(*key);
    }
    Ok(Value::Object(fields))
}

/// Require a non-empty text value
pub fn require_text(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::Validation(format!("{} is required", field)));
    }
    Ok(())
}

fn into_object(value: Value) -> Result<Map<String, Value>> {
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(Error::NotAnObject),
    }
}
