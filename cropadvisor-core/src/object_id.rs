//! Document identifiers
//!
//! A thin wrapper over the BSON object id that travels through JSON as its
//! 24-character lowercase hex form rather than as an extended-JSON `$oid`.

use std::fmt;
use std::str::FromStr;

use bson::oid;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{Error, Result};

/// A 12-byte document identifier
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId(oid::ObjectId);

impl ObjectId {
    /// Generate a fresh id for the current time
    pub fn new() -> Self {
        Self(oid::ObjectId::new())
    }

    /// Parse a 24-character hex string
    pub fn parse(s: &str) -> Result<Self> {
        oid::ObjectId::parse_str(s)
            .map(Self)
            .map_err(|_| Error::InvalidObjectId(s.to_string()))
    }

    /// Whether `s` is a well-formed id
    pub fn is_valid(s: &str) -> bool {
        Self::parse(s).is_ok()
    }

    pub fn to_hex(&self) -> String {
        self.0.to_hex()
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<oid::ObjectId> for ObjectId {
    fn from(id: oid::ObjectId) -> Self {
        Self(id)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({})", self.to_hex())
    }
}

impl FromStr for ObjectId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for ObjectId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ObjectId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let hex = String::deserialize(deserializer)?;
        Self::parse(&hex).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_roundtrip() {
        let id = ObjectId::new();
        let hex = id.to_hex();
        assert_eq!(hex.len(), 24);
        assert_eq!(ObjectId::parse(&hex).unwrap(), id);
    }

    #[test]
    fn test_uppercase_accepted() {
        let id = ObjectId::parse("65A1B2C3D4E5F60718293A4B").unwrap();
        assert_eq!(id.to_hex(), "65a1b2c3d4e5f60718293a4b");
    }

    #[test]
    fn test_rejects_malformed() {
        assert!(!ObjectId::is_valid(""));
        assert!(!ObjectId::is_valid("not-an-id"));
        assert!(!ObjectId::is_valid("65a1b2c3d4e5f60718293a4"));
        assert!(!ObjectId::is_valid("65a1b2c3d4e5f60718293a4bc"));
        assert!(!ObjectId::is_valid("zza1b2c3d4e5f60718293a4b"));
        assert!(!ObjectId::is_valid("65a1b2c3d4e5f60718293aé"));
    }

    #[test]
    fn test_serializes_as_plain_hex() {
        let id = ObjectId::parse("65a1b2c3d4e5f60718293a4b").unwrap();
        let json = serde_json::to_value(id).unwrap();
        assert_eq!(json, serde_json::json!("65a1b2c3d4e5f60718293a4b"));

        let back: ObjectId = serde_json::from_value(json).unwrap();
        assert_eq!(back, id);
        assert!(serde_json::from_value::<ObjectId>(serde_json::json!(42)).is_err());
    }

    #[test]
    fn test_fresh_ids_differ() {
        assert_ne!(ObjectId::new(), ObjectId::new());
    }
}
