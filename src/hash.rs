//! Content hashing for records that carry no natural identifier.
//!
//! Hashes are taken over canonical JSON (object keys sorted recursively) so
//! attribute sets that differ only in key order hash equal.

use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

pub trait ContentHasher: Send + Sync {
    fn hash(&self, value: &Value) -> String;
}

/// Hex-encoded SHA-256 over canonical JSON bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Hasher;

impl ContentHasher for Sha256Hasher {
    fn hash(&self, value: &Value) -> String {
        let canonical = canonicalize(value);
        // Serializing a Value cannot fail: keys are strings and there are no
        // non-finite floats in serde_json::Value.
        let bytes = serde_json::to_vec(&canonical).unwrap_or_default();
        hex::encode(Sha256::digest(&bytes))
    }
}

/// Sorts object keys recursively. Arrays keep their order.
pub fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let mut sorted = Map::new();
            for key in keys {
                sorted.insert(key.clone(), canonicalize(&map[key]));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}
