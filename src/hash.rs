//! Structural fingerprints for cache keys and change detection.
//!
//! A fingerprint is the SHA1 of a canonical encoding of a JSON value. Object
//! keys are visited in sorted order, so two structurally equal values hash the
//! same regardless of how their maps were built. Every node is length-prefixed
//! and type-tagged, so `["ab"]` and `["a", "b"]` cannot collide by
//! concatenation.
//!
//! Inputs are content trees and prop bags, which are acyclic by construction.

use std::fmt;

use serde::Serialize;
use serde_json::Value;
use sha1_smol::Sha1;

use crate::error::Result;

/// A deterministic structural hash, rendered as lowercase hex.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Fingerprint a JSON value.
    pub fn of_value(value: &Value) -> Self {
        let mut hasher = Sha1::new();
        feed(&mut hasher, value);
        Fingerprint(hasher.digest().to_string())
    }

    /// Fingerprint anything serializable by first converting it to JSON.
    pub fn of<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        let value = serde_json::to_value(value)?;
        Ok(Self::of_value(&value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn feed_len(hasher: &mut Sha1, len: usize) {
    hasher.update(&(len as u64).to_le_bytes());
}

fn feed_str(hasher: &mut Sha1, s: &str) {
    feed_len(hasher, s.len());
    hasher.update(s.as_bytes());
}

fn feed(hasher: &mut Sha1, value: &Value) {
    match value {
        Value::Null => hasher.update(b"z"),
        Value::Bool(true) => hasher.update(b"t"),
        Value::Bool(false) => hasher.update(b"f"),
        Value::Number(n) => {
            hasher.update(b"n");
            feed_str(hasher, &n.to_string());
        }
        Value::String(s) => {
            hasher.update(b"s");
            feed_str(hasher, s);
        }
        Value::Array(items) => {
            hasher.update(b"a");
            feed_len(hasher, items.len());
            for item in items {
                feed(hasher, item);
            }
        }
        Value::Object(map) => {
            hasher.update(b"o");
            feed_len(hasher, map.len());
            // serde_json may preserve insertion order; sort to stay order-independent.
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_unstable_by(|a, b| a.0.cmp(b.0));
            for (key, item) in entries {
                feed_str(hasher, key);
                feed(hasher, item);
            }
        }
    }
}
