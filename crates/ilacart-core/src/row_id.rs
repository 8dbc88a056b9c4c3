//! # Row Identity
//!
//! A row id is a pure function of the product id and the option set:
//!
//! ```text
//! product_id ──┐
//!              ├──► "A" + {"color":"red","size":"M"} ──► SHA-256 ──► first 16 bytes, hex
//! options ─────┘         (keys ascending)
//! ```
//!
//! Inserting the same product with the same options, in any key order,
//! lands on the same row and merges quantities.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use std::fmt;
use ts_rs::TS;

use crate::options::{CartOptions, OptionValue};

/// Number of digest bytes kept for a row id (128 bits).
const ROW_ID_BYTES: usize = 16;

/// Content-derived identifier of a cart row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RowId(String);

impl RowId {
    /// Wraps an existing row id (e.g. one echoed back by the storefront).
    pub fn new(id: impl Into<String>) -> Self {
        RowId(id.into())
    }

    /// Derives the row id for a product and option set.
    pub fn generate(product_id: &str, options: &CartOptions) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(product_id.as_bytes());
        hasher.update(canonical_options(options).as_bytes());
        let digest = hasher.finalize();
        RowId(hex::encode(&digest[..ROW_ID_BYTES]))
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RowId {
    fn from(s: &str) -> Self {
        RowId(s.to_string())
    }
}

impl From<String> for RowId {
    fn from(s: String) -> Self {
        RowId(s)
    }
}

impl AsRef<str> for RowId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Canonical JSON text of an option set, keys ascending.
fn canonical_options(options: &CartOptions) -> String {
    let map: Map<String, Value> = options
        .iter()
        .map(|(k, v)| (k.to_string(), option_to_json(v)))
        .collect();
    Value::Object(map).to_string()
}

fn option_to_json(value: &OptionValue) -> Value {
    match value {
        OptionValue::Bool(b) => Value::Bool(*b),
        OptionValue::Int(i) => Value::from(*i),
        OptionValue::Float(x) => Value::from(*x),
        OptionValue::Text(s) => Value::String(s.clone()),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
