//! # Row Options
//!
//! Typed option bags attached to cart rows ("size" = "M", "color" = "red").
//!
//! The storefront sends options as an unordered JSON object. Internally they
//! are kept in a `BTreeMap`, so iteration and serialization are always in
//! ascending key order. That ordering is what makes row identity independent
//! of the order the caller happened to list the keys in.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use ts_rs::TS;

// =============================================================================
// Option Value
// =============================================================================

/// A scalar option value.
///
/// ## JSON Mapping
/// ```text
/// true      → Bool(true)
/// 2         → Int(2)
/// 2.5       → Float(2.5)
/// "red"     → Text("red")
/// ```
///
/// Equality is strict: `Text("1")` never equals `Int(1)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(untagged)]
#[ts(export)]
pub enum OptionValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl OptionValue {
    /// Returns the text value, if this is a text option.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            OptionValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Bool(b) => write!(f, "{}", b),
            OptionValue::Int(i) => write!(f, "{}", i),
            OptionValue::Float(x) => write!(f, "{}", x),
            OptionValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for OptionValue {
    fn from(s: &str) -> Self {
        OptionValue::Text(s.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(s: String) -> Self {
        OptionValue::Text(s)
    }
}

impl From<i64> for OptionValue {
    fn from(i: i64) -> Self {
        OptionValue::Int(i)
    }
}

impl From<i32> for OptionValue {
    fn from(i: i32) -> Self {
        OptionValue::Int(i64::from(i))
    }
}

impl From<f64> for OptionValue {
    fn from(x: f64) -> Self {
        OptionValue::Float(x)
    }
}

impl From<bool> for OptionValue {
    fn from(b: bool) -> Self {
        OptionValue::Bool(b)
    }
}

// =============================================================================
// Cart Options
// =============================================================================

/// Ordered string → scalar map of row options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartOptions(BTreeMap<String, OptionValue>);

impl CartOptions {
    /// Creates an empty option set.
    pub fn new() -> Self {
        CartOptions(BTreeMap::new())
    }

    /// Returns the value for `key`, if set.
    pub fn get(&self, key: &str) -> Option<&OptionValue> {
        self.0.get(key)
    }

    /// Checks whether `key` is set.
    pub fn has(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Sets `key`, returning the previous value.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<OptionValue>,
    ) -> Option<OptionValue> {
        self.0.insert(key.into(), value.into())
    }

    /// Builder form of [`CartOptions::insert`].
    pub fn with(mut self, key: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Merges `other` into `self`. Keys from `other` win; keys only present
    /// in `self` are kept.
    pub fn merge(&mut self, other: CartOptions) {
        self.0.extend(other.0);
    }

    /// Number of options.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Checks if no options are set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates options in ascending key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Checks that every criterion is present with a strictly equal value.
    ///
    /// An empty criteria set never matches.
    pub fn matches(&self, criteria: &CartOptions) -> bool {
        !criteria.is_empty() && criteria.iter().all(|(k, v)| self.get(k) == Some(v))
    }
}

impl<K, V> FromIterator<(K, V)> for CartOptions
where
    K: Into<String>,
    V: Into<OptionValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        CartOptions(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl IntoIterator for CartOptions {
    type Item = (String, OptionValue);
    type IntoIter = std::collections::btree_map::IntoIter<String, OptionValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_values_map_to_variants() {
        let options: CartOptions =
            serde_json::from_value(json!({"gift": true, "qty": 2, "weight": 1.5, "color": "red"}))
                .unwrap();

        assert_eq!(options.get("gift"), Some(&OptionValue::Bool(true)));
        assert_eq!(options.get("qty"), Some(&OptionValue::Int(2)));
        assert_eq!(options.get("weight"), Some(&OptionValue::Float(1.5)));
        assert_eq!(options.get("color"), Some(&OptionValue::Text("red".into())));
    }

    #[test]
    fn test_serialization_is_key_ordered() {
        let a: CartOptions = [("size", "M"), ("color", "red")].into_iter().collect();
        let b: CartOptions = [("color", "red"), ("size", "M")].into_iter().collect();

        let json_a = serde_json::to_string(&a).unwrap();
        assert_eq!(json_a, r#"{"color":"red","size":"M"}"#);
        assert_eq!(json_a, serde_json::to_string(&b).unwrap());
    }

    #[test]
    fn test_merge_overrides_and_keeps() {
        let mut options = CartOptions::new().with("size", "M").with("color", "red");
        options.merge(CartOptions::new().with("size", "L").with("engraving", "A.B."));

        assert_eq!(options.len(), 3);
        assert_eq!(options.get("size").and_then(OptionValue::as_str), Some("L"));
        assert_eq!(options.get("color").and_then(OptionValue::as_str), Some("red"));
        assert!(options.has("engraving"));
    }

    #[test]
    fn test_matches_is_strict_and() {
        let options = CartOptions::new().with("color", "red").with("size", "M");

        assert!(options.matches(&CartOptions::new().with("color", "red")));
        assert!(options.matches(&CartOptions::new().with("color", "red").with("size", "M")));
        assert!(!options.matches(&CartOptions::new().with("color", "red").with("size", "L")));
        assert!(!options.matches(&CartOptions::new().with("colour", "red")));
        assert!(!options.matches(&CartOptions::new()));

        let numbered = CartOptions::new().with("pack", 6);
        assert!(!numbered.matches(&CartOptions::new().with("pack", "6")));
    }
}
