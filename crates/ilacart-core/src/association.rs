//! # Model Association
//!
//! Rows can be tagged with the catalog model they came from. Model names are
//! resolved against a registry of known names instead of probing for types
//! at runtime.

use std::collections::BTreeSet;

use crate::error::{CartError, CartResult};

/// Separator between a namespace and a model name.
pub const NAMESPACE_SEPARATOR: char = '\\';

/// Set of model names `associate` may resolve to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelRegistry {
    models: BTreeSet<String>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a fully qualified model name.
    pub fn register(&mut self, qualified: impl AsRef<str>) {
        let name = normalize(qualified.as_ref());
        if !name.is_empty() {
            self.models.insert(name);
        }
    }

    /// Builder form of [`ModelRegistry::register`].
    pub fn with(mut self, qualified: impl AsRef<str>) -> Self {
        self.register(qualified);
        self
    }

    pub fn contains(&self, qualified: &str) -> bool {
        self.models.contains(&normalize(qualified))
    }

    /// Resolves a model, optionally inside a namespace.
    ///
    /// ## Example
    /// ```rust
    /// use ilacart_core::ModelRegistry;
    ///
    /// let models = ModelRegistry::new().with("App\\Models\\Product");
    /// assert_eq!(
    ///     models.resolve("Product", Some("App\\Models")).unwrap(),
    ///     "App\\Models\\Product"
    /// );
    /// assert!(models.resolve("Order", Some("App\\Models")).is_err());
    /// ```
    pub fn resolve(&self, model: &str, namespace: Option<&str>) -> CartResult<String> {
        let model = normalize(model);
        let qualified = match namespace.map(normalize) {
            Some(ns) if !ns.is_empty() => format!("{}{}{}", ns, NAMESPACE_SEPARATOR, model),
            _ => model,
        };

        if self.models.contains(&qualified) {
            Ok(qualified)
        } else {
            Err(CartError::UnknownAssociatedModel { model: qualified })
        }
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.models.iter().map(String::as_str)
    }
}

impl<S: AsRef<str>> FromIterator<S> for ModelRegistry {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut registry = ModelRegistry::new();
        for model in iter {
            registry.register(model);
        }
        registry
    }
}

fn normalize(name: &str) -> String {
    name.trim().trim_matches(NAMESPACE_SEPARATOR).to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================
