//! # Session Store
//!
//! The storage seam. The manager reads and writes one JSON document per
//! cart instance under the key `cart.<instance>`.
//!
//! ```text
//! ┌──────────────┐   has/get/put/forget/save   ┌─────────────────────────┐
//! │ CartManager  │ ──────────────────────────► │ impl SessionStore       │
//! └──────────────┘        (JSON text)          │  • MemorySessionStore   │
//!                                              │  • FileSessionStore     │
//!                                              │    (ilacart-store)      │
//!                                              └─────────────────────────┘
//! ```
//!
//! `put` and `forget` may buffer; `save` makes buffered changes durable.

use std::collections::HashMap;

use crate::error::StoreResult;

/// Key/value session backend.
pub trait SessionStore {
    fn has(&self, key: &str) -> StoreResult<bool>;

    /// Stored JSON text, if any.
    fn get(&self, key: &str) -> StoreResult<Option<String>>;

    fn put(&mut self, key: &str, value: String) -> StoreResult<()>;

    fn forget(&mut self, key: &str) -> StoreResult<()>;

    /// Flushes pending writes.
    fn save(&mut self) -> StoreResult<()>;
}

impl<S: SessionStore + ?Sized> SessionStore for Box<S> {
    fn has(&self, key: &str) -> StoreResult<bool> {
        (**self).has(key)
    }

    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        (**self).get(key)
    }

    fn put(&mut self, key: &str, value: String) -> StoreResult<()> {
        (**self).put(key, value)
    }

    fn forget(&mut self, key: &str) -> StoreResult<()> {
        (**self).forget(key)
    }

    fn save(&mut self) -> StoreResult<()> {
        (**self).save()
    }
}

// =============================================================================
// Memory Store
// =============================================================================

/// Process-local store. Nothing outlives the value.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    entries: HashMap<String, String>,
    saves: usize,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// How many times `save` was called.
    pub fn save_count(&self) -> usize {
        self.saves
    }

    /// Stored keys, sorted.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl SessionStore for MemorySessionStore {
    fn has(&self, key: &str) -> StoreResult<bool> {
        Ok(self.entries.contains_key(key))
    }

    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn put(&mut self, key: &str, value: String) -> StoreResult<()> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn forget(&mut self, key: &str) -> StoreResult<()> {
        self.entries.remove(key);
        Ok(())
    }

    fn save(&mut self) -> StoreResult<()> {
        self.saves += 1;
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_round() {
        let mut store = MemorySessionStore::new();
        assert!(!store.has("cart.main").unwrap());
        assert_eq!(store.get("cart.main").unwrap(), None);

        store.put("cart.main", "{}".to_string()).unwrap();
        assert!(store.has("cart.main").unwrap());
        assert_eq!(store.get("cart.main").unwrap().as_deref(), Some("{}"));

        store.forget("cart.main").unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_save_is_counted() {
        let mut store = MemorySessionStore::new();
        store.save().unwrap();
        store.save().unwrap();
        assert_eq!(store.save_count(), 2);
    }

    #[test]
    fn test_boxed_store_delegates() {
        let mut store: Box<dyn SessionStore + Send> = Box::new(MemorySessionStore::new());
        store.put("cart.b", "1".to_string()).unwrap();
        store.put("cart.a", "2".to_string()).unwrap();
        assert!(store.has("cart.a").unwrap());
        store.forget("cart.a").unwrap();
        assert!(!store.has("cart.a").unwrap());
    }

    #[test]
    fn test_keys_sorted() {
        let mut store = MemorySessionStore::new();
        store.put("cart.wishlist", "{}".to_string()).unwrap();
        store.put("cart.main", "{}".to_string()).unwrap();
        assert_eq!(store.keys(), vec!["cart.main", "cart.wishlist"]);
    }
}
