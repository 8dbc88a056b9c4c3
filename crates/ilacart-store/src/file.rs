//! # File Session Store
//!
//! A session held in a single JSON object file.
//!
//! ## Write Path
//! ```text
//! put / forget ──► in-memory map, dirty = true
//!                        │
//! save ──────────────────┘
//!   │  (skipped when clean)
//!   ▼
//! <file>.tmp ──rename──► <file>
//! ```
//!
//! The rename means a crash mid-write leaves the previous file intact.

use serde_json::{Map, Value};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

use ilacart_core::{SessionStore, StoreResult};

/// JSON-file-backed session.
#[derive(Debug)]
pub struct FileSessionStore {
    path: PathBuf,
    entries: Map<String, Value>,
    dirty: bool,
}

impl FileSessionStore {
    /// Opens the session at `path`. A missing file is an empty session.
    pub fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(text) if text.trim().is_empty() => Map::new(),
            Ok(text) => serde_json::from_str(&text)?,
            Err(e) if e.kind() == ErrorKind::NotFound => Map::new(),
            Err(e) => return Err(e.into()),
        };

        debug!(path = %path.display(), keys = entries.len(), "Opened session file");
        Ok(FileSessionStore {
            path,
            entries,
            dirty: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Checks for changes not yet saved.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl SessionStore for FileSessionStore {
    fn has(&self, key: &str) -> StoreResult<bool> {
        Ok(self.entries.contains_key(key))
    }

    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.entries.get(key).map(Value::to_string))
    }

    /// Stores JSON text. Text that isn't JSON is rejected.
    fn put(&mut self, key: &str, value: String) -> StoreResult<()> {
        let value: Value = serde_json::from_str(&value)?;
        self.entries.insert(key.to_string(), value);
        self.dirty = true;
        Ok(())
    }

    fn forget(&mut self, key: &str) -> StoreResult<()> {
        if self.entries.remove(key).is_some() {
            self.dirty = true;
        }
        Ok(())
    }

    fn save(&mut self) -> StoreResult<()> {
        if !self.dirty {
            return Ok(());
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let temp = self.temp_path();
        let text = serde_json::to_string_pretty(&self.entries)?;
        fs::write(&temp, text)?;
        fs::rename(&temp, &self.path)?;

        self.dirty = false;
        debug!(path = %self.path.display(), keys = self.entries.len(), "Saved session file");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use ilacart_core::{CartManager, ItemInput, Money, StoreError};
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_empty_session() {
        let dir = TempDir::new().unwrap();
        let store = FileSessionStore::open(dir.path().join("none.json")).unwrap();

        assert!(store.is_empty());
        assert!(!store.is_dirty());
        assert!(!store.has("cart.main").unwrap());
    }

    #[test]
    fn test_put_is_buffered_until_save() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("s.json");
        let mut store = FileSessionStore::open(&path).unwrap();

        store.put("cart.main", r#"{"rows":[]}"#.to_string()).unwrap();
        assert!(store.is_dirty());
        assert!(!path.exists());

        store.save().unwrap();
        assert!(!store.is_dirty());
        assert!(path.exists());

        let reopened = FileSessionStore::open(&path).unwrap();
        assert_eq!(
            reopened.get("cart.main").unwrap().as_deref(),
            Some(r#"{"rows":[]}"#)
        );
    }

    #[test]
    fn test_save_creates_parent_dirs_and_leaves_no_temp_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("deeper").join("s.json");
        let mut store = FileSessionStore::open(&path).unwrap();

        store.put("cart.main", "{}".to_string()).unwrap();
        store.save().unwrap();

        assert!(path.exists());
        assert!(!store.temp_path().exists());
    }

    #[test]
    fn test_forget_marks_dirty_only_when_present() {
        let dir = TempDir::new().unwrap();
        let mut store = FileSessionStore::open(dir.path().join("s.json")).unwrap();

        store.forget("cart.main").unwrap();
        assert!(!store.is_dirty());

        store.put("cart.main", "{}".to_string()).unwrap();
        store.save().unwrap();
        store.forget("cart.main").unwrap();
        assert!(store.is_dirty());
    }

    #[test]
    fn test_put_rejects_non_json() {
        let dir = TempDir::new().unwrap();
        let mut store = FileSessionStore::open(dir.path().join("s.json")).unwrap();

        let err = store.put("cart.main", "not json".to_string()).unwrap_err();
        assert!(matches!(err, StoreError::Serialization(_)));
    }

    #[test]
    fn test_corrupt_file_fails_to_open() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("s.json");
        fs::write(&path, "{ broken").unwrap();

        assert!(matches!(
            FileSessionStore::open(&path),
            Err(StoreError::Serialization(_))
        ));
    }

    #[test]
    fn test_cart_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("s.json");

        let mut cart = CartManager::new(FileSessionStore::open(&path).unwrap());
        let row_id = cart
            .insert(ItemInput::new("A", "Mug").quantity(2).price("4.50"))
            .unwrap();
        drop(cart);

        let cart = CartManager::new(FileSessionStore::open(&path).unwrap());
        let row = cart.get(&row_id).unwrap().unwrap();
        assert_eq!(row.quantity, 2);
        assert_eq!(cart.total().unwrap(), Money::from_cents(900));
    }
}
