//! # Session Files
//!
//! Maps shopper sessions to files in one directory.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::{debug, info};
use uuid::Uuid;

use ilacart_core::{StoreError, StoreResult};

use crate::file::FileSessionStore;

const SESSION_PREFIX: &str = "sess";
const SESSION_EXTENSION: &str = "json";

// =============================================================================
// Session Id
// =============================================================================

/// Session identifier (`sess_<uuid>`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    /// Generates a fresh random id.
    pub fn generate() -> Self {
        SessionId(format!("{}_{}", SESSION_PREFIX, Uuid::new_v4().simple()))
    }

    /// Accepts an id received from a client.
    ///
    /// Only ASCII letters, digits, `_` and `-` are allowed, so an id can
    /// never name a path outside the session directory.
    pub fn parse(id: &str) -> Option<Self> {
        let valid = !id.is_empty()
            && id.len() <= 128
            && id
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-');
        valid.then(|| SessionId(id.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// Session Files
// =============================================================================

/// A directory of session files, one per [`SessionId`].
#[derive(Debug, Clone)]
pub struct SessionFiles {
    dir: PathBuf,
}

impl SessionFiles {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        SessionFiles { dir: dir.into() }
    }

    /// `<dir>/<id>.json`
    pub fn path_for(&self, id: &SessionId) -> PathBuf {
        self.dir
            .join(format!("{}.{}", id.as_str(), SESSION_EXTENSION))
    }

    /// Opens an existing or new session.
    pub fn open(&self, id: &SessionId) -> StoreResult<FileSessionStore> {
        FileSessionStore::open(self.path_for(id))
    }

    /// Opens a session by raw id, rejecting ids that aren't well formed.
    pub fn open_raw(&self, id: &str) -> StoreResult<FileSessionStore> {
        let id = SessionId::parse(id)
            .ok_or_else(|| StoreError::Backend(format!("invalid session id: {}", id)))?;
        self.open(&id)
    }

    /// Starts a new session with a fresh id.
    pub fn create(&self) -> StoreResult<(SessionId, FileSessionStore)> {
        let id = SessionId::generate();
        let store = self.open(&id)?;
        info!(session = %id, "Created cart session");
        Ok((id, store))
    }

    /// Deletes a session file. Returns `false` if there was none.
    pub fn delete(&self, id: &SessionId) -> StoreResult<bool> {
        match fs::remove_file(self.path_for(id)) {
            Ok(()) => {
                debug!(session = %id, "Deleted session file");
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
