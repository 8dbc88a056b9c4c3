//! # Service Configuration
//!
//! Settings loaded once at startup.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Environment variables (`ILACART_*`)
//! 2. Defaults (this file)
//!
//! ## Environment Variables
//! ```text
//! ILACART_INSTANCE     default cart instance            (main)
//! ILACART_STORE        memory | file                    (memory)
//! ILACART_SESSION_DIR  directory for session files      (<data dir>/sessions)
//! ILACART_SESSION_ID   resume this session (file store) (new session)
//! ILACART_MODELS       comma-separated model names      (none)
//! ```

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;
use tracing::warn;

use ilacart_core::DEFAULT_INSTANCE;

/// Which session backend to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    /// Process-local; carts vanish on exit
    #[default]
    Memory,

    /// One JSON file per session
    File,
}

impl FromStr for StoreKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(StoreKind::Memory),
            "file" => Ok(StoreKind::File),
            other => Err(format!("unknown store kind: {}", other)),
        }
    }
}

/// Service configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceConfig {
    /// Instance selected at startup
    pub instance: String,

    pub store: StoreKind,

    /// Where file-backed sessions live
    pub session_dir: PathBuf,

    /// Existing session to resume; a new one is created when unset
    pub session_id: Option<String>,

    /// Fully qualified model names accepted by `associate`
    pub models: Vec<String>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        ServiceConfig {
            instance: DEFAULT_INSTANCE.to_string(),
            store: StoreKind::default(),
            session_dir: default_session_dir(),
            session_id: None,
            models: Vec::new(),
        }
    }
}

impl ServiceConfig {
    /// Creates a configuration from environment variables and defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Creates a configuration from any variable source.
    ///
    /// Unparseable values are logged and the default is kept.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = ServiceConfig::default();

        if let Some(instance) = lookup("ILACART_INSTANCE").filter(|s| !s.trim().is_empty()) {
            config.instance = instance.trim().to_string();
        }

        if let Some(store) = lookup("ILACART_STORE") {
            match store.parse() {
                Ok(kind) => config.store = kind,
                Err(reason) => warn!(%reason, "Ignoring ILACART_STORE"),
            }
        }

        if let Some(dir) = lookup("ILACART_SESSION_DIR").filter(|s| !s.trim().is_empty()) {
            config.session_dir = PathBuf::from(dir);
        }

        if let Some(id) = lookup("ILACART_SESSION_ID").filter(|s| !s.trim().is_empty()) {
            config.session_id = Some(id.trim().to_string());
        }

        if let Some(models) = lookup("ILACART_MODELS") {
            config.models = models
                .split(',')
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .map(String::from)
                .collect();
        }

        config
    }
}

/// Platform data directory plus `sessions/`.
///
/// ## Platform-Specific Paths
/// - **macOS**: `~/Library/Application Support/com.ilacart.cart/sessions`
/// - **Windows**: `%APPDATA%\ilacart\cart\data\sessions`
/// - **Linux**: `~/.local/share/cart/sessions`
fn default_session_dir() -> PathBuf {
    ProjectDirs::from("com", "ilacart", "cart")
        .map(|dirs| dirs.data_dir().join("sessions"))
        .unwrap_or_else(|| PathBuf::from("sessions"))
}
