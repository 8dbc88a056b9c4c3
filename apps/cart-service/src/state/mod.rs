//! # State Module
//!
//! Service state built once at startup.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ServiceConfig::from_env()                                              │
//! │          │                                                              │
//! │          ▼                                                              │
//! │  CartState::from_config()                                               │
//! │          │                                                              │
//! │          ├── StoreKind::Memory ──► MemorySessionStore                  │
//! │          └── StoreKind::File ────► SessionFiles ──► FileSessionStore    │
//! │                                                                         │
//! │  CartState: Arc<Mutex<CartManager<Box<dyn SessionStore>>>>              │
//! │  ServiceConfig: read-only after startup                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod cart;
mod config;

pub use cart::{CartState, CartTotals, SharedStore};
pub use config::{ServiceConfig, StoreKind};
