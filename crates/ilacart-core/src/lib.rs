//! # ilacart-core: Session-Backed Shopping Cart
//!
//! This crate is the cart itself: row identity, totals, validation, events
//! and the [`CartManager`] that ties them to a session store.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        iLaCart Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Storefront (web)                             │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ JSON                                   │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    cart-service (commands)                      │   │
//! │  │    add_to_cart, update_cart_row, search_cart, clear_cart, ...   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ ilacart-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │  row_id   │  │   cart    │  │  manager  │  │ validation│  │   │
//! │  │   │  RowId    │  │   Cart    │  │ insert/   │  │  ItemInput│  │   │
//! │  │   │  SHA-256  │  │  CartRow  │  │ update/.. │  │  → NewRow │  │   │
//! │  │   └───────────┘  └───────────┘  └─────┬─────┘  └───────────┘  │   │
//! │  │                                       │ SessionStore trait      │   │
//! │  └───────────────────────────────────────┼─────────────────────────┘   │
//! │                                          │                              │
//! │  ┌───────────────────────────────────────▼─────────────────────────┐   │
//! │  │          MemorySessionStore  |  ilacart-store (files)           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Integer-cent money and decimal parsing
//! - [`options`] - Typed, ordered row options
//! - [`row_id`] - Content-derived row identity
//! - [`item`] - Insert payloads as the caller sends them
//! - [`row`] - Cart rows and update patches
//! - [`cart`] - The per-instance row collection and its aggregates
//! - [`validation`] - Boundary checks
//! - [`events`] - Lifecycle events and listeners
//! - [`store`] - The session storage seam
//! - [`association`] - Model registry for `associate`
//! - [`manager`] - The public operations
//!
//! ## Design Principles
//!
//! 1. **Explicit State**: the session store is passed in, never ambient
//! 2. **Integer Money**: all amounts are cents (i64)
//! 3. **Validate First**: nothing is written until input is known good
//! 4. **Not Found Is Not An Error**: queries return `Option`
//!
//! ## Example Usage
//!
//! ```rust
//! use ilacart_core::{CartManager, ItemInput, MemorySessionStore};
//!
//! let mut cart = CartManager::new(MemorySessionStore::new());
//! let row_id = cart.insert(ItemInput::new("A", "Mug").quantity(2).price("4.50")).unwrap();
//!
//! cart.update(&row_id, 0).unwrap();
//! assert!(cart.contents().unwrap().is_none());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod association;
pub mod cart;
pub mod error;
pub mod events;
pub mod item;
pub mod manager;
pub mod money;
pub mod options;
pub mod row;
pub mod row_id;
pub mod store;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use association::ModelRegistry;
pub use cart::Cart;
pub use error::{CartError, CartResult, StoreError, StoreResult};
pub use events::{CartEvent, CartListener, EventDispatcher, EventRecorder};
pub use item::{InsertPayload, ItemInput, NewRow};
pub use manager::CartManager;
pub use money::Money;
pub use options::{CartOptions, OptionValue};
pub use row::{CartRow, CartUpdate, RowPatch};
pub use row_id::RowId;
pub use store::{MemorySessionStore, SessionStore};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Instance a new manager starts on.
pub const DEFAULT_INSTANCE: &str = "main";

/// Session keys are `<prefix>.<instance>`.
pub const SESSION_KEY_PREFIX: &str = "cart";
