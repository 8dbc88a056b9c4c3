//! # ilacart-store: Session Storage for iLaCart
//!
//! Durable implementations of [`ilacart_core::SessionStore`].
//!
//! ## Layout On Disk
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  <session dir>/                                                         │
//! │  ├── sess_3f2a...c9.json      { "cart.main": {...}, "cart.wishlist": … }│
//! │  ├── sess_81bd...04.json                                                │
//! │  └── ...                                                                │
//! │                                                                         │
//! │  One file per shopper session, one key per cart instance.              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`file`] - `FileSessionStore`, a JSON file with buffered writes
//! - [`session`] - `SessionId` and the `SessionFiles` directory layout
//!
//! ## Usage
//!
//! ```rust,no_run
//! use ilacart_core::{CartManager, ItemInput};
//! use ilacart_store::SessionFiles;
//!
//! let files = SessionFiles::new("/var/lib/ilacart/sessions");
//! let (session_id, store) = files.create()?;
//!
//! let mut cart = CartManager::new(store);
//! cart.insert(ItemInput::new("A", "Mug").quantity(1).price(5))?;
//! println!("cart saved for {}", session_id);
//! # Ok::<(), ilacart_core::CartError>(())
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod file;
pub mod session;

// =============================================================================
// Re-exports
// =============================================================================

pub use file::FileSessionStore;
pub use session::{SessionFiles, SessionId};
