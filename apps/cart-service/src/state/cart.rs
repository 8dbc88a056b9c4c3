//! # Cart State
//!
//! Owns the session's cart manager for the lifetime of the service.
//!
//! ## Thread Safety
//! The manager is wrapped in `Arc<Mutex<T>>`. Every command takes the lock
//! for the whole read-modify-write, so two commands never interleave on
//! the same session key.
//!
//! ## Command Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart State Operations                                │
//! │                                                                         │
//! │  Command                  Lock           CartManager call               │
//! │  ───────                  ────           ────────────────               │
//! │                                                                         │
//! │  add_to_cart ───────────► with_cart_mut ► add(payload)                  │
//! │  update_cart_row ───────► with_cart_mut ► update(row_id, update)        │
//! │  remove_from_cart ──────► with_cart_mut ► remove(row_id)                │
//! │  clear_cart ────────────► with_cart_mut ► destroy()                     │
//! │  switch_instance ───────► with_cart_mut ► instance(name)                │
//! │  get_cart / search ─────► with_cart ────► contents() / search()         │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use ilacart_core::{
    Cart, CartManager, CartResult, MemorySessionStore, Money, ModelRegistry, SessionStore,
};
use ilacart_store::{SessionFiles, SessionId};

use super::config::{ServiceConfig, StoreKind};
use crate::listener::TracingListener;

/// Session backend chosen at startup.
pub type SharedStore = Box<dyn SessionStore + Send>;

/// Totals shown next to the cart.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartTotals {
    pub row_count: usize,
    pub total_quantity: i64,
    pub total: Money,
    pub subtotal: Money,
    pub discount: Money,
    pub custom_discount: Money,
}

impl From<&Cart> for CartTotals {
    fn from(cart: &Cart) -> Self {
        CartTotals {
            row_count: cart.len(),
            total_quantity: cart.quantity(false),
            total: cart.total,
            subtotal: cart.subtotal,
            discount: cart.discount,
            custom_discount: cart.custom_discount,
        }
    }
}

/// Cart state managed by the service.
///
/// Uses `Arc<Mutex<CartManager>>` because:
/// - `Arc`: the state is shared by every command handler
/// - `Mutex`: a mutation must see and write a whole cart
pub struct CartState {
    cart: Arc<Mutex<CartManager<SharedStore>>>,
    session: Option<SessionId>,
}

impl CartState {
    pub fn new(manager: CartManager<SharedStore>) -> Self {
        CartState {
            cart: Arc::new(Mutex::new(manager)),
            session: None,
        }
    }

    /// A process-local cart on the default instance.
    pub fn in_memory() -> Self {
        let store: SharedStore = Box::new(MemorySessionStore::new());
        let mut manager = CartManager::new(store);
        manager.listen(TracingListener);
        CartState::new(manager)
    }

    /// Builds the state described by `config`.
    ///
    /// With the file store, `session_id` resumes an existing session and a
    /// new one is created when it is unset.
    pub fn from_config(config: &ServiceConfig) -> CartResult<Self> {
        let (store, session): (SharedStore, Option<SessionId>) = match config.store {
            StoreKind::Memory => (Box::new(MemorySessionStore::new()), None),
            StoreKind::File => {
                let files = SessionFiles::new(&config.session_dir);
                let (id, store) = match &config.session_id {
                    Some(raw) => (SessionId::parse(raw), files.open_raw(raw)?),
                    None => {
                        let (id, store) = files.create()?;
                        (Some(id), store)
                    }
                };
                debug!(path = %store.path().display(), "Using session file");
                (Box::new(store), id)
            }
        };

        let models: ModelRegistry = config.models.iter().collect();
        let mut manager = CartManager::new(store).with_models(models);
        manager.listen(TracingListener);
        manager.instance(&config.instance)?;

        info!(
            store = ?config.store,
            instance = %config.instance,
            session = session.as_ref().map(SessionId::as_str).unwrap_or("-"),
            "Cart state ready"
        );

        Ok(CartState {
            cart: Arc::new(Mutex::new(manager)),
            session,
        })
    }

    /// Session in use, when backed by files.
    pub fn session(&self) -> Option<&SessionId> {
        self.session.as_ref()
    }

    /// Executes a function with read access to the manager.
    pub fn with_cart<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&CartManager<SharedStore>) -> R,
    {
        let cart = self.cart.lock().unwrap_or_else(PoisonError::into_inner);
        f(&cart)
    }

    /// Executes a function with write access to the manager.
    pub fn with_cart_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut CartManager<SharedStore>) -> R,
    {
        let mut cart = self.cart.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut cart)
    }
}

impl Default for CartState {
    fn default() -> Self {
        Self::in_memory()
    }
}
