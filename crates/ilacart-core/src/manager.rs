//! # Cart Manager
//!
//! The single entry point for cart operations.
//!
//! ## Operation Cycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   caller ──► validate ──► load cart.<instance>                          │
//! │                                                │                        │
//! │                                                ▼                        │
//! │                   mutate rows + recompute aggregates (checked)          │
//! │                                                │                        │
//! │                                                ▼                        │
//! │   emit "after" ◄── save ◄── put / forget ◄── emit "before"              │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every call is a full read-modify-write against the [`SessionStore`]. The
//! manager holds no cart data itself, only routing state: the current
//! instance name and the associated model.
//!
//! The new cart is computed on a loaded copy before any event fires, so an
//! amount overflow fails the call with nothing emitted and nothing written.
//!
//! ## Example
//! ```rust
//! use ilacart_core::{CartManager, CartOptions, ItemInput, MemorySessionStore, Money};
//!
//! let mut cart = CartManager::new(MemorySessionStore::new());
//! let row_id = cart
//!     .insert(ItemInput::new("A", "T-Shirt").quantity(2).price("10.00").option("size", "M"))
//!     .unwrap();
//!
//! assert_eq!(cart.total().unwrap(), Money::from_cents(2000));
//! assert_eq!(
//!     cart.search(&CartOptions::new().with("size", "M")).unwrap(),
//!     Some(vec![row_id])
//! );
//! ```

use std::fmt;
use tracing::{debug, info};

use crate::association::ModelRegistry;
use crate::cart::Cart;
use crate::error::{CartError, CartResult};
use crate::events::{CartEvent, CartListener, EventDispatcher};
use crate::item::{InsertPayload, ItemInput, NewRow};
use crate::money::Money;
use crate::options::CartOptions;
use crate::row::{CartRow, CartUpdate};
use crate::row_id::RowId;
use crate::store::SessionStore;
use crate::validation::{validate_instance, validate_patch};
use crate::{DEFAULT_INSTANCE, SESSION_KEY_PREFIX};

/// Cart operations over a session store.
pub struct CartManager<S> {
    store: S,
    events: EventDispatcher,
    models: ModelRegistry,
    instance: String,
    associated_model: Option<String>,
}

impl<S: SessionStore> CartManager<S> {
    /// Creates a manager on the default instance.
    pub fn new(store: S) -> Self {
        CartManager {
            store,
            events: EventDispatcher::new(),
            models: ModelRegistry::new(),
            instance: DEFAULT_INSTANCE.to_string(),
            associated_model: None,
        }
    }

    /// Sets the models `associate` may resolve.
    pub fn with_models(mut self, models: ModelRegistry) -> Self {
        self.models = models;
        self
    }

    /// Registers an event listener.
    pub fn listen(&mut self, listener: impl CartListener + 'static) -> &mut Self {
        self.events.listen(listener);
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn models(&self) -> &ModelRegistry {
        &self.models
    }

    // =========================================================================
    // Routing State
    // =========================================================================

    /// Selects the cart instance used by subsequent operations.
    pub fn instance(&mut self, name: &str) -> CartResult<&mut Self> {
        self.instance = validate_instance(name)?;
        debug!(instance = %self.instance, "Switched cart instance");
        Ok(self)
    }

    pub fn current_instance(&self) -> &str {
        &self.instance
    }

    /// Session key of the current instance (`cart.<instance>`).
    pub fn session_key(&self) -> String {
        format!("{}.{}", SESSION_KEY_PREFIX, self.instance)
    }

    /// Associates rows created from now on with a registered model.
    pub fn associate(&mut self, model: &str, namespace: Option<&str>) -> CartResult<&mut Self> {
        let qualified = self.models.resolve(model, namespace)?;
        debug!(model = %qualified, "Associated cart model");
        self.associated_model = Some(qualified);
        Ok(self)
    }

    pub fn associated_model(&self) -> Option<&str> {
        self.associated_model.as_deref()
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Inserts one item, merging into an existing row with the same identity.
    pub fn insert(&mut self, item: ItemInput) -> CartResult<RowId> {
        let row = item.validate()?;
        self.insert_row(row)
    }

    /// Inserts several items.
    ///
    /// All items are validated and applied to a scratch copy of the cart
    /// first; if any fails nothing is written and no event fires.
    pub fn insert_batch(&mut self, items: Vec<ItemInput>) -> CartResult<Vec<RowId>> {
        let rows = items
            .iter()
            .map(ItemInput::validate)
            .collect::<CartResult<Vec<NewRow>>>()?;

        let mut preview = self.load()?;
        for row in &rows {
            preview.add(row.clone(), self.associated_model.clone())?;
        }
        preview.recalculate()?;

        self.emit(CartEvent::Batching {
            instance: self.instance.clone(),
            items: rows.clone(),
        });

        let mut row_ids = Vec::with_capacity(rows.len());
        for row in rows {
            row_ids.push(self.insert_row(row)?);
        }

        info!(
            instance = %self.instance,
            items = row_ids.len(),
            "Batch inserted into cart"
        );
        self.emit(CartEvent::Batched {
            instance: self.instance.clone(),
            row_ids: row_ids.clone(),
        });
        Ok(row_ids)
    }

    /// Inserts a single item or a batch.
    pub fn add(&mut self, payload: impl Into<InsertPayload>) -> CartResult<Vec<RowId>> {
        match payload.into() {
            InsertPayload::Single(item) => self.insert(item).map(|row_id| vec![row_id]),
            InsertPayload::Batch(items) => self.insert_batch(items),
        }
    }

    /// Updates a row's quantity or attributes.
    ///
    /// A quantity of zero or less removes the row; the result is then
    /// `None`. Otherwise the updated row is returned.
    pub fn update(
        &mut self,
        row_id: &RowId,
        update: impl Into<CartUpdate>,
    ) -> CartResult<Option<CartRow>> {
        let update = update.into();
        let mut cart = self.load()?;
        if !cart.contains(row_id) {
            return Err(self.row_not_found(row_id));
        }
        if let CartUpdate::Attributes(patch) = &update {
            validate_patch(patch)?;
        }

        let updated = match update {
            CartUpdate::Quantity(quantity) if quantity <= 0 => {
                debug!(instance = %self.instance, row_id = %row_id, quantity, "Quantity update removes row");
                None
            }
            other => {
                let row = cart
                    .get_mut(row_id)
                    .ok_or_else(|| self.row_not_found(row_id))?;
                match other {
                    CartUpdate::Quantity(quantity) => row.set_quantity(quantity)?,
                    CartUpdate::Attributes(patch) => row.apply(patch)?,
                }
                let snapshot = row.clone();
                cart.recalculate()?;
                Some(snapshot)
            }
        };

        self.emit(CartEvent::Updating {
            instance: self.instance.clone(),
            row_id: row_id.clone(),
        });

        match &updated {
            None => self.remove_row(cart, row_id)?,
            Some(row) => {
                self.persist(&cart)?;
                debug!(
                    instance = %self.instance,
                    row_id = %row_id,
                    quantity = row.quantity,
                    "Updated cart row"
                );
            }
        }

        self.emit(CartEvent::Updated {
            instance: self.instance.clone(),
            row_id: row_id.clone(),
        });
        Ok(updated)
    }

    /// Removes a row.
    pub fn remove(&mut self, row_id: &RowId) -> CartResult<()> {
        let cart = self.load()?;
        if !cart.contains(row_id) {
            return Err(self.row_not_found(row_id));
        }
        self.remove_row(cart, row_id)
    }

    /// Clears the current instance.
    pub fn destroy(&mut self) -> CartResult<()> {
        self.emit(CartEvent::Destroying {
            instance: self.instance.clone(),
        });

        let key = self.session_key();
        self.store.forget(&key)?;
        self.store.save()?;
        info!(instance = %self.instance, "Destroyed cart");

        self.emit(CartEvent::Destroyed {
            instance: self.instance.clone(),
        });
        Ok(())
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Row by id, if present.
    pub fn get(&self, row_id: &RowId) -> CartResult<Option<CartRow>> {
        Ok(self.load()?.get(row_id).cloned())
    }

    /// The whole cart, or `None` when it has no rows.
    pub fn contents(&self) -> CartResult<Option<Cart>> {
        let cart = self.load()?;
        Ok((!cart.is_empty()).then_some(cart))
    }

    /// Sum of quantities, or the number of rows when `count_rows` is set.
    pub fn quantity(&self, count_rows: bool) -> CartResult<i64> {
        Ok(self.load()?.quantity(count_rows))
    }

    /// Ids of rows matching every criterion, or `None` when nothing matches
    /// or no criteria were given.
    pub fn search(&self, criteria: &CartOptions) -> CartResult<Option<Vec<RowId>>> {
        let matches = self.load()?.search(criteria);
        Ok((!matches.is_empty()).then_some(matches))
    }

    pub fn total(&self) -> CartResult<Money> {
        Ok(self.load()?.total)
    }

    pub fn subtotal(&self) -> CartResult<Money> {
        Ok(self.load()?.subtotal)
    }

    pub fn discount(&self) -> CartResult<Money> {
        Ok(self.load()?.discount)
    }

    pub fn custom_discount(&self) -> CartResult<Money> {
        Ok(self.load()?.custom_discount)
    }

    // =========================================================================
    // Aggregates
    // =========================================================================

    /// Recomputes and stores the cart total. `false` on an empty cart.
    pub fn set_total(&mut self) -> CartResult<bool> {
        self.update_aggregate(Cart::recompute_total)
    }

    /// Recomputes and stores the subtotal. `false` on an empty cart.
    pub fn set_subtotal(&mut self) -> CartResult<bool> {
        self.update_aggregate(Cart::recompute_subtotal)
    }

    /// Recomputes and stores the discount. `false` on an empty cart.
    pub fn set_discount(&mut self) -> CartResult<bool> {
        self.update_aggregate(Cart::recompute_discount)
    }

    /// Sets a cart-level discount taken off the subtotal.
    ///
    /// Returns `false` without writing when the cart is empty.
    pub fn set_custom_discount(&mut self, amount: Money) -> CartResult<bool> {
        if amount.is_negative() {
            return Err(CartError::InvalidDiscount {
                value: amount.to_string(),
            });
        }
        let applied = self.update_aggregate(|cart| cart.set_custom_discount(amount))?;
        if applied {
            debug!(instance = %self.instance, discount = %amount, "Applied custom discount");
        }
        Ok(applied)
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn insert_row(&mut self, row: NewRow) -> CartResult<RowId> {
        let mut cart = self.load()?;
        let (row_id, merged) = cart.add(row.clone(), self.associated_model.clone())?;
        cart.recalculate()?;

        self.emit(CartEvent::Inserting {
            instance: self.instance.clone(),
            item: row.clone(),
        });
        self.persist(&cart)?;

        debug!(
            instance = %self.instance,
            row_id = %row_id,
            product_id = %row.id,
            quantity = row.quantity,
            merged,
            "Inserted into cart"
        );

        self.emit(CartEvent::Inserted {
            instance: self.instance.clone(),
            row_id: row_id.clone(),
            item: row,
        });
        Ok(row_id)
    }

    fn remove_row(&mut self, mut cart: Cart, row_id: &RowId) -> CartResult<()> {
        cart.remove(row_id);
        cart.recalculate()?;

        self.emit(CartEvent::Removing {
            instance: self.instance.clone(),
            row_id: row_id.clone(),
        });
        self.persist(&cart)?;
        debug!(instance = %self.instance, row_id = %row_id, "Removed cart row");

        self.emit(CartEvent::Removed {
            instance: self.instance.clone(),
            row_id: row_id.clone(),
        });
        Ok(())
    }

    fn update_aggregate(
        &mut self,
        recompute: impl FnOnce(&mut Cart) -> CartResult<bool>,
    ) -> CartResult<bool> {
        let mut cart = self.load()?;
        if !recompute(&mut cart)? {
            return Ok(false);
        }
        self.persist(&cart)?;
        Ok(true)
    }

    fn load(&self) -> CartResult<Cart> {
        let key = self.session_key();
        if !self.store.has(&key)? {
            return Ok(Cart::new());
        }
        match self.store.get(&key)? {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(Cart::new()),
        }
    }

    /// Writes the cart back. An empty cart is forgotten.
    fn persist(&mut self, cart: &Cart) -> CartResult<()> {
        let key = self.session_key();
        if cart.is_empty() {
            self.store.forget(&key)?;
        } else {
            self.store.put(&key, serde_json::to_string(cart)?)?;
        }
        self.store.save()?;
        Ok(())
    }

    fn emit(&self, event: CartEvent) {
        self.events.emit(&event);
    }

    fn row_not_found(&self, row_id: &RowId) -> CartError {
        CartError::InvalidRowId {
            instance: self.instance.clone(),
            row_id: row_id.to_string(),
        }
    }
}

impl<S> fmt::Debug for CartManager<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CartManager")
            .field("instance", &self.instance)
            .field("associated_model", &self.associated_model)
            .field("models", &self.models)
            .field("events", &self.events)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
