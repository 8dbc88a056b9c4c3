//! # Cart Commands
//!
//! Command handlers for cart manipulation.
//!
//! ## Cart Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Lifecycle                                       │
//! │                                                                         │
//! │  ┌──────────┐   add_to_cart    ┌──────────┐   clear_cart   ┌─────────┐ │
//! │  │  Empty   │─────────────────►│ In Cart  │───────────────►│  Empty  │ │
//! │  │ (no key) │                  │ cart.<i> │                │ (no key)│ │
//! │  └──────────┘                  └──────────┘                └─────────┘ │
//! │                                  │     ▲                                │
//! │                    update_cart_row     │ apply_custom_discount          │
//! │                    remove_from_cart ───┘                                │
//! │                                                                         │
//! │  Removing the last row forgets the session key, same as clear_cart.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use ilacart_core::validation::{parse_options, parse_update};
use ilacart_core::{CartManager, CartResult, CartRow, InsertPayload, Money, RowId};

use crate::error::ApiError;
use crate::state::{CartState, CartTotals, SharedStore};

/// Cart response including rows and totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    pub instance: String,
    pub rows: Vec<CartRow>,
    pub totals: CartTotals,
}

impl CartResponse {
    fn load(manager: &CartManager<SharedStore>) -> CartResult<Self> {
        let cart = manager.contents()?.unwrap_or_default();
        Ok(CartResponse {
            instance: manager.current_instance().to_string(),
            totals: CartTotals::from(&cart),
            rows: cart.rows,
        })
    }
}

/// Result of `add_to_cart`: the affected rows plus the new cart.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartResponse {
    pub row_ids: Vec<RowId>,
    pub cart: CartResponse,
}

/// Gets the current instance's contents.
///
/// An instance that was never written is returned as an empty cart.
pub fn get_cart(state: &CartState) -> Result<CartResponse, ApiError> {
    debug!("get_cart command");
    state.with_cart(|c| Ok(CartResponse::load(c)?))
}

/// Gets one row.
pub fn get_cart_row(state: &CartState, row_id: String) -> Result<Option<CartRow>, ApiError> {
    debug!(row_id = %row_id, "get_cart_row command");
    state.with_cart(|c| Ok(c.get(&RowId::new(row_id))?))
}

/// Adds one item, a batch of items, or the positional argument form.
///
/// ## Payload Shapes
/// ```text
/// {"id": "A", "name": "Mug", "quantity": 1, "price": "4.50"}     single
/// [{"id": "A", ...}, {"id": "B", ...}]                            batch
/// ["A", "Mug", null, null, null, null, 1, "4.50"]                 positional
/// ```
pub fn add_to_cart(state: &CartState, payload: Value) -> Result<AddToCartResponse, ApiError> {
    debug!("add_to_cart command");
    let payload = InsertPayload::from_json(payload)?;

    state.with_cart_mut(|c| {
        let row_ids = c.add(payload)?;
        Ok(AddToCartResponse {
            row_ids,
            cart: CartResponse::load(c)?,
        })
    })
}

/// Updates a row's quantity (a number) or attributes (an object).
///
/// A quantity of zero or less removes the row.
pub fn update_cart_row(
    state: &CartState,
    row_id: String,
    update: Value,
) -> Result<CartResponse, ApiError> {
    debug!(row_id = %row_id, "update_cart_row command");
    let update = parse_update(&update)?;
    let row_id = RowId::new(row_id);

    state.with_cart_mut(|c| {
        c.update(&row_id, update)?;
        Ok(CartResponse::load(c)?)
    })
}

/// Removes a row from the cart.
pub fn remove_from_cart(state: &CartState, row_id: String) -> Result<CartResponse, ApiError> {
    debug!(row_id = %row_id, "remove_from_cart command");
    let row_id = RowId::new(row_id);

    state.with_cart_mut(|c| {
        c.remove(&row_id)?;
        Ok(CartResponse::load(c)?)
    })
}

/// Empties the current instance.
pub fn clear_cart(state: &CartState) -> Result<CartResponse, ApiError> {
    debug!("clear_cart command");
    state.with_cart_mut(|c| {
        c.destroy()?;
        Ok(CartResponse::load(c)?)
    })
}

/// Row ids whose attributes or options match every criterion.
///
/// `None` when nothing matched, including on an empty instance.
pub fn search_cart(state: &CartState, criteria: Value) -> Result<Option<Vec<RowId>>, ApiError> {
    debug!("search_cart command");
    let criteria = parse_options(&criteria)?;
    state.with_cart(|c| Ok(c.search(&criteria)?))
}

/// Total quantity, or the number of rows with `count_rows`.
pub fn cart_quantity(state: &CartState, count_rows: Option<bool>) -> Result<i64, ApiError> {
    debug!("cart_quantity command");
    state.with_cart(|c| Ok(c.quantity(count_rows.unwrap_or(false))?))
}

/// Switches to another cart instance and returns its contents.
pub fn switch_instance(state: &CartState, name: String) -> Result<CartResponse, ApiError> {
    debug!(instance = %name, "switch_instance command");
    state.with_cart_mut(|c| {
        c.instance(&name)?;
        Ok(CartResponse::load(c)?)
    })
}

/// Associates rows inserted from now on with a registered model.
pub fn associate_model(
    state: &CartState,
    model: String,
    namespace: Option<String>,
) -> Result<String, ApiError> {
    debug!(model = %model, "associate_model command");
    state.with_cart_mut(|c| {
        c.associate(&model, namespace.as_deref())?;
        Ok(c.associated_model().unwrap_or_default().to_string())
    })
}

/// Applies a cart-level discount taken off the subtotal.
///
/// On an empty cart nothing is written and the empty cart is returned.
pub fn apply_custom_discount(state: &CartState, amount: Value) -> Result<CartResponse, ApiError> {
    debug!("apply_custom_discount command");
    let amount = Money::from_json(&amount)
        .ok_or_else(|| ApiError::validation(format!("Invalid discount amount: {}", amount)))?;

    state.with_cart_mut(|c| {
        c.set_custom_discount(amount)?;
        Ok(CartResponse::load(c)?)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use serde_json::json;

    fn mug() -> Value {
        json!({"id": "A", "name": "Mug", "quantity": 2, "price": "4.50"})
    }

    #[test]
    fn test_get_empty_cart() {
        let state = CartState::in_memory();
        let cart = get_cart(&state).unwrap();

        assert_eq!(cart.instance, "main");
        assert!(cart.rows.is_empty());
        assert_eq!(cart.totals, CartTotals::default());
    }

    #[test]
    fn test_add_update_remove() {
        let state = CartState::in_memory();

        let added = add_to_cart(&state, mug()).unwrap();
        assert_eq!(added.row_ids.len(), 1);
        assert_eq!(added.cart.totals.total, Money::from_cents(900));
        let row_id = added.row_ids[0].to_string();

        let cart = update_cart_row(&state, row_id.clone(), json!(5)).unwrap();
        assert_eq!(cart.totals.total_quantity, 5);

        let cart = update_cart_row(&state, row_id.clone(), json!({"name": "Big Mug"})).unwrap();
        assert_eq!(cart.rows[0].name, "Big Mug");

        let cart = remove_from_cart(&state, row_id).unwrap();
        assert!(cart.rows.is_empty());
    }

    #[test]
    fn test_add_batch() {
        let state = CartState::in_memory();
        let added = add_to_cart(
            &state,
            json!([
                {"id": "A", "name": "Mug", "quantity": 1, "price": 4},
                {"id": "B", "name": "Pen", "quantity": 3, "price": 1}
            ]),
        )
        .unwrap();

        assert_eq!(added.row_ids.len(), 2);
        assert_eq!(cart_quantity(&state, None).unwrap(), 4);
        assert_eq!(cart_quantity(&state, Some(true)).unwrap(), 2);
    }

    #[test]
    fn test_add_invalid_item_is_validation_error() {
        let state = CartState::in_memory();
        let err = add_to_cart(&state, json!({"id": "A", "name": "Mug", "quantity": 1})).unwrap_err();

        assert_eq!(err.code, ErrorCode::ValidationError);
        assert!(get_cart(&state).unwrap().rows.is_empty());
    }

    #[test]
    fn test_oversized_amount_is_validation_error() {
        let state = CartState::in_memory();
        let err = add_to_cart(
            &state,
            json!({"id": "A", "name": "Mug", "quantity": i64::MAX / 2, "price": 10}),
        )
        .unwrap_err();

        assert_eq!(err.code, ErrorCode::ValidationError);
        assert!(get_cart(&state).unwrap().rows.is_empty());

        add_to_cart(&state, mug()).unwrap();
        assert_eq!(cart_quantity(&state, None).unwrap(), 2);
    }

    #[test]
    fn test_unknown_row_is_not_found() {
        let state = CartState::in_memory();
        add_to_cart(&state, mug()).unwrap();

        let err = remove_from_cart(&state, "nope".to_string()).unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[test]
    fn test_search() {
        let state = CartState::in_memory();
        assert_eq!(search_cart(&state, json!({"name": "Mug"})).unwrap(), None);

        let added = add_to_cart(&state, mug()).unwrap();
        assert_eq!(
            search_cart(&state, json!({"name": "Mug"})).unwrap(),
            Some(added.row_ids)
        );
        assert_eq!(search_cart(&state, json!({"name": "Cup"})).unwrap(), None);
    }

    #[test]
    fn test_instances_are_separate() {
        let state = CartState::in_memory();
        add_to_cart(&state, mug()).unwrap();

        let wishlist = switch_instance(&state, "wishlist".to_string()).unwrap();
        assert_eq!(wishlist.instance, "wishlist");
        assert!(wishlist.rows.is_empty());

        let main = switch_instance(&state, "main".to_string()).unwrap();
        assert_eq!(main.rows.len(), 1);

        let err = switch_instance(&state, "".to_string()).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidInstance);
    }

    #[test]
    fn test_custom_discount() {
        let state = CartState::in_memory();

        let empty = apply_custom_discount(&state, json!("1.00")).unwrap();
        assert_eq!(empty.totals.custom_discount, Money::zero());

        add_to_cart(&state, mug()).unwrap();
        let cart = apply_custom_discount(&state, json!("1.00")).unwrap();
        assert_eq!(cart.totals.custom_discount, Money::from_cents(100));
        assert_eq!(cart.totals.subtotal, Money::from_cents(800));

        let err = apply_custom_discount(&state, json!("abc")).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[test]
    fn test_associate_requires_registered_model() {
        let state = CartState::in_memory();
        let err = associate_model(&state, "Product".to_string(), None).unwrap_err();
        assert_eq!(err.code, ErrorCode::UnknownModel);
    }

    #[test]
    fn test_clear_cart() {
        let state = CartState::in_memory();
        add_to_cart(&state, mug()).unwrap();

        let cart = clear_cart(&state).unwrap();
        assert!(cart.rows.is_empty());
        assert_eq!(cart_quantity(&state, None).unwrap(), 0);
    }
}
