//! # Commands Module
//!
//! Command handlers and the dispatch table that routes invocations to them.
//!
//! ## Invocation Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  { "command": "update_cart_row",                                        │
//! │    "args": { "rowId": "9f2c...", "update": 3 } }                        │
//! │                     │                                                   │
//! │                     ▼                                                   │
//! │  invoke() ──► update_cart_row(&state, row_id, update)                   │
//! │                     │                                                   │
//! │                     ▼                                                   │
//! │  Ok(Value)  or  Err(ApiError { code, message })                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Command Reference
//! | Command                 | Args                      |
//! |-------------------------|---------------------------|
//! | `get_cart`              |                           |
//! | `get_cart_row`          | `rowId`                   |
//! | `add_to_cart`           | `payload`                 |
//! | `update_cart_row`       | `rowId`, `update`         |
//! | `remove_from_cart`      | `rowId`                   |
//! | `clear_cart`            |                           |
//! | `search_cart`           | `criteria`                |
//! | `cart_quantity`         | `countRows`?              |
//! | `switch_instance`       | `name`                    |
//! | `associate_model`       | `model`, `namespace`?     |
//! | `apply_custom_discount` | `amount`                  |

pub mod cart;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ApiError;
use crate::state::CartState;

/// A command name plus its camelCase arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invocation {
    pub command: String,

    #[serde(default)]
    pub args: Value,
}

impl Invocation {
    pub fn new(command: impl Into<String>, args: Value) -> Self {
        Invocation {
            command: command.into(),
            args,
        }
    }

    fn arg(&self, name: &str) -> Value {
        self.args.get(name).cloned().unwrap_or(Value::Null)
    }

    fn text_arg(&self, name: &str) -> Result<String, ApiError> {
        match self.args.get(name) {
            Some(Value::String(s)) => Ok(s.clone()),
            _ => Err(ApiError::validation(format!(
                "Missing argument '{}' for {}",
                name, self.command
            ))),
        }
    }

    fn optional_text_arg(&self, name: &str) -> Option<String> {
        self.args.get(name).and_then(Value::as_str).map(String::from)
    }
}

/// Runs one command against the cart state.
pub fn invoke(state: &CartState, invocation: &Invocation) -> Result<Value, ApiError> {
    let data = match invocation.command.as_str() {
        "get_cart" => serde_json::to_value(cart::get_cart(state)?)?,
        "get_cart_row" => {
            serde_json::to_value(cart::get_cart_row(state, invocation.text_arg("rowId")?)?)?
        }
        "add_to_cart" => serde_json::to_value(cart::add_to_cart(state, invocation.arg("payload"))?)?,
        "update_cart_row" => serde_json::to_value(cart::update_cart_row(
            state,
            invocation.text_arg("rowId")?,
            invocation.arg("update"),
        )?)?,
        "remove_from_cart" => serde_json::to_value(cart::remove_from_cart(
            state,
            invocation.text_arg("rowId")?,
        )?)?,
        "clear_cart" => serde_json::to_value(cart::clear_cart(state)?)?,
        "search_cart" => {
            serde_json::to_value(cart::search_cart(state, invocation.arg("criteria"))?)?
        }
        "cart_quantity" => {
            let count_rows = invocation.args.get("countRows").and_then(Value::as_bool);
            serde_json::to_value(cart::cart_quantity(state, count_rows)?)?
        }
        "switch_instance" => {
            serde_json::to_value(cart::switch_instance(state, invocation.text_arg("name")?)?)?
        }
        "associate_model" => serde_json::to_value(cart::associate_model(
            state,
            invocation.text_arg("model")?,
            invocation.optional_text_arg("namespace"),
        )?)?,
        "apply_custom_discount" => serde_json::to_value(cart::apply_custom_discount(
            state,
            invocation.arg("amount"),
        )?)?,
        other => return Err(ApiError::not_found("Command", other)),
    };
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use serde_json::json;

    #[test]
    fn test_invoke_round_trip() {
        let state = CartState::in_memory();

        let added = invoke(
            &state,
            &Invocation::new(
                "add_to_cart",
                json!({"payload": {"id": "A", "name": "Mug", "quantity": 1, "price": 3}}),
            ),
        )
        .unwrap();
        let row_id = added["rowIds"][0].as_str().unwrap().to_string();

        let cart = invoke(
            &state,
            &Invocation::new("update_cart_row", json!({"rowId": row_id, "update": 4})),
        )
        .unwrap();
        assert_eq!(cart["totals"]["totalQuantity"], 4);
        assert_eq!(cart["rows"][0]["rowId"], row_id);

        let quantity = invoke(
            &state,
            &Invocation::new("cart_quantity", json!({"countRows": true})),
        )
        .unwrap();
        assert_eq!(quantity, 1);
    }

    #[test]
    fn test_args_default_to_null() {
        let invocation: Invocation = serde_json::from_str(r#"{"command":"get_cart"}"#).unwrap();
        assert_eq!(invocation.args, Value::Null);

        let state = CartState::in_memory();
        let cart = invoke(&state, &invocation).unwrap();
        assert_eq!(cart["instance"], "main");
    }

    #[test]
    fn test_missing_argument() {
        let state = CartState::in_memory();
        let err = invoke(&state, &Invocation::new("remove_from_cart", json!({}))).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[test]
    fn test_unknown_command() {
        let state = CartState::in_memory();
        let err = invoke(&state, &Invocation::new("checkout", Value::Null)).unwrap_err();
        assert_eq!(err, ApiError::not_found("Command", "checkout"));
    }
}
