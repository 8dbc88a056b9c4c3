//! # Validation Module
//!
//! Turns loosely typed storefront input into typed cart values.
//!
//! ## Validation Order (insert)
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. id        missing / blank            → InvalidItem { id }           │
//! │  2. name      missing / blank            → InvalidItem { name }         │
//! │  3. quantity  missing / blank / zero     → InvalidItem { quantity }     │
//! │               not a positive integer     → InvalidQuantity              │
//! │  4. price     missing                    → InvalidItem { price }        │
//! │               not a number, or negative  → InvalidPrice                 │
//! │  5. discount  absent → 0, else as price  → InvalidDiscount              │
//! │  6. tax       absent → 0, else as price  → InvalidTax                   │
//! │                                                                         │
//! │  Every check runs before the session is touched.                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use ilacart_core::validation::{validate_instance, validate_quantity};
//! use serde_json::json;
//!
//! assert!(validate_instance("wishlist").is_ok());
//! assert_eq!(validate_quantity(&json!("3")).unwrap(), 3);
//! assert!(validate_quantity(&json!(-1)).is_err());
//! ```

use serde_json::Value;

use crate::error::{CartError, CartResult};
use crate::item::{ItemInput, NewRow};
use crate::money::Money;
use crate::options::{CartOptions, OptionValue};
use crate::row::{CartUpdate, RowPatch};

// =============================================================================
// Instance Names
// =============================================================================

/// Validates an instance name, returning it trimmed.
pub fn validate_instance(name: &str) -> CartResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(CartError::InvalidInstance);
    }
    Ok(name.to_string())
}

// =============================================================================
// Items
// =============================================================================

/// Validates an insert payload item.
pub fn validate_item(item: &ItemInput) -> CartResult<NewRow> {
    let id = product_id(item.id.as_ref())?;
    let name = required_text("name", item.name.as_ref())?;

    let quantity = match item.quantity.as_ref() {
        Some(value) if !is_blank(value) => validate_quantity(value)?,
        _ => return Err(CartError::missing("quantity")),
    };

    let price = match item.price.as_ref() {
        Some(value) if !value.is_null() => validate_price(value)?,
        _ => return Err(CartError::missing("price")),
    };

    let discount = match item.discount.as_ref() {
        Some(value) if !value.is_null() => validate_discount(value)?,
        _ => Money::zero(),
    };

    let tax = match item.tax.as_ref() {
        Some(value) if !value.is_null() => validate_tax(value)?,
        _ => Money::zero(),
    };

    let options = match item.options.as_ref() {
        Some(value) => parse_options(value)?,
        None => CartOptions::new(),
    };

    Ok(NewRow {
        id,
        sku: optional_text("sku", item.sku.as_ref())?,
        name,
        slug: optional_text("slug", item.slug.as_ref())?,
        image: optional_text("image", item.image.as_ref())?,
        description: optional_text("description", item.description.as_ref())?,
        quantity,
        price,
        discount,
        tax,
        options,
    })
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a quantity: a positive whole number, or a string holding one.
pub fn validate_quantity(value: &Value) -> CartResult<i64> {
    whole_number(value)
        .filter(|q| *q > 0)
        .ok_or_else(|| CartError::InvalidQuantity {
            value: value_text(value),
        })
}

/// Validates a unit price.
pub fn validate_price(value: &Value) -> CartResult<Money> {
    amount(value).ok_or_else(|| CartError::InvalidPrice {
        value: value_text(value),
    })
}

/// Validates a per-unit discount.
pub fn validate_discount(value: &Value) -> CartResult<Money> {
    amount(value).ok_or_else(|| CartError::InvalidDiscount {
        value: value_text(value),
    })
}

/// Validates a per-unit tax amount.
pub fn validate_tax(value: &Value) -> CartResult<Money> {
    amount(value).ok_or_else(|| CartError::InvalidTax {
        value: value_text(value),
    })
}

// =============================================================================
// Options
// =============================================================================

/// Parses an options object. Values must be scalars.
///
/// `null` and `[]` both mean "no options".
pub fn parse_options(value: &Value) -> CartResult<CartOptions> {
    match value {
        Value::Null => Ok(CartOptions::new()),
        Value::Array(items) if items.is_empty() => Ok(CartOptions::new()),
        Value::Object(map) => {
            let mut options = CartOptions::new();
            for (key, v) in map {
                options.insert(key.clone(), option_value(v)?);
            }
            Ok(options)
        }
        _ => Err(CartError::missing("options")),
    }
}

fn option_value(value: &Value) -> CartResult<OptionValue> {
    match value {
        Value::Bool(b) => Ok(OptionValue::Bool(*b)),
        Value::String(s) => Ok(OptionValue::Text(s.clone())),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Ok(OptionValue::Int(i)),
            None => n
                .as_f64()
                .map(OptionValue::Float)
                .ok_or_else(|| CartError::missing("options")),
        },
        _ => Err(CartError::missing("options")),
    }
}

// =============================================================================
// Updates
// =============================================================================

/// Parses an update argument: a number/numeric string is a quantity,
/// an object is an attribute patch.
pub fn parse_update(value: &Value) -> CartResult<CartUpdate> {
    match value {
        Value::Object(_) => parse_patch(value).map(CartUpdate::Attributes),
        Value::Number(_) | Value::String(_) => whole_number(value)
            .map(CartUpdate::Quantity)
            .ok_or_else(|| CartError::InvalidQuantity {
                value: value_text(value),
            }),
        _ => Err(CartError::InvalidQuantity {
            value: value_text(value),
        }),
    }
}

/// Parses an attribute patch object.
///
/// Keys rows don't have are rejected with `InvalidItem`, naming the key.
pub fn parse_patch(value: &Value) -> CartResult<RowPatch> {
    let Value::Object(map) = value else {
        return Err(CartError::missing("attributes"));
    };

    let mut patch = RowPatch::new();
    for (key, v) in map {
        match key.as_str() {
            "sku" => patch.sku = optional_text("sku", Some(v))?,
            "name" => patch.name = Some(required_text("name", Some(v))?),
            "slug" => patch.slug = optional_text("slug", Some(v))?,
            "image" => patch.image = optional_text("image", Some(v))?,
            "description" => patch.description = optional_text("description", Some(v))?,
            "quantity" => patch.quantity = Some(validate_quantity(v)?),
            "price" => patch.price = Some(validate_price(v)?),
            "discount" => patch.discount = Some(validate_discount(v)?),
            "tax" => patch.tax = Some(validate_tax(v)?),
            "options" => patch.options = Some(parse_options(v)?),
            other => return Err(CartError::missing(other)),
        }
    }
    Ok(patch)
}

/// Checks a typed patch with the same rules as insert.
pub fn validate_patch(patch: &RowPatch) -> CartResult<()> {
    if let Some(name) = &patch.name {
        if name.trim().is_empty() {
            return Err(CartError::missing("name"));
        }
    }
    if let Some(quantity) = patch.quantity {
        if quantity <= 0 {
            return Err(CartError::InvalidQuantity {
                value: quantity.to_string(),
            });
        }
    }
    if let Some(price) = patch.price.filter(Money::is_negative) {
        return Err(CartError::InvalidPrice {
            value: price.to_string(),
        });
    }
    if let Some(discount) = patch.discount.filter(Money::is_negative) {
        return Err(CartError::InvalidDiscount {
            value: discount.to_string(),
        });
    }
    if let Some(tax) = patch.tax.filter(Money::is_negative) {
        return Err(CartError::InvalidTax {
            value: tax.to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Helpers
// =============================================================================

fn product_id(value: Option<&Value>) -> CartResult<String> {
    match value {
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        _ => Err(CartError::missing("id")),
    }
}

fn required_text(field: &str, value: Option<&Value>) -> CartResult<String> {
    optional_text(field, value)?.ok_or_else(|| CartError::missing(field))
}

/// Scalars become text; blank strings count as absent.
fn optional_text(field: &str, value: Option<&Value>) -> CartResult<Option<String>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.trim().to_string())),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(Value::Bool(b)) => Ok(Some(b.to_string())),
        Some(_) => Err(CartError::missing(field)),
    }
}

/// "Empty" in the loose sense: null, false, blank, `0` or `"0"`.
fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::String(s) => {
            let s = s.trim();
            s.is_empty() || s == "0"
        }
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::Array(items) => items.is_empty(),
        Value::Object(_) => false,
    }
}

fn whole_number(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|x| x.fract() == 0.0 && x.abs() < 9.0e15)
                .map(|x| x as i64)
        }),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

fn amount(value: &Value) -> Option<Money> {
    Money::from_json(value).filter(|m| !m.is_negative())
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid() -> ItemInput {
        ItemInput::new("A", "Tee").quantity(2).price("10.00")
    }

    #[test]
    fn test_validate_instance() {
        assert_eq!(validate_instance(" wishlist ").unwrap(), "wishlist");
        assert!(matches!(
            validate_instance("   "),
            Err(CartError::InvalidInstance)
        ));
    }

    #[test]
    fn test_valid_item_defaults() {
        let row = valid().validate().unwrap();

        assert_eq!(row.id, "A");
        assert_eq!(row.quantity, 2);
        assert_eq!(row.price, Money::from_cents(1000));
        assert_eq!(row.discount, Money::zero());
        assert_eq!(row.tax, Money::zero());
        assert!(row.options.is_empty());
    }

    #[test]
    fn test_numeric_product_id_becomes_text() {
        let row = ItemInput::new(42, "Mug").quantity(1).price(5).validate().unwrap();
        assert_eq!(row.id, "42");
    }

    #[test]
    fn test_missing_fields_in_order() {
        let err = ItemInput::default().validate().unwrap_err();
        assert!(matches!(err, CartError::InvalidItem { ref field } if field == "id"));

        let err = ItemInput::new("A", "  ").validate().unwrap_err();
        assert!(matches!(err, CartError::InvalidItem { ref field } if field == "name"));

        let err = ItemInput::new("A", "Tee").price(1).validate().unwrap_err();
        assert!(matches!(err, CartError::InvalidItem { ref field } if field == "quantity"));

        let err = ItemInput::new("A", "Tee").quantity(1).validate().unwrap_err();
        assert!(matches!(err, CartError::InvalidItem { ref field } if field == "price"));
    }

    #[test]
    fn test_zero_quantity_is_missing_not_invalid() {
        for zero in [json!(0), json!("0"), json!("")] {
            let err = valid().quantity(zero).validate().unwrap_err();
            assert!(matches!(err, CartError::InvalidItem { .. }));
        }
    }

    #[test]
    fn test_bad_quantity() {
        for bad in [json!(-1), json!("abc"), json!(2.5), json!("1.5")] {
            let err = valid().quantity(bad).validate().unwrap_err();
            assert!(matches!(err, CartError::InvalidQuantity { .. }));
        }
        // A whole float is still a whole number
        assert_eq!(valid().quantity(3.0).validate().unwrap().quantity, 3);
    }

    #[test]
    fn test_bad_amounts() {
        let err = valid().price("ten").validate().unwrap_err();
        assert!(matches!(err, CartError::InvalidPrice { ref value } if value == "ten"));

        let err = valid().price(-1).validate().unwrap_err();
        assert!(matches!(err, CartError::InvalidPrice { .. }));

        let err = valid().discount("x").validate().unwrap_err();
        assert!(matches!(err, CartError::InvalidDiscount { .. }));

        let err = valid().tax(true).validate().unwrap_err();
        assert!(matches!(err, CartError::InvalidTax { .. }));
    }

    #[test]
    fn test_free_items_are_allowed() {
        let row = valid().price(0).validate().unwrap();
        assert!(row.price.is_zero());
    }

    #[test]
    fn test_parse_options() {
        let options = parse_options(&json!({"size": "M", "pack": 6, "gift": true})).unwrap();
        assert_eq!(options.get("pack"), Some(&OptionValue::Int(6)));

        assert!(parse_options(&json!([])).unwrap().is_empty());
        assert!(parse_options(&json!(null)).unwrap().is_empty());
        assert!(parse_options(&json!({"nested": {"a": 1}})).is_err());
        assert!(parse_options(&json!("size")).is_err());
    }

    #[test]
    fn test_parse_update_shapes() {
        assert_eq!(parse_update(&json!(3)).unwrap(), CartUpdate::Quantity(3));
        assert_eq!(parse_update(&json!("0")).unwrap(), CartUpdate::Quantity(0));
        assert_eq!(parse_update(&json!(-2)).unwrap(), CartUpdate::Quantity(-2));

        let update = parse_update(&json!({"name": "Hoodie", "price": "25"})).unwrap();
        assert_eq!(
            update,
            CartUpdate::Attributes(RowPatch::new().name("Hoodie").price(Money::from_cents(2500)))
        );

        assert!(matches!(
            parse_update(&json!("lots")),
            Err(CartError::InvalidQuantity { .. })
        ));
        assert!(parse_update(&json!(null)).is_err());
    }

    #[test]
    fn test_parse_patch_rejects_unknown_keys_and_bad_values() {
        let err = parse_patch(&json!({"colour": "red"})).unwrap_err();
        assert!(matches!(err, CartError::InvalidItem { ref field } if field == "colour"));

        let err = parse_patch(&json!({"quantity": 0})).unwrap_err();
        assert!(matches!(err, CartError::InvalidQuantity { .. }));

        let err = parse_patch(&json!({"name": ""})).unwrap_err();
        assert!(matches!(err, CartError::InvalidItem { .. }));
    }

    #[test]
    fn test_validate_patch() {
        assert!(validate_patch(&RowPatch::new().quantity(2)).is_ok());
        assert!(validate_patch(&RowPatch::new().quantity(0)).is_err());
        assert!(validate_patch(&RowPatch::new().name(" ")).is_err());
        assert!(matches!(
            validate_patch(&RowPatch::new().tax(Money::from_cents(-1))),
            Err(CartError::InvalidTax { .. })
        ));
    }
}
