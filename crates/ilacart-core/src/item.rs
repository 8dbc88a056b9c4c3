//! # Insert Payloads
//!
//! The loosely typed shapes a storefront hands to `insert`, and the typed
//! [`NewRow`] they are reduced to before anything touches the cart.
//!
//! ## Accepted Shapes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  { "id": "A", "name": "Tee", "quantity": 2, "price": "9.99", ... }     │
//! │        → InsertPayload::Single                                          │
//! │                                                                         │
//! │  [ { "id": "A", ... }, { "id": "B", ... } ]                             │
//! │        → InsertPayload::Batch                                           │
//! │                                                                         │
//! │  [ "A", "SKU-A", "Tee", null, null, null, 2, 9.99, 0, 0, {"size":"M"} ] │
//! │        → legacy positional list → InsertPayload::Single                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{CartError, CartResult};
use crate::money::Money;
use crate::options::{CartOptions, OptionValue};
use crate::validation;

/// Positional order of the legacy flat argument list.
const POSITIONAL_FIELDS: [&str; 11] = [
    "id",
    "sku",
    "name",
    "slug",
    "image",
    "description",
    "quantity",
    "price",
    "discount",
    "tax",
    "options",
];

// =============================================================================
// Item Input
// =============================================================================

/// One line item as supplied by the caller, before validation.
///
/// Every field is raw JSON so that "missing", "empty" and "not a number"
/// can be told apart and reported with the right error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemInput {
    #[serde(alias = "productId", alias = "product_id")]
    pub id: Option<Value>,
    pub sku: Option<Value>,
    pub name: Option<Value>,
    pub slug: Option<Value>,
    pub image: Option<Value>,
    pub description: Option<Value>,
    pub quantity: Option<Value>,
    pub price: Option<Value>,
    pub discount: Option<Value>,
    pub tax: Option<Value>,
    pub options: Option<Value>,
}

impl ItemInput {
    /// Starts an item with its product id and display name.
    ///
    /// ## Example
    /// ```rust
    /// use ilacart_core::ItemInput;
    ///
    /// let item = ItemInput::new("A", "T-Shirt")
    ///     .quantity(2)
    ///     .price("19.99")
    ///     .option("size", "M");
    /// assert!(item.validate().is_ok());
    /// ```
    pub fn new(id: impl Into<Value>, name: impl Into<Value>) -> Self {
        ItemInput {
            id: Some(id.into()),
            name: Some(name.into()),
            ..ItemInput::default()
        }
    }

    pub fn sku(mut self, sku: impl Into<Value>) -> Self {
        self.sku = Some(sku.into());
        self
    }

    pub fn slug(mut self, slug: impl Into<Value>) -> Self {
        self.slug = Some(slug.into());
        self
    }

    pub fn image(mut self, image: impl Into<Value>) -> Self {
        self.image = Some(image.into());
        self
    }

    pub fn description(mut self, description: impl Into<Value>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn quantity(mut self, quantity: impl Into<Value>) -> Self {
        self.quantity = Some(quantity.into());
        self
    }

    pub fn price(mut self, price: impl Into<Value>) -> Self {
        self.price = Some(price.into());
        self
    }

    pub fn discount(mut self, discount: impl Into<Value>) -> Self {
        self.discount = Some(discount.into());
        self
    }

    pub fn tax(mut self, tax: impl Into<Value>) -> Self {
        self.tax = Some(tax.into());
        self
    }

    /// Adds a single option, keeping any already set.
    pub fn option(mut self, key: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        let mut options = match self.options.take() {
            Some(Value::Object(map)) => map,
            _ => serde_json::Map::new(),
        };
        let value = match value.into() {
            OptionValue::Bool(b) => Value::Bool(b),
            OptionValue::Int(i) => Value::from(i),
            OptionValue::Float(x) => Value::from(x),
            OptionValue::Text(s) => Value::String(s),
        };
        options.insert(key.into(), value);
        self.options = Some(Value::Object(options));
        self
    }

    /// Replaces the option set.
    pub fn options(mut self, options: &CartOptions) -> Self {
        self.options = None;
        for (key, value) in options.iter() {
            self = self.option(key, value.clone());
        }
        self
    }

    /// Reduces the legacy flat argument list to the structured form.
    ///
    /// ## Positions
    /// `id, sku, name, slug, image, description, quantity, price, discount,
    /// tax, options`. Trailing arguments may be omitted.
    pub fn from_args(args: &[Value]) -> CartResult<Self> {
        if args.len() > POSITIONAL_FIELDS.len() {
            return Err(CartError::missing("arguments"));
        }

        let arg = |i: usize| args.get(i).filter(|v| !v.is_null()).cloned();

        Ok(ItemInput {
            id: arg(0),
            sku: arg(1),
            name: arg(2),
            slug: arg(3),
            image: arg(4),
            description: arg(5),
            quantity: arg(6),
            price: arg(7),
            discount: arg(8),
            tax: arg(9),
            options: arg(10),
        })
    }

    /// Validates and converts into a [`NewRow`].
    pub fn validate(&self) -> CartResult<NewRow> {
        validation::validate_item(self)
    }
}

// =============================================================================
// Insert Payload
// =============================================================================

/// What `CartManager::add` accepts: one item or a batch.
#[derive(Debug, Clone, PartialEq)]
pub enum InsertPayload {
    Single(ItemInput),
    Batch(Vec<ItemInput>),
}

impl InsertPayload {
    /// Classifies a JSON payload.
    ///
    /// An array whose first element is an object is a batch; any other
    /// array is the legacy positional form.
    pub fn from_json(value: Value) -> CartResult<Self> {
        match value {
            Value::Object(_) => Ok(InsertPayload::Single(item_from_json(value)?)),
            Value::Array(items) if items.first().is_some_and(Value::is_object) => items
                .into_iter()
                .map(item_from_json)
                .collect::<CartResult<Vec<_>>>()
                .map(InsertPayload::Batch),
            Value::Array(args) => ItemInput::from_args(&args).map(InsertPayload::Single),
            _ => Err(CartError::missing("item")),
        }
    }

    /// Number of items carried.
    pub fn len(&self) -> usize {
        match self {
            InsertPayload::Single(_) => 1,
            InsertPayload::Batch(items) => items.len(),
        }
    }

    /// Checks for an empty batch.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<ItemInput> for InsertPayload {
    fn from(item: ItemInput) -> Self {
        InsertPayload::Single(item)
    }
}

impl From<Vec<ItemInput>> for InsertPayload {
    fn from(items: Vec<ItemInput>) -> Self {
        InsertPayload::Batch(items)
    }
}

fn item_from_json(value: Value) -> CartResult<ItemInput> {
    if !value.is_object() {
        return Err(CartError::missing("item"));
    }
    serde_json::from_value(value).map_err(|_| CartError::missing("item"))
}

// =============================================================================
// New Row
// =============================================================================

/// A validated line item, ready to be inserted or merged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRow {
    pub id: String,
    pub sku: Option<String>,
    pub name: String,
    pub slug: Option<String>,
    pub image: Option<String>,
    pub description: Option<String>,
    pub quantity: i64,
    pub price: Money,
    pub discount: Money,
    pub tax: Money,
    pub options: CartOptions,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builder_sets_fields() {
        let item = ItemInput::new("A", "Tee")
            .sku("TEE-A")
            .quantity(2)
            .price(10)
            .option("color", "red")
            .option("size", "M");

        assert_eq!(item.id, Some(json!("A")));
        assert_eq!(item.sku, Some(json!("TEE-A")));
        assert_eq!(item.options, Some(json!({"color": "red", "size": "M"})));
    }

    #[test]
    fn test_options_replaces_previous_set() {
        let item = ItemInput::new("A", "Tee")
            .option("color", "red")
            .options(&CartOptions::new().with("size", "L"));
        assert_eq!(item.options, Some(json!({"size": "L"})));
    }

    #[test]
    fn test_deserialize_accepts_product_id_aliases() {
        let item: ItemInput =
            serde_json::from_value(json!({"productId": "A", "name": "Tee"})).unwrap();
        assert_eq!(item.id, Some(json!("A")));

        let item: ItemInput =
            serde_json::from_value(json!({"product_id": 7, "name": "Tee"})).unwrap();
        assert_eq!(item.id, Some(json!(7)));
    }

    #[test]
    fn test_from_args_positional() {
        let args = vec![
            json!("A"),
            json!("SKU-A"),
            json!("Tee"),
            Value::Null,
            Value::Null,
            json!("Cotton"),
            json!(2),
            json!(9.99),
        ];
        let item = ItemInput::from_args(&args).unwrap();

        assert_eq!(item.id, Some(json!("A")));
        assert_eq!(item.slug, None);
        assert_eq!(item.description, Some(json!("Cotton")));
        assert_eq!(item.price, Some(json!(9.99)));
        assert_eq!(item.discount, None);
        assert_eq!(item.options, None);
    }

    #[test]
    fn test_from_args_rejects_overlong_list() {
        let args = vec![Value::Null; 12];
        assert!(matches!(
            ItemInput::from_args(&args),
            Err(CartError::InvalidItem { .. })
        ));
    }

    #[test]
    fn test_payload_classification() {
        let single = InsertPayload::from_json(json!({"id": "A"})).unwrap();
        assert!(matches!(single, InsertPayload::Single(_)));

        let batch = InsertPayload::from_json(json!([{"id": "A"}, {"id": "B"}])).unwrap();
        assert_eq!(batch.len(), 2);
        assert!(matches!(batch, InsertPayload::Batch(_)));

        let legacy = InsertPayload::from_json(json!(["A", null, "Tee", null, null, null, 1, 5]))
            .unwrap();
        match legacy {
            InsertPayload::Single(item) => assert_eq!(item.name, Some(json!("Tee"))),
            other => panic!("expected single, got {:?}", other),
        }
    }

    #[test]
    fn test_payload_rejects_scalars_and_mixed_batches() {
        assert!(InsertPayload::from_json(json!("A")).is_err());
        assert!(InsertPayload::from_json(json!([{"id": "A"}, "B"])).is_err());
    }
}
