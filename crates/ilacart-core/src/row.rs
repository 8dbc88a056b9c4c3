//! # Cart Rows
//!
//! One row per distinct (product, options) pair.
//!
//! ## Derived Fields
//! ```text
//! total          = quantity × price − quantity × discount
//! total_discount = quantity × discount
//! subtotal       = total
//! ```
//!
//! `tax` is carried per unit and never computed on. Derived fields are
//! refreshed after every mutation, whichever attribute changed. A refresh
//! whose products leave the `i64` cent range fails with
//! `CartError::InvalidQuantity`; the row is then a scratch copy the caller
//! throws away, never persisted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CartError, CartResult};
use crate::item::NewRow;
use crate::money::Money;
use crate::options::{CartOptions, OptionValue};
use crate::row_id::RowId;

// =============================================================================
// Cart Row
// =============================================================================

/// A line in a cart instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartRow {
    pub row_id: RowId,
    /// Caller-supplied product id
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
    pub total: Money,
    pub total_discount: Money,
    pub subtotal: Money,
    /// Qualified model name in effect when the row was created
    pub associated_model: Option<String>,
    #[ts(as = "String")]
    pub added_at: DateTime<Utc>,
}

impl CartRow {
    /// Builds a fresh row with derived fields already computed.
    pub fn from_new(
        row_id: RowId,
        new: NewRow,
        associated_model: Option<String>,
    ) -> CartResult<Self> {
        let mut row = CartRow {
            row_id,
            id: new.id,
            sku: new.sku,
            name: new.name,
            slug: new.slug,
            image: new.image,
            description: new.description,
            quantity: new.quantity,
            price: new.price,
            discount: new.discount,
            tax: new.tax,
            options: new.options,
            total: Money::zero(),
            total_discount: Money::zero(),
            subtotal: Money::zero(),
            associated_model,
            added_at: Utc::now(),
        };
        row.refresh_totals()?;
        Ok(row)
    }

    /// Recomputes `total`, `total_discount` and `subtotal`.
    pub fn refresh_totals(&mut self) -> CartResult<()> {
        let quantity = self.quantity;
        let overflow = || CartError::amount_overflow(quantity);

        let gross = self.price.checked_mul(quantity).ok_or_else(overflow)?;
        let discount = self.discount.checked_mul(quantity).ok_or_else(overflow)?;
        let total = gross.checked_sub(discount).ok_or_else(overflow)?;

        self.total_discount = discount;
        self.total = total;
        self.subtotal = total;
        Ok(())
    }

    /// Replaces the quantity and refreshes totals.
    pub fn set_quantity(&mut self, quantity: i64) -> CartResult<()> {
        self.quantity = quantity;
        self.refresh_totals()
    }

    /// Applies an attribute patch.
    ///
    /// Options are merged rather than replaced. The row id is left alone:
    /// a row keeps the identity it was created under.
    pub fn apply(&mut self, patch: RowPatch) -> CartResult<()> {
        if let Some(sku) = patch.sku {
            self.sku = Some(sku);
        }
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(slug) = patch.slug {
            self.slug = Some(slug);
        }
        if let Some(image) = patch.image {
            self.image = Some(image);
        }
        if let Some(description) = patch.description {
            self.description = Some(description);
        }
        if let Some(quantity) = patch.quantity {
            self.quantity = quantity;
        }
        if let Some(price) = patch.price {
            self.price = price;
        }
        if let Some(discount) = patch.discount {
            self.discount = discount;
        }
        if let Some(tax) = patch.tax {
            self.tax = tax;
        }
        if let Some(options) = patch.options {
            self.options.merge(options);
        }
        self.refresh_totals()
    }

    /// Looks up a searchable value by key.
    ///
    /// Row attributes come first (`rowId`, `id`, `sku`, `name`, `slug`,
    /// `image`, `description`, `quantity`, `associatedModel`); any other key
    /// is looked up in the options.
    pub fn attribute(&self, key: &str) -> Option<OptionValue> {
        let text = |v: &Option<String>| v.as_deref().map(OptionValue::from);
        match key {
            "rowId" => Some(OptionValue::from(self.row_id.as_str())),
            "id" => Some(OptionValue::from(self.id.as_str())),
            "sku" => text(&self.sku),
            "name" => Some(OptionValue::from(self.name.as_str())),
            "slug" => text(&self.slug),
            "image" => text(&self.image),
            "description" => text(&self.description),
            "quantity" => Some(OptionValue::Int(self.quantity)),
            "associatedModel" => text(&self.associated_model),
            _ => self.options.get(key).cloned(),
        }
    }

    /// Strict AND over all criteria. Empty criteria never match.
    pub fn matches(&self, criteria: &CartOptions) -> bool {
        !criteria.is_empty()
            && criteria
                .iter()
                .all(|(key, value)| self.attribute(key).as_ref() == Some(value))
    }
}

// =============================================================================
// Updates
// =============================================================================

/// Attribute changes for an existing row. Unset fields are left as they are.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowPatch {
    pub sku: Option<String>,
    pub name: Option<String>,
    pub slug: Option<String>,
    pub image: Option<String>,
    pub description: Option<String>,
    pub quantity: Option<i64>,
    pub price: Option<Money>,
    pub discount: Option<Money>,
    pub tax: Option<Money>,
    pub options: Option<CartOptions>,
}

impl RowPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sku(mut self, sku: impl Into<String>) -> Self {
        self.sku = Some(sku.into());
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = Some(slug.into());
        self
    }

    pub fn image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn quantity(mut self, quantity: i64) -> Self {
        self.quantity = Some(quantity);
        self
    }

    pub fn price(mut self, price: Money) -> Self {
        self.price = Some(price);
        self
    }

    pub fn discount(mut self, discount: Money) -> Self {
        self.discount = Some(discount);
        self
    }

    pub fn tax(mut self, tax: Money) -> Self {
        self.tax = Some(tax);
        self
    }

    pub fn options(mut self, options: CartOptions) -> Self {
        self.options = Some(options);
        self
    }

    /// Checks if the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        *self == RowPatch::default()
    }
}

/// The two update shapes: a bare quantity or an attribute patch.
#[derive(Debug, Clone, PartialEq)]
pub enum CartUpdate {
    /// New quantity. Zero or below removes the row.
    Quantity(i64),
    Attributes(RowPatch),
}

impl From<i64> for CartUpdate {
    fn from(quantity: i64) -> Self {
        CartUpdate::Quantity(quantity)
    }
}

impl From<i32> for CartUpdate {
    fn from(quantity: i32) -> Self {
        CartUpdate::Quantity(i64::from(quantity))
    }
}

impl From<RowPatch> for CartUpdate {
    fn from(patch: RowPatch) -> Self {
        CartUpdate::Attributes(patch)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn new_row(quantity: i64, price: i64, discount: i64) -> NewRow {
        NewRow {
            id: "A".to_string(),
            sku: None,
            name: "Tee".to_string(),
            slug: None,
            image: None,
            description: None,
            quantity,
            price: Money::from_cents(price),
            discount: Money::from_cents(discount),
            tax: Money::from_cents(150),
            options: CartOptions::new().with("size", "M"),
        }
    }

    fn row(quantity: i64, price: i64, discount: i64) -> CartRow {
        let new = new_row(quantity, price, discount);
        let row_id = RowId::generate(&new.id, &new.options);
        CartRow::from_new(row_id, new, None).unwrap()
    }

    #[test]
    fn test_totals_on_creation() {
        let row = row(3, 1000, 200);

        assert_eq!(row.total, Money::from_cents(2400));
        assert_eq!(row.total_discount, Money::from_cents(600));
        assert_eq!(row.subtotal, row.total);
        // Tax is carried, not applied
        assert_eq!(row.tax, Money::from_cents(150));
    }

    #[test]
    fn test_set_quantity_refreshes_totals() {
        let mut row = row(1, 500, 0);
        row.set_quantity(4).unwrap();
        assert_eq!(row.total, Money::from_cents(2000));
    }

    #[test]
    fn test_oversized_line_amount_is_rejected() {
        let new = new_row(i64::MAX / 2, 10, 0);
        let row_id = RowId::generate(&new.id, &new.options);

        let err = CartRow::from_new(row_id, new, None).unwrap_err();
        assert!(matches!(err, CartError::InvalidQuantity { .. }));
    }

    #[test]
    fn test_set_quantity_overflow_keeps_totals() {
        let mut row = row(1, 500, 0);

        assert!(row.set_quantity(i64::MAX).is_err());
        assert_eq!(row.total, Money::from_cents(500));
    }

    #[test]
    fn test_apply_merges_options_and_keeps_identity() {
        let mut row = row(1, 500, 0);
        let original_id = row.row_id.clone();

        row.apply(
            RowPatch::new()
                .price(Money::from_cents(700))
                .options(CartOptions::new().with("color", "red")),
        )
        .unwrap();

        assert_eq!(row.row_id, original_id);
        assert_eq!(row.total, Money::from_cents(700));
        assert!(row.options.has("size"));
        assert!(row.options.has("color"));
    }

    #[test]
    fn test_apply_recomputes_after_discount_change() {
        let mut row = row(2, 1000, 0);
        row.apply(RowPatch::new().discount(Money::from_cents(250)))
            .unwrap();

        assert_eq!(row.total_discount, Money::from_cents(500));
        assert_eq!(row.total, Money::from_cents(1500));
    }

    #[test]
    fn test_attribute_lookup_prefers_row_fields() {
        let row = row(2, 1000, 0);

        assert_eq!(row.attribute("name"), Some(OptionValue::from("Tee")));
        assert_eq!(row.attribute("quantity"), Some(OptionValue::Int(2)));
        assert_eq!(row.attribute("size"), Some(OptionValue::from("M")));
        assert_eq!(row.attribute("sku"), None);
        assert_eq!(row.attribute("color"), None);
    }

    #[test]
    fn test_matches() {
        let row = row(2, 1000, 0);

        assert!(row.matches(&CartOptions::new().with("id", "A").with("size", "M")));
        assert!(!row.matches(&CartOptions::new().with("id", "A").with("size", "L")));
        assert!(!row.matches(&CartOptions::new().with("quantity", "2")));
        assert!(!row.matches(&CartOptions::new()));
    }

    #[test]
    fn test_row_serializes_camel_case() {
        let row = row(1, 100, 0);
        let json = serde_json::to_value(&row).unwrap();

        assert!(json.get("rowId").is_some());
        assert!(json.get("totalDiscount").is_some());
        assert!(json.get("addedAt").is_some());
    }

    #[test]
    fn test_patch_is_empty() {
        assert!(RowPatch::new().is_empty());
        assert!(!RowPatch::new().name("x").is_empty());
    }
}
