//! # Cart Aggregate
//!
//! The value stored under a session key: an ordered row collection plus the
//! last computed aggregates.
//!
//! ## Aggregates
//! ```text
//! total           = Σ row.total
//! discount        = Σ row.total_discount
//! subtotal        = Σ row.subtotal − custom_discount
//! custom_discount = manual cart-level reduction
//! ```
//!
//! Aggregates are only written when there is at least one row. On an empty
//! cart the recompute methods report `false` and leave the values alone.
//! Sums that leave the `i64` cent range are an error, not a wrapped value.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CartError, CartResult};
use crate::item::NewRow;
use crate::money::Money;
use crate::options::CartOptions;
use crate::row::CartRow;
use crate::row_id::RowId;

/// One cart instance's contents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Cart {
    #[serde(default)]
    pub rows: Vec<CartRow>,
    #[serde(default)]
    pub total: Money,
    #[serde(default)]
    pub subtotal: Money,
    #[serde(default)]
    pub discount: Money,
    #[serde(default)]
    pub custom_discount: Money,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of distinct rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn get(&self, row_id: &RowId) -> Option<&CartRow> {
        self.rows.iter().find(|r| &r.row_id == row_id)
    }

    pub fn get_mut(&mut self, row_id: &RowId) -> Option<&mut CartRow> {
        self.rows.iter_mut().find(|r| &r.row_id == row_id)
    }

    pub fn contains(&self, row_id: &RowId) -> bool {
        self.get(row_id).is_some()
    }

    /// Adds a validated item.
    ///
    /// If a row with the same identity exists, only its quantity grows;
    /// price and other attributes from the new item are ignored.
    ///
    /// ## Returns
    /// The row id and whether an existing row was merged into.
    ///
    /// A merged quantity or line amount that overflows is rejected and the
    /// existing row is left as it was.
    pub fn add(
        &mut self,
        new: NewRow,
        associated_model: Option<String>,
    ) -> CartResult<(RowId, bool)> {
        let row_id = RowId::generate(&new.id, &new.options);

        if let Some(existing) = self.get_mut(&row_id) {
            let quantity = existing.quantity.checked_add(new.quantity).ok_or_else(|| {
                CartError::InvalidQuantity {
                    value: format!("{} + {}", existing.quantity, new.quantity),
                }
            })?;
            let mut merged = existing.clone();
            merged.set_quantity(quantity)?;
            *existing = merged;
            return Ok((row_id, true));
        }

        let row = CartRow::from_new(row_id.clone(), new, associated_model)?;
        self.rows.push(row);
        Ok((row_id, false))
    }

    /// Removes a row, keeping the order of the rest.
    pub fn remove(&mut self, row_id: &RowId) -> Option<CartRow> {
        let index = self.rows.iter().position(|r| &r.row_id == row_id)?;
        Some(self.rows.remove(index))
    }

    /// Sum of quantities, or the number of rows when `count_rows` is set.
    ///
    /// The sum saturates at `i64::MAX`.
    pub fn quantity(&self, count_rows: bool) -> i64 {
        if count_rows {
            self.rows.len() as i64
        } else {
            self.rows
                .iter()
                .fold(0i64, |sum, r| sum.saturating_add(r.quantity))
        }
    }

    /// Row ids of every row matching all criteria, in insertion order.
    pub fn search(&self, criteria: &CartOptions) -> Vec<RowId> {
        self.rows
            .iter()
            .filter(|r| r.matches(criteria))
            .map(|r| r.row_id.clone())
            .collect()
    }

    pub fn recompute_total(&mut self) -> CartResult<bool> {
        if self.is_empty() {
            return Ok(false);
        }
        self.total = self.sum_rows(|r| r.total)?;
        Ok(true)
    }

    pub fn recompute_subtotal(&mut self) -> CartResult<bool> {
        if self.is_empty() {
            return Ok(false);
        }
        let rows = self.sum_rows(|r| r.subtotal)?;
        self.subtotal = rows
            .checked_sub(self.custom_discount)
            .ok_or_else(|| self.overflow())?;
        Ok(true)
    }

    pub fn recompute_discount(&mut self) -> CartResult<bool> {
        if self.is_empty() {
            return Ok(false);
        }
        self.discount = self.sum_rows(|r| r.total_discount)?;
        Ok(true)
    }

    /// Refreshes all three aggregates.
    pub fn recalculate(&mut self) -> CartResult<bool> {
        let total = self.recompute_total()?;
        let subtotal = self.recompute_subtotal()?;
        let discount = self.recompute_discount()?;
        Ok(total && subtotal && discount)
    }

    /// Sets the cart-level discount and refreshes the subtotal.
    ///
    /// Refused on an empty cart.
    pub fn set_custom_discount(&mut self, amount: Money) -> CartResult<bool> {
        if self.is_empty() {
            return Ok(false);
        }
        let previous = self.custom_discount;
        self.custom_discount = amount;
        if let Err(err) = self.recompute_subtotal() {
            self.custom_discount = previous;
            return Err(err);
        }
        Ok(true)
    }

    fn sum_rows(&self, amount: impl Fn(&CartRow) -> Money) -> CartResult<Money> {
        Money::checked_sum(self.rows.iter().map(amount)).ok_or_else(|| self.overflow())
    }

    fn overflow(&self) -> CartError {
        CartError::amount_overflow(self.quantity(false))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
