//! Cart aggregator: line items and their price breakdown.
//!
//! Mutations follow the same two-phase shape as the order model: a
//! `plan_*` method validates against the current lines and returns the
//! change to make, and [`Cart::apply`] folds the change in. Callers that
//! persist the cart apply the change to their store first and only then to
//! the local cart. The plain `add_item` / `update_quantity` / `remove_item`
//! / `clear` methods do both steps at once for purely local use.

mod item;
mod pricing;

pub use item::CartItem;
pub use pricing::{
    CartTotals, DEFAULT_FLAT_SHIPPING, DEFAULT_FREE_SHIPPING_THRESHOLD, DEFAULT_TAX_RATE_BPS,
    PricingPolicy,
};

use common::CartItemId;
use thiserror::Error;

use crate::value_objects::{Money, ProductId};

/// Errors that can occur during cart operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    /// Added quantity must be at least one.
    #[error("Invalid quantity: {quantity} (must be greater than 0)")]
    InvalidQuantity { quantity: i64 },

    /// Unit price must be positive.
    #[error("Invalid price: {price} (must be greater than 0)")]
    InvalidPrice { price: i64 },

    /// No line with this id.
    #[error("Cart item not found: {item_id}")]
    ItemNotFound { item_id: CartItemId },

    /// A line total or the cart total would not fit in a [`Money`].
    #[error("Amount too large: {unit_price} x {quantity} does not fit in the cart total")]
    AmountTooLarge { unit_price: Money, quantity: u32 },
}

/// A single validated change to the cart's lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartChange {
    /// Insert the line, or replace the line with the same id.
    ItemPut(CartItem),

    /// Drop the line.
    ItemRemoved(CartItemId),

    /// Drop every line.
    Cleared,
}

/// The buyer's active cart.
#[derive(Debug, Clone, Default)]
pub struct Cart {
    items: Vec<CartItem>,
    pricing: PricingPolicy,
}

impl Cart {
    /// Creates an empty cart priced with the given policy.
    pub fn new(pricing: PricingPolicy) -> Self {
        Self {
            items: Vec::new(),
            pricing,
        }
    }

    /// Rebuilds a cart from stored lines.
    pub fn from_items(pricing: PricingPolicy, items: Vec<CartItem>) -> Self {
        Self { items, pricing }
    }

    /// Returns the lines in insertion order.
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn get_item(&self, item_id: CartItemId) -> Option<&CartItem> {
        self.items.iter().find(|item| item.id == item_id)
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Sum of quantities across all lines, saturating at `u32::MAX`.
    pub fn total_quantity(&self) -> u32 {
        self.items
            .iter()
            .fold(0u32, |sum, item| sum.saturating_add(item.quantity))
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn pricing(&self) -> &PricingPolicy {
        &self.pricing
    }

    /// Returns subtotal, shipping, tax and total.
    pub fn compute_totals(&self) -> CartTotals {
        if self.items.is_empty() {
            return CartTotals::zero();
        }
        let subtotal: Money = self.items.iter().map(CartItem::line_total).sum();
        self.pricing.totals_for(subtotal)
    }
}

// Planning methods (validate, return the change)
impl Cart {
    /// Plans adding `quantity` units of a product and returns the line as it
    /// will look afterwards. Apply it as [`CartChange::ItemPut`].
    ///
    /// If the product already has a line, the quantities are summed and the
    /// line keeps the price it was first added at.
    pub fn plan_add(
        &self,
        product_id: impl Into<ProductId>,
        product_name: impl Into<String>,
        unit_price: Money,
        quantity: u32,
    ) -> Result<CartItem, CartError> {
        if quantity == 0 {
            return Err(CartError::InvalidQuantity { quantity: 0 });
        }

        if !unit_price.is_positive() {
            return Err(CartError::InvalidPrice {
                price: unit_price.cents(),
            });
        }

        let product_id = product_id.into();
        if let Some(existing) = self
            .items
            .iter()
            .find(|item| item.product_id == product_id)
        {
            let merged = existing.quantity.checked_add(quantity).ok_or(
                CartError::InvalidQuantity {
                    quantity: i64::from(existing.quantity) + i64::from(quantity),
                },
            )?;
            let line = CartItem {
                quantity: merged,
                ..existing.clone()
            };
            self.ensure_fits(&line)?;
            return Ok(line);
        }

        let line = CartItem::new(product_id, product_name, unit_price, quantity);
        self.ensure_fits(&line)?;
        Ok(line)
    }

    /// Plans setting a line's quantity. Zero or less removes the line.
    pub fn plan_update_quantity(
        &self,
        item_id: CartItemId,
        quantity: i64,
    ) -> Result<CartChange, CartError> {
        let existing = self
            .get_item(item_id)
            .ok_or(CartError::ItemNotFound { item_id })?;

        if quantity <= 0 {
            return Ok(CartChange::ItemRemoved(item_id));
        }

        let quantity =
            u32::try_from(quantity).map_err(|_| CartError::InvalidQuantity { quantity })?;

        let line = CartItem {
            quantity,
            ..existing.clone()
        };
        self.ensure_fits(&line)?;
        Ok(CartChange::ItemPut(line))
    }

    /// Checks that the cart with `line` put in place of its current version
    /// still has a representable quantity sum and totals.
    fn ensure_fits(&self, line: &CartItem) -> Result<(), CartError> {
        let too_large = || CartError::AmountTooLarge {
            unit_price: line.unit_price,
            quantity: line.quantity,
        };
        let lines = self
            .items
            .iter()
            .filter(|item| item.id != line.id)
            .chain(std::iter::once(line));

        let mut subtotal = Money::zero();
        let mut quantity: u32 = 0;
        for item in lines {
            let line_total = item
                .unit_price
                .checked_multiply(item.quantity)
                .ok_or_else(too_large)?;
            subtotal = subtotal.checked_add(line_total).ok_or_else(too_large)?;
            quantity = quantity
                .checked_add(item.quantity)
                .ok_or(CartError::InvalidQuantity {
                    quantity: i64::from(quantity) + i64::from(item.quantity),
                })?;
        }

        self.pricing
            .checked_totals_for(subtotal)
            .map(|_| ())
            .ok_or_else(too_large)
    }

    /// Plans removing a line.
    pub fn plan_remove(&self, item_id: CartItemId) -> Result<CartChange, CartError> {
        if self.get_item(item_id).is_none() {
            return Err(CartError::ItemNotFound { item_id });
        }
        Ok(CartChange::ItemRemoved(item_id))
    }

    /// Applies a change produced by one of the `plan_*` methods.
    pub fn apply(&mut self, change: CartChange) {
        match change {
            CartChange::ItemPut(item) => {
                match self.items.iter_mut().find(|line| line.id == item.id) {
                    Some(line) => *line = item,
                    None => self.items.push(item),
                }
            }
            CartChange::ItemRemoved(item_id) => {
                self.items.retain(|line| line.id != item_id);
            }
            CartChange::Cleared => self.items.clear(),
        }
    }
}

// Local mutations (plan + apply)
impl Cart {
    /// Adds a product and returns the id of the line holding it.
    pub fn add_item(
        &mut self,
        product_id: impl Into<ProductId>,
        product_name: impl Into<String>,
        unit_price: Money,
        quantity: u32,
    ) -> Result<CartItemId, CartError> {
        let item = self.plan_add(product_id, product_name, unit_price, quantity)?;
        let item_id = item.id;
        self.apply(CartChange::ItemPut(item));
        Ok(item_id)
    }

    /// Sets a line's quantity; zero or less removes it.
    pub fn update_quantity(&mut self, item_id: CartItemId, quantity: i64) -> Result<(), CartError> {
        let change = self.plan_update_quantity(item_id, quantity)?;
        self.apply(change);
        Ok(())
    }

    /// Removes a line and returns it.
    pub fn remove_item(&mut self, item_id: CartItemId) -> Result<CartItem, CartError> {
        let removed = self
            .get_item(item_id)
            .cloned()
            .ok_or(CartError::ItemNotFound { item_id })?;
        self.apply(CartChange::ItemRemoved(item_id));
        Ok(removed)
    }

    pub fn clear(&mut self) {
        self.apply(CartChange::Cleared);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cart() -> Cart {
        Cart::new(PricingPolicy::default())
    }

    #[test]
    fn test_empty_cart_totals_are_zero() {
        let cart = cart();
        assert!(cart.is_empty());
        assert_eq!(cart.compute_totals(), CartTotals::zero());
    }

    #[test]
    fn test_reference_scenario() {
        let mut cart = cart();
        cart.add_item("SKU-EBOOK", "E-book", Money::from_cents(4999), 1)
            .unwrap();
        cart.add_item("SKU-COURSE", "Course", Money::from_cents(2999), 2)
            .unwrap();

        let totals = cart.compute_totals();
        assert_eq!(totals.subtotal.cents(), 10997);
        assert_eq!(totals.shipping.cents(), 0);
        assert_eq!(totals.tax.cents(), 1100);
        assert_eq!(totals.total.cents(), 12097);
    }

    #[test]
    fn test_totals_invariant_holds_across_subtotals() {
        for cents in [1, 99, 4_999, 5_000, 5_001, 12_345, 99_999] {
            let mut cart = cart();
            cart.add_item("SKU", "Thing", Money::from_cents(cents), 1)
                .unwrap();
            let totals = cart.compute_totals();

            assert_eq!(totals.total, totals.subtotal + totals.shipping + totals.tax);
            assert_eq!(totals.shipping.is_zero(), cents > 5_000);
            assert_eq!(totals.tax, Money::from_cents(cents).apply_rate_bps(1_000));
        }
    }

    #[test]
    fn test_add_same_product_merges_lines() {
        let mut cart = cart();
        let first = cart
            .add_item("SKU-001", "Widget", Money::from_cents(1000), 2)
            .unwrap();
        let second = cart
            .add_item("SKU-001", "Widget", Money::from_cents(1500), 3)
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(cart.item_count(), 1);
        assert_eq!(cart.total_quantity(), 5);
        // keeps the add-time price of the first add
        assert_eq!(cart.items()[0].unit_price.cents(), 1000);
    }

    #[test]
    fn test_add_zero_quantity_fails() {
        let mut cart = cart();
        let result = cart.add_item("SKU-001", "Widget", Money::from_cents(1000), 0);
        assert_eq!(result, Err(CartError::InvalidQuantity { quantity: 0 }));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_add_non_positive_price_fails() {
        let mut cart = cart();
        let result = cart.add_item("SKU-001", "Widget", Money::zero(), 1);
        assert_eq!(result, Err(CartError::InvalidPrice { price: 0 }));
    }

    #[test]
    fn test_update_quantity() {
        let mut cart = cart();
        let id = cart
            .add_item("SKU-001", "Widget", Money::from_cents(1000), 1)
            .unwrap();

        cart.update_quantity(id, 4).unwrap();
        assert_eq!(cart.get_item(id).unwrap().quantity, 4);
        assert_eq!(cart.compute_totals().subtotal.cents(), 4000);
    }

    #[test]
    fn test_update_to_zero_or_negative_removes() {
        let mut cart = cart();
        let a = cart
            .add_item("SKU-A", "A", Money::from_cents(1000), 1)
            .unwrap();
        let b = cart
            .add_item("SKU-B", "B", Money::from_cents(1000), 1)
            .unwrap();

        cart.update_quantity(a, 0).unwrap();
        cart.update_quantity(b, -3).unwrap();
        assert!(cart.is_empty());
    }

    #[test]
    fn test_update_unknown_item_fails() {
        let mut cart = cart();
        let item_id = CartItemId::new();
        assert_eq!(
            cart.update_quantity(item_id, 2),
            Err(CartError::ItemNotFound { item_id })
        );
        assert_eq!(
            cart.update_quantity(item_id, 0),
            Err(CartError::ItemNotFound { item_id })
        );
    }

    #[test]
    fn test_remove_and_clear() {
        let mut cart = cart();
        let a = cart
            .add_item("SKU-A", "A", Money::from_cents(1000), 1)
            .unwrap();
        cart.add_item("SKU-B", "B", Money::from_cents(2000), 1)
            .unwrap();

        let removed = cart.remove_item(a).unwrap();
        assert_eq!(removed.product_id.as_str(), "SKU-A");
        assert_eq!(cart.item_count(), 1);
        assert!(cart.remove_item(a).is_err());

        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.compute_totals(), CartTotals::zero());
    }

    #[test]
    fn test_plan_does_not_mutate() {
        let cart = cart();
        let line = cart
            .plan_add("SKU-001", "Widget", Money::from_cents(1000), 1)
            .unwrap();
        assert_eq!(line.quantity, 1);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_line_total_overflow_is_rejected() {
        let mut cart = cart();
        let price = Money::from_cents(i64::MAX / 2 + 1);

        let result = cart.add_item("SKU-BIG", "Big", price, 2);
        assert_eq!(
            result,
            Err(CartError::AmountTooLarge {
                unit_price: price,
                quantity: 2
            })
        );
        assert!(cart.is_empty());
        assert_eq!(cart.compute_totals(), CartTotals::zero());
    }

    #[test]
    fn test_subtotal_overflow_across_lines_is_rejected() {
        let mut cart = cart();
        let price = Money::from_cents(i64::MAX / 2 + 1);
        cart.add_item("SKU-A", "A", price, 1).unwrap();

        let result = cart.add_item("SKU-B", "B", price, 1);
        assert!(matches!(result, Err(CartError::AmountTooLarge { .. })));
        assert_eq!(cart.item_count(), 1);
    }

    #[test]
    fn test_update_quantity_overflow_is_rejected() {
        let mut cart = cart();
        let id = cart
            .add_item("SKU-A", "A", Money::from_cents(i64::MAX / 4), 1)
            .unwrap();

        let result = cart.update_quantity(id, 8);
        assert!(matches!(result, Err(CartError::AmountTooLarge { .. })));
        assert_eq!(cart.get_item(id).unwrap().quantity, 1);
    }

    #[test]
    fn test_quantity_sum_overflow_is_rejected() {
        let mut cart = cart();
        cart.add_item("SKU-A", "A", Money::from_cents(1), u32::MAX)
            .unwrap();

        let result = cart.add_item("SKU-B", "B", Money::from_cents(1), 1);
        assert!(matches!(result, Err(CartError::InvalidQuantity { .. })));
        assert_eq!(cart.total_quantity(), u32::MAX);
    }

    #[test]
    fn test_lines_keep_insertion_order() {
        let mut cart = cart();
        for sku in ["C", "A", "B"] {
            cart.add_item(sku, sku, Money::from_cents(100), 1).unwrap();
        }
        let skus: Vec<_> = cart.items().iter().map(|i| i.product_id.as_str()).collect();
        assert_eq!(skus, vec!["C", "A", "B"]);
    }
}
