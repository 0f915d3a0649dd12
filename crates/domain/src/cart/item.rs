//! Cart line item.

use common::CartItemId;
use serde::{Deserialize, Serialize};

use crate::value_objects::{Money, ProductId};

/// A product pending checkout, priced at the moment it was added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    /// Line identifier.
    pub id: CartItemId,

    /// The product identifier.
    pub product_id: ProductId,

    /// Human-readable product name.
    pub product_name: String,

    /// Price per unit at add time.
    pub unit_price: Money,

    /// Quantity, always at least one.
    pub quantity: u32,
}

impl CartItem {
    /// Creates a new line with a fresh identifier.
    pub fn new(
        product_id: impl Into<ProductId>,
        product_name: impl Into<String>,
        unit_price: Money,
        quantity: u32,
    ) -> Self {
        Self {
            id: CartItemId::new(),
            product_id: product_id.into(),
            product_name: product_name.into(),
            unit_price,
            quantity,
        }
    }

    /// Returns the total price for this line (quantity * unit_price).
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply(self.quantity)
    }
}
