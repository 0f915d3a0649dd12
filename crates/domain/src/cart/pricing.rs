//! Shipping and tax rules applied to a cart subtotal.

use serde::{Deserialize, Serialize};

use crate::value_objects::Money;

/// Flat shipping rate charged at or below the free-shipping threshold.
pub const DEFAULT_FLAT_SHIPPING: Money = Money::from_cents(999);

/// Subtotals strictly above this ship for free.
pub const DEFAULT_FREE_SHIPPING_THRESHOLD: Money = Money::from_cents(5_000);

/// 10% expressed in basis points.
pub const DEFAULT_TAX_RATE_BPS: u32 = 1_000;

/// Pricing constants for the cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingPolicy {
    pub flat_shipping: Money,
    pub free_shipping_threshold: Money,
    pub tax_rate_bps: u32,
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self {
            flat_shipping: DEFAULT_FLAT_SHIPPING,
            free_shipping_threshold: DEFAULT_FREE_SHIPPING_THRESHOLD,
            tax_rate_bps: DEFAULT_TAX_RATE_BPS,
        }
    }
}

impl PricingPolicy {
    /// Shipping for a subtotal: free above the threshold, flat otherwise.
    ///
    /// An empty cart (zero subtotal) ships nothing and costs nothing.
    pub fn shipping_for(&self, subtotal: Money) -> Money {
        if subtotal.is_zero() || subtotal > self.free_shipping_threshold {
            Money::zero()
        } else {
            self.flat_shipping
        }
    }

    /// Tax on the subtotal, rounded to the cent.
    pub fn tax_for(&self, subtotal: Money) -> Money {
        subtotal.apply_rate_bps(self.tax_rate_bps)
    }

    /// Full breakdown for a subtotal, or `None` if the tax or the total
    /// does not fit in a [`Money`].
    pub fn checked_totals_for(&self, subtotal: Money) -> Option<CartTotals> {
        let shipping = self.shipping_for(subtotal);
        let tax = subtotal.checked_apply_rate_bps(self.tax_rate_bps)?;
        let total = subtotal.checked_add(shipping)?.checked_add(tax)?;
        Some(CartTotals {
            subtotal,
            shipping,
            tax,
            total,
        })
    }

    /// Full breakdown for a subtotal.
    pub fn totals_for(&self, subtotal: Money) -> CartTotals {
        let shipping = self.shipping_for(subtotal);
        let tax = self.tax_for(subtotal);
        CartTotals {
            subtotal,
            shipping,
            tax,
            total: subtotal + shipping + tax,
        }
    }
}

/// Price breakdown of a cart. `total` is always the sum of the other three.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartTotals {
    pub subtotal: Money,
    pub shipping: Money,
    pub tax: Money,
    pub total: Money,
}

impl CartTotals {
    /// All-zero totals, as produced by an empty cart.
    pub fn zero() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_rate_at_or_below_threshold() {
        let policy = PricingPolicy::default();
        assert_eq!(policy.shipping_for(Money::from_cents(1)), DEFAULT_FLAT_SHIPPING);
        assert_eq!(
            policy.shipping_for(Money::from_cents(5_000)),
            DEFAULT_FLAT_SHIPPING
        );
    }

    #[test]
    fn test_free_shipping_strictly_above_threshold() {
        let policy = PricingPolicy::default();
        assert_eq!(policy.shipping_for(Money::from_cents(5_001)), Money::zero());
    }

    #[test]
    fn test_zero_subtotal_has_zero_totals() {
        assert_eq!(
            PricingPolicy::default().totals_for(Money::zero()),
            CartTotals::zero()
        );
    }

    #[test]
    fn test_small_order_breakdown() {
        // 20.00 + 9.99 shipping + 2.00 tax
        let totals = PricingPolicy::default().totals_for(Money::from_cents(2_000));
        assert_eq!(totals.shipping.cents(), 999);
        assert_eq!(totals.tax.cents(), 200);
        assert_eq!(totals.total.cents(), 3_199);
    }

    #[test]
    fn test_custom_policy() {
        let policy = PricingPolicy {
            flat_shipping: Money::from_cents(500),
            free_shipping_threshold: Money::from_dollars(100),
            tax_rate_bps: 825,
        };
        let totals = policy.totals_for(Money::from_dollars(80));
        assert_eq!(totals.shipping.cents(), 500);
        assert_eq!(totals.tax.cents(), 660);
        assert_eq!(totals.total.cents(), 8_000 + 500 + 660);
    }

    #[test]
    fn test_checked_totals() {
        let policy = PricingPolicy::default();
        assert_eq!(
            policy.checked_totals_for(Money::from_cents(2_000)),
            Some(policy.totals_for(Money::from_cents(2_000)))
        );
        // tax pushes the total past the representable range
        assert_eq!(
            policy.checked_totals_for(Money::from_cents(i64::MAX - 10)),
            None
        );
    }
}
