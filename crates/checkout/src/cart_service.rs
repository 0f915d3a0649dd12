//! Cart aggregator kept in sync with the cart store.

use common::CartItemId;
use domain::{Cart, CartChange, CartTotals, Money, PricingPolicy, ProductId};
use services::{CartStore, StoreError};

use crate::error::Result;

const CLEAR_ATTEMPTS: u32 = 2;

/// The buyer's cart, backed by a [`CartStore`].
///
/// Every mutation is planned against the local cart, written to the store,
/// and only then applied locally. A store failure leaves the local cart as
/// it was.
pub struct CartService<C: CartStore> {
    store: C,
    cart: Cart,
    /// Lines already turned into an order that the store failed to drop.
    ordered: Vec<CartItemId>,
}

impl<C: CartStore> CartService<C> {
    /// Loads the stored lines into a cart priced with `pricing`.
    pub async fn load(store: C, pricing: PricingPolicy) -> std::result::Result<Self, StoreError> {
        let items = store.get().await?;
        Ok(Self {
            store,
            cart: Cart::from_items(pricing, items),
            ordered: Vec::new(),
        })
    }

    /// Replaces the local lines with what the store currently holds.
    ///
    /// Lines that were already ordered never come back, even while the store
    /// still holds them.
    pub async fn reload(&mut self) -> std::result::Result<(), StoreError> {
        self.drop_ordered_lines().await;
        let mut items = self.store.get().await?;
        items.retain(|item| !self.ordered.contains(&item.id));
        self.cart = Cart::from_items(*self.cart.pricing(), items);
        Ok(())
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn totals(&self) -> CartTotals {
        self.cart.compute_totals()
    }

    /// Adds a product and returns the id of the line holding it.
    #[tracing::instrument(skip(self, product_id, product_name))]
    pub async fn add_item(
        &mut self,
        product_id: impl Into<ProductId>,
        product_name: impl Into<String>,
        unit_price: Money,
        quantity: u32,
    ) -> Result<CartItemId> {
        let line = self
            .cart
            .plan_add(product_id, product_name, unit_price, quantity)?;
        let item_id = line.id;
        self.commit("add", CartChange::ItemPut(line)).await?;
        Ok(item_id)
    }

    /// Sets a line's quantity; zero or less removes the line.
    #[tracing::instrument(skip(self))]
    pub async fn update_quantity(&mut self, item_id: CartItemId, quantity: i64) -> Result<()> {
        let change = self.cart.plan_update_quantity(item_id, quantity)?;
        self.commit("update", change).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn remove_item(&mut self, item_id: CartItemId) -> Result<()> {
        let change = self.cart.plan_remove(item_id)?;
        self.commit("remove", change).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn clear(&mut self) -> Result<()> {
        self.commit("clear", CartChange::Cleared).await
    }

    /// Empties the cart after its lines became an order.
    ///
    /// The order already exists at this point, so the local cart is cleared
    /// regardless of the store. If clearing keeps failing the lines are
    /// removed one by one, and any the store still holds are retried on
    /// every [`CartService::reload`].
    pub(crate) async fn clear_after_order(&mut self) {
        let mut last_error = None;
        for attempt in 1..=CLEAR_ATTEMPTS {
            match self.store.clear().await {
                Ok(()) => {
                    last_error = None;
                    break;
                }
                Err(e) => {
                    tracing::debug!(attempt, error = %e, "Cart store clear failed");
                    last_error = Some(e);
                }
            }
        }

        if let Some(e) = last_error {
            self.ordered.extend(self.cart.items().iter().map(|item| item.id));
            self.drop_ordered_lines().await;
            if !self.ordered.is_empty() {
                tracing::warn!(
                    error = %e,
                    stale_items = self.ordered.len(),
                    "Cart store still holds ordered lines; they are hidden from the cart \
                     and removal is retried on reload"
                );
            }
        }
        self.cart.apply(CartChange::Cleared);
    }

    /// Removes remembered ordered lines from the store, keeping the ones
    /// the store still refuses to drop.
    async fn drop_ordered_lines(&mut self) {
        let mut remaining = Vec::new();
        for item_id in std::mem::take(&mut self.ordered) {
            match self.store.remove(item_id).await {
                Ok(()) | Err(StoreError::CartItemNotFound(_)) => {}
                Err(e) => {
                    tracing::debug!(%item_id, error = %e, "Ordered cart line still stored");
                    remaining.push(item_id);
                }
            }
        }
        self.ordered = remaining;
    }

    async fn commit(&mut self, operation: &'static str, change: CartChange) -> Result<()> {
        match &change {
            CartChange::ItemPut(item) => self.store.put(item.clone()).await?,
            CartChange::ItemRemoved(item_id) => self.store.remove(*item_id).await?,
            CartChange::Cleared => self.store.clear().await?,
        }

        self.cart.apply(change);
        metrics::counter!("cart_mutations_total", "operation" => operation).increment(1);
        tracing::debug!(
            operation,
            items = self.cart.item_count(),
            "Cart updated"
        );
        Ok(())
    }
}
