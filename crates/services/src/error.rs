use common::{CartItemId, OrderId};
use thiserror::Error;

/// Errors returned by the order and cart stores.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The order does not exist in the store.
    #[error("Order not found: {0}")]
    OrderNotFound(OrderId),

    /// The cart line does not exist in the store.
    #[error("Cart item not found: {0}")]
    CartItemNotFound(CartItemId),

    /// The backing store could not complete the call.
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Returns true for the not-found variants.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StoreError::OrderNotFound(_) | StoreError::CartItemNotFound(_)
        )
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
