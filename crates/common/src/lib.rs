//! Shared types for the storefront order engine.

mod types;

pub use types::{CartItemId, CustomerId, OrderId};
