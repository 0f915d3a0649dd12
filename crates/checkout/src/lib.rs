//! Cart handling and the checkout workflow.
//!
//! [`CartService`] keeps the buyer's cart in sync with its store.
//! [`CheckoutWorkflow`] walks the buyer through three steps:
//! 1. Shipping address
//! 2. Payment method and billing address
//! 3. Review and submit
//!
//! Submitting creates exactly one order. A failed create leaves the cart and
//! everything entered untouched so the buyer can retry.

pub mod cart_service;
pub mod error;
pub mod step;
pub mod workflow;

pub use cart_service::CartService;
pub use error::{CheckoutError, Result};
pub use step::CheckoutStep;
pub use workflow::{BillingAddress, CheckoutWorkflow, OrderConfirmation};
