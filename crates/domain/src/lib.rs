//! Domain layer for the storefront order engine.
//!
//! This crate holds the pure rules, with no I/O:
//! - Cart aggregation and pricing (subtotal, shipping, tax, total)
//! - Addresses and payment selection with their validation
//! - Placed orders and the action-driven status state machine

pub mod cart;
pub mod error;
pub mod order;
pub mod payment;
pub mod value_objects;

pub use cart::{Cart, CartChange, CartError, CartItem, CartTotals, PricingPolicy};
pub use error::{FormSection, ParseError, RequiredField, ValidationError};
pub use order::{
    CustomerInfo, Order, OrderAction, OrderDraft, OrderError, OrderLine, OrderPatch, OrderRef,
    OrderStatus, TRACKING_PREFIX, TrackingNumber,
};
pub use payment::{CardDetails, PaymentMethod, PaymentSelection, PaymentStatus};
pub use value_objects::{Address, Money, ProductId};
