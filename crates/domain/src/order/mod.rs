//! Placed orders and the admin status state machine.

mod action;
mod aggregate;
mod state;
mod tracking;

pub use action::OrderAction;
pub use aggregate::{CustomerInfo, Order, OrderDraft, OrderLine, OrderPatch, OrderRef};
pub use state::OrderStatus;
pub use tracking::{TRACKING_PREFIX, TrackingNumber};

use thiserror::Error;

/// Errors that can occur during order operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
    /// The transition table does not allow this action from the current status.
    #[error("Invalid state transition: cannot {action} an order that is {current_status}")]
    InvalidTransition {
        action: OrderAction,
        current_status: OrderStatus,
    },
}
