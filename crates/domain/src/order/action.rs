//! Admin actions and the transition table that governs them.

use serde::{Deserialize, Serialize};

use crate::error::ParseError;

use super::OrderStatus;

/// A named admin action on a placed order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderAction {
    Process,
    Ship,
    Deliver,
    Cancel,
    Refund,
}

impl OrderAction {
    pub const ALL: [OrderAction; 5] = [
        OrderAction::Process,
        OrderAction::Ship,
        OrderAction::Deliver,
        OrderAction::Cancel,
        OrderAction::Refund,
    ];

    /// Status an order ends up in after this action, or `None` if the
    /// action is not allowed from `current`.
    ///
    /// | action  | from                | to         |
    /// |---------|---------------------|------------|
    /// | process | pending             | processing |
    /// | ship    | processing          | shipped    |
    /// | deliver | shipped             | delivered  |
    /// | cancel  | any non-terminal    | cancelled  |
    /// | refund  | any                 | unchanged  |
    pub fn target_status(&self, current: OrderStatus) -> Option<OrderStatus> {
        match (self, current) {
            (OrderAction::Process, OrderStatus::Pending) => Some(OrderStatus::Processing),
            (OrderAction::Ship, OrderStatus::Processing) => Some(OrderStatus::Shipped),
            (OrderAction::Deliver, OrderStatus::Shipped) => Some(OrderStatus::Delivered),
            (OrderAction::Cancel, status) if !status.is_terminal() => Some(OrderStatus::Cancelled),
            (OrderAction::Refund, status) => Some(status),
            _ => None,
        }
    }

    /// Returns true if the action is legal from `current`.
    pub fn is_allowed_from(&self, current: OrderStatus) -> bool {
        self.target_status(current).is_some()
    }

    /// All actions legal from `current`, in table order.
    pub fn available_from(current: OrderStatus) -> Vec<OrderAction> {
        Self::ALL
            .into_iter()
            .filter(|action| action.is_allowed_from(current))
            .collect()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderAction::Process => "process",
            OrderAction::Ship => "ship",
            OrderAction::Deliver => "deliver",
            OrderAction::Cancel => "cancel",
            OrderAction::Refund => "refund",
        }
    }
}

impl std::fmt::Display for OrderAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderAction {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|action| action.as_str() == s)
            .ok_or_else(|| ParseError::new("order action", s))
    }
}
