//! Checkout wizard steps.

use serde::{Deserialize, Serialize};

/// The step a checkout session is on.
///
/// ```text
/// Shipping ──► Payment ──► Review ──► Completed
///    ▲            │           │
///    └────────────┴───────────┘  (back / go_to)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CheckoutStep {
    /// Entering the shipping address.
    #[default]
    Shipping,

    /// Choosing a payment method and billing address.
    Payment,

    /// Confirming the order before submit.
    Review,

    /// The order has been created (terminal state).
    Completed,
}

impl CheckoutStep {
    /// Returns the step before this one, if navigation back is possible.
    pub fn previous(&self) -> Option<CheckoutStep> {
        match self {
            CheckoutStep::Payment => Some(CheckoutStep::Shipping),
            CheckoutStep::Review => Some(CheckoutStep::Payment),
            CheckoutStep::Shipping | CheckoutStep::Completed => None,
        }
    }

    /// Returns true if `target` is an earlier step this one can jump back to.
    pub fn can_go_to(&self, target: CheckoutStep) -> bool {
        !self.is_terminal() && target < *self
    }

    /// Returns true if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, CheckoutStep::Completed)
    }

    /// Returns the step name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckoutStep::Shipping => "shipping",
            CheckoutStep::Payment => "payment",
            CheckoutStep::Review => "review",
            CheckoutStep::Completed => "completed",
        }
    }
}

impl std::fmt::Display for CheckoutStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_step_is_shipping() {
        assert_eq!(CheckoutStep::default(), CheckoutStep::Shipping);
    }

    #[test]
    fn test_previous() {
        assert_eq!(CheckoutStep::Shipping.previous(), None);
        assert_eq!(
            CheckoutStep::Payment.previous(),
            Some(CheckoutStep::Shipping)
        );
        assert_eq!(CheckoutStep::Review.previous(), Some(CheckoutStep::Payment));
        assert_eq!(CheckoutStep::Completed.previous(), None);
    }

    #[test]
    fn test_can_go_to_only_backwards() {
        assert!(CheckoutStep::Review.can_go_to(CheckoutStep::Shipping));
        assert!(CheckoutStep::Review.can_go_to(CheckoutStep::Payment));
        assert!(!CheckoutStep::Review.can_go_to(CheckoutStep::Review));
        assert!(!CheckoutStep::Shipping.can_go_to(CheckoutStep::Payment));
        assert!(!CheckoutStep::Completed.can_go_to(CheckoutStep::Shipping));
    }

    #[test]
    fn test_serialization() {
        let json = serde_json::to_string(&CheckoutStep::Review).unwrap();
        assert_eq!(json, "\"review\"");
    }
}
