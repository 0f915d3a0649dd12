//! Checkout error types.

use domain::{CartError, ValidationError};
use services::StoreError;
use thiserror::Error;

use crate::step::CheckoutStep;

/// Errors that can occur during cart and checkout operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckoutError {
    /// Entered data blocks the step from advancing.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// The cart rejected the mutation.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// A collaborator call failed.
    #[error("Persistence failure: {0}")]
    Persistence(#[from] StoreError),

    /// The order for this checkout has already been created.
    #[error("Checkout has already been submitted")]
    AlreadySubmitted,

    /// The operation is not available from the current step.
    #[error("Cannot {operation} from the {step} step")]
    InvalidStep {
        operation: &'static str,
        step: CheckoutStep,
    },
}

/// Convenience type alias for checkout results.
pub type Result<T> = std::result::Result<T, CheckoutError>;
