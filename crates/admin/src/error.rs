//! Admin error types.

use domain::OrderError;
use services::StoreError;
use thiserror::Error;

/// Errors that can occur while applying admin actions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdminError {
    /// The action is not legal from the order's current status.
    #[error(transparent)]
    InvalidTransition(#[from] OrderError),

    /// The order store could not be read or updated.
    #[error("Persistence failure: {0}")]
    Persistence(#[from] StoreError),
}

/// Result type for admin operations.
pub type Result<T> = std::result::Result<T, AdminError>;
