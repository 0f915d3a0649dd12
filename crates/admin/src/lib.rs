//! Admin side of the storefront: the order desk and order filtering.
//!
//! - [`OrderDesk`] owns the order collection and applies status actions
//! - [`filter_orders`] is the pure search/status/payment predicate
//! - [`FilteredOrdersView`] memoises filter results for the order table
//! - [`ReadModel`] is the common query interface of the desk and the view

pub mod desk;
pub mod error;
pub mod filter;
pub mod read_model;
pub mod view;

pub use desk::OrderDesk;
pub use error::{AdminError, Result};
pub use filter::{Filter, OrderFilter, PaymentFilter, StatusFilter, filter_orders};
pub use read_model::ReadModel;
pub use view::FilteredOrdersView;
