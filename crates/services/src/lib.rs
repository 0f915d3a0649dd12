//! Collaborators the checkout and admin flows depend on.
//!
//! Each collaborator is an `async_trait` so that the flows can be driven
//! against the in-memory implementations here in tests and in the demo
//! server, and against real backends elsewhere.

pub mod cart_store;
pub mod error;
pub mod notify;
pub mod order_store;
pub mod session;

pub use cart_store::{CartStore, InMemoryCartStore};
pub use error::{Result, StoreError};
pub use notify::{
    Notification, NotificationSink, RecordingNotificationSink, Severity, TracingNotificationSink,
};
pub use order_store::{InMemoryOrderStore, OrderStore};
pub use session::{CurrentUser, SessionProvider, StaticSessionProvider};
