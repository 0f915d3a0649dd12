//! Shared application state.

use std::sync::Arc;

use admin::{FilteredOrdersView, OrderDesk};
use checkout::{CartService, CheckoutWorkflow};
use common::CustomerId;
use domain::{Address, PricingPolicy};
use services::{
    CurrentUser, InMemoryCartStore, InMemoryOrderStore, StaticSessionProvider,
    TracingNotificationSink,
};
use tokio::sync::Mutex;

use crate::error::ApiError;

pub type Checkout = CheckoutWorkflow<InMemoryOrderStore, TracingNotificationSink>;
pub type Desk = OrderDesk<InMemoryOrderStore, TracingNotificationSink>;

/// The buyer-side state of the single session this server hosts.
pub struct Session {
    pub cart: CartService<InMemoryCartStore>,
    pub checkout: Option<Checkout>,
}

/// Shared application state accessible from all handlers.
///
/// Lock order is `session` before `desk` before `view`.
pub struct AppState {
    pub session: Mutex<Session>,
    pub desk: Mutex<Desk>,
    pub view: Mutex<FilteredOrdersView>,
    pub orders: InMemoryOrderStore,
    pub session_provider: StaticSessionProvider,
    pub notifier: TracingNotificationSink,
}

/// The collaborators the state is built from.
#[derive(Clone)]
pub struct Backends {
    pub orders: InMemoryOrderStore,
    pub carts: InMemoryCartStore,
    pub session_provider: StaticSessionProvider,
}

impl Backends {
    /// Empty stores and a demo buyer with a default address on file.
    pub fn demo() -> Self {
        Self {
            orders: InMemoryOrderStore::new(),
            carts: InMemoryCartStore::new(),
            session_provider: StaticSessionProvider::new(CurrentUser {
                id: CustomerId::new(),
                name: "Demo Buyer".to_string(),
                email: "buyer@example.com".to_string(),
                default_address: Some(Address::new(
                    "500 Market St",
                    "San Francisco",
                    "CA",
                    "94105",
                    "US",
                )),
            }),
        }
    }
}

/// Loads the cart and the order desk and assembles the shared state.
pub async fn create_state(
    pricing: PricingPolicy,
    backends: Backends,
) -> Result<Arc<AppState>, ApiError> {
    let notifier = TracingNotificationSink;
    let cart = CartService::load(backends.carts, pricing).await?;
    let desk = OrderDesk::load(backends.orders.clone(), notifier).await?;

    Ok(Arc::new(AppState {
        session: Mutex::new(Session {
            cart,
            checkout: None,
        }),
        desk: Mutex::new(desk),
        view: Mutex::new(FilteredOrdersView::new()),
        orders: backends.orders,
        session_provider: backends.session_provider,
        notifier,
    }))
}
