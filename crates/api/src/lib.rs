//! HTTP API server with observability for the storefront.
//!
//! Provides REST endpoints for the buyer's cart and checkout wizard and for
//! the admin order desk, with structured logging (tracing) and Prometheus
//! metrics.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use std::sync::Arc;

use axum::Router;
use axum::routing::{delete, get, patch, post, put};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use config::Config;
pub use error::ApiError;
pub use state::{AppState, Backends, create_state};

/// Creates the Axum application router with all routes and shared state.
pub fn create_app(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/cart", get(routes::cart::get))
        .route("/cart", delete(routes::cart::clear))
        .route("/cart/items", post(routes::cart::add_item))
        .route("/cart/items/{id}", patch(routes::cart::update_item))
        .route("/cart/items/{id}", delete(routes::cart::remove_item))
        .route("/checkout", post(routes::checkout::start))
        .route("/checkout", get(routes::checkout::get))
        .route("/checkout/shipping", put(routes::checkout::set_shipping))
        .route("/checkout/payment", put(routes::checkout::set_payment))
        .route("/checkout/back", post(routes::checkout::back))
        .route("/checkout/submit", post(routes::checkout::submit))
        .route("/admin/orders", get(routes::admin::list))
        .route(
            "/admin/orders/{id}/{action}",
            post(routes::admin::apply_action),
        )
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates the application state with in-memory stores and the demo buyer.
pub async fn create_default_state(config: &Config) -> Result<Arc<AppState>, ApiError> {
    create_state(config.pricing(), Backends::demo()).await
}
