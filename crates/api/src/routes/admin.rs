//! Admin order desk endpoints.

use std::sync::Arc;

use admin::{OrderFilter, PaymentFilter, StatusFilter};
use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use common::OrderId;
use domain::{Address, Order, OrderAction, OrderLine};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::state::AppState;

// -- Request types --

#[derive(Deserialize, Default)]
pub struct ListQuery {
    pub search: Option<String>,
    pub status: Option<String>,
    pub payment: Option<String>,
}

impl ListQuery {
    fn into_filter(self) -> Result<OrderFilter, ApiError> {
        let status: StatusFilter = parse_filter(self.status.as_deref())?;
        let payment: PaymentFilter = parse_filter(self.payment.as_deref())?;
        Ok(OrderFilter::new(self.search.unwrap_or_default(), status, payment))
    }
}

fn parse_filter<F>(value: Option<&str>) -> Result<F, ApiError>
where
    F: std::str::FromStr + Default,
    F::Err: std::fmt::Display,
{
    match value {
        None => Ok(F::default()),
        Some(value) => value
            .parse()
            .map_err(|e| ApiError::BadRequest(format!("Invalid filter: {e}"))),
    }
}

// -- Response types --

#[derive(Serialize)]
pub struct OrderListResponse {
    pub orders: Vec<OrderResponse>,
    pub count: usize,
}

#[derive(Serialize)]
pub struct OrderResponse {
    pub id: String,
    pub order_number: String,
    pub customer_name: String,
    pub customer_email: String,
    pub status: String,
    pub payment_status: String,
    pub payment_method: String,
    pub tracking_number: Option<String>,
    pub items: Vec<OrderLineResponse>,
    pub shipping_address: Address,
    pub billing_address: Address,
    pub subtotal_cents: i64,
    pub shipping_cents: i64,
    pub tax_cents: i64,
    pub total_cents: i64,
    pub created_at: String,
    pub available_actions: Vec<String>,
}

#[derive(Serialize)]
pub struct OrderLineResponse {
    pub product_id: String,
    pub product_name: String,
    pub unit_price_cents: i64,
    pub quantity: u32,
    pub line_total_cents: i64,
}

impl From<&OrderLine> for OrderLineResponse {
    fn from(line: &OrderLine) -> Self {
        Self {
            product_id: line.product_id.to_string(),
            product_name: line.product_name.clone(),
            unit_price_cents: line.unit_price.cents(),
            quantity: line.quantity,
            line_total_cents: line.line_total().cents(),
        }
    }
}

impl From<&Order> for OrderResponse {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id().to_string(),
            order_number: order.order_number().to_string(),
            customer_name: order.customer().name.clone(),
            customer_email: order.customer().email.clone(),
            status: order.status().to_string(),
            payment_status: order.payment_status().to_string(),
            payment_method: order.payment_method().to_string(),
            tracking_number: order.tracking_number().map(|t| t.to_string()),
            items: order.items().iter().map(OrderLineResponse::from).collect(),
            shipping_address: order.shipping_address().clone(),
            billing_address: order.billing_address().clone(),
            subtotal_cents: order.subtotal().cents(),
            shipping_cents: order.shipping().cents(),
            tax_cents: order.tax().cents(),
            total_cents: order.total().cents(),
            created_at: order.created_at().to_rfc3339(),
            available_actions: order
                .available_actions()
                .iter()
                .map(|a| a.to_string())
                .collect(),
        }
    }
}

// -- Handlers --

/// GET /admin/orders: orders matching `search`, `status` and `payment`.
#[tracing::instrument(skip(state, query))]
pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<OrderListResponse>, ApiError> {
    let filter = query.into_filter()?;

    let desk = state.desk.lock().await;
    let mut view = state.view.lock().await;
    let orders = view.get(&desk.orders(), &filter);

    Ok(Json(OrderListResponse {
        orders: orders.iter().map(OrderResponse::from).collect(),
        count: orders.len(),
    }))
}

/// POST /admin/orders/{id}/{action}
///
/// Responds 204 when the order is unknown.
#[tracing::instrument(skip(state))]
pub async fn apply_action(
    State(state): State<Arc<AppState>>,
    Path((id, action)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    let order_id: OrderId = id
        .parse()
        .map_err(|e| ApiError::BadRequest(format!("Invalid order id: {e}")))?;
    let action: OrderAction = action
        .parse()
        .map_err(|e: domain::ParseError| ApiError::BadRequest(e.to_string()))?;

    let updated = state.desk.lock().await.apply(order_id, action).await?;
    Ok(match updated {
        Some(order) => Json(OrderResponse::from(&order)).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    })
}
