//! Cart endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use common::CartItemId;
use domain::{Cart, CartItem, CartTotals, Money};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::state::AppState;

// -- Request types --

#[derive(Deserialize)]
pub struct AddItemRequest {
    pub product_id: String,
    pub product_name: String,
    pub unit_price_cents: i64,
    pub quantity: u32,
}

#[derive(Deserialize)]
pub struct UpdateQuantityRequest {
    pub quantity: i64,
}

// -- Response types --

#[derive(Serialize)]
pub struct CartResponse {
    pub items: Vec<CartItemResponse>,
    pub item_count: usize,
    pub total_quantity: u32,
    pub totals: TotalsResponse,
}

#[derive(Serialize)]
pub struct CartItemResponse {
    pub id: String,
    pub product_id: String,
    pub product_name: String,
    pub unit_price_cents: i64,
    pub quantity: u32,
    pub line_total_cents: i64,
}

#[derive(Serialize)]
pub struct TotalsResponse {
    pub subtotal_cents: i64,
    pub shipping_cents: i64,
    pub tax_cents: i64,
    pub total_cents: i64,
}

#[derive(Serialize)]
pub struct ItemAddedResponse {
    pub item_id: String,
    pub cart: CartResponse,
}

impl From<&CartItem> for CartItemResponse {
    fn from(item: &CartItem) -> Self {
        Self {
            id: item.id.to_string(),
            product_id: item.product_id.to_string(),
            product_name: item.product_name.clone(),
            unit_price_cents: item.unit_price.cents(),
            quantity: item.quantity,
            line_total_cents: item.line_total().cents(),
        }
    }
}

impl From<CartTotals> for TotalsResponse {
    fn from(totals: CartTotals) -> Self {
        Self {
            subtotal_cents: totals.subtotal.cents(),
            shipping_cents: totals.shipping.cents(),
            tax_cents: totals.tax.cents(),
            total_cents: totals.total.cents(),
        }
    }
}

impl From<&Cart> for CartResponse {
    fn from(cart: &Cart) -> Self {
        Self {
            items: cart.items().iter().map(CartItemResponse::from).collect(),
            item_count: cart.item_count(),
            total_quantity: cart.total_quantity(),
            totals: cart.compute_totals().into(),
        }
    }
}

// -- Handlers --

/// GET /cart: lines and totals.
pub async fn get(State(state): State<Arc<AppState>>) -> Json<CartResponse> {
    let session = state.session.lock().await;
    Json(session.cart.cart().into())
}

/// POST /cart/items: add a product, merging with an existing line.
#[tracing::instrument(skip(state, req))]
pub async fn add_item(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AddItemRequest>,
) -> Result<(StatusCode, Json<ItemAddedResponse>), ApiError> {
    let mut session = state.session.lock().await;
    let item_id = session
        .cart
        .add_item(
            req.product_id,
            req.product_name,
            Money::from_cents(req.unit_price_cents),
            req.quantity,
        )
        .await?;

    let response = ItemAddedResponse {
        item_id: item_id.to_string(),
        cart: session.cart.cart().into(),
    };
    Ok((StatusCode::CREATED, Json(response)))
}

/// PATCH /cart/items/{id}: set a line's quantity; zero or less removes it.
#[tracing::instrument(skip(state, req))]
pub async fn update_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateQuantityRequest>,
) -> Result<Json<CartResponse>, ApiError> {
    let item_id = parse_item_id(&id)?;
    let mut session = state.session.lock().await;
    session.cart.update_quantity(item_id, req.quantity).await?;
    Ok(Json(session.cart.cart().into()))
}

/// DELETE /cart/items/{id}
#[tracing::instrument(skip(state))]
pub async fn remove_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<CartResponse>, ApiError> {
    let item_id = parse_item_id(&id)?;
    let mut session = state.session.lock().await;
    session.cart.remove_item(item_id).await?;
    Ok(Json(session.cart.cart().into()))
}

/// DELETE /cart
#[tracing::instrument(skip(state))]
pub async fn clear(State(state): State<Arc<AppState>>) -> Result<Json<CartResponse>, ApiError> {
    let mut session = state.session.lock().await;
    session.cart.clear().await?;
    Ok(Json(session.cart.cart().into()))
}

fn parse_item_id(id: &str) -> Result<CartItemId, ApiError> {
    id.parse()
        .map_err(|e| ApiError::BadRequest(format!("Invalid cart item id: {e}")))
}
