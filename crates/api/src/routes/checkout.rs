//! Checkout wizard endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use checkout::{BillingAddress, CheckoutStep, CheckoutWorkflow};
use domain::{Address, Cart, CardDetails, PaymentMethod, PaymentSelection};
use serde::{Deserialize, Serialize};

use super::cart::CartResponse;
use crate::error::ApiError;
use crate::state::{AppState, Checkout};

// -- Request types --

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct AddressRequest {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
}

impl From<AddressRequest> for Address {
    fn from(req: AddressRequest) -> Self {
        Address::new(req.street, req.city, req.state, req.zip_code, req.country)
    }
}

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct CardRequest {
    pub card_number: String,
    pub card_name: String,
    pub expiry_date: String,
    pub cvv: String,
}

impl From<CardRequest> for CardDetails {
    fn from(req: CardRequest) -> Self {
        CardDetails {
            card_number: req.card_number,
            card_name: req.card_name,
            expiry_date: req.expiry_date,
            cvv: req.cvv,
        }
    }
}

#[derive(Deserialize)]
pub struct PaymentRequest {
    pub method: PaymentMethod,
    #[serde(default)]
    pub card: CardRequest,
    /// Absent means billing reuses the shipping address.
    pub billing_address: Option<AddressRequest>,
}

// -- Response types --

#[derive(Serialize)]
pub struct CheckoutResponse {
    pub step: CheckoutStep,
    pub customer_name: String,
    pub customer_email: String,
    pub shipping_address: Address,
    pub billing: BillingAddress,
    pub billing_address: Address,
    pub payment_method: PaymentMethod,
    pub card_last_four: Option<String>,
    pub cart: CartResponse,
    pub confirmation: Option<ConfirmationResponse>,
}

#[derive(Serialize)]
pub struct ConfirmationResponse {
    pub order_id: String,
    pub order_number: String,
    pub total_cents: i64,
}

impl CheckoutResponse {
    fn new(checkout: &Checkout, cart: &Cart) -> Self {
        let payment = checkout.payment();
        let card_last_four = match payment.method {
            PaymentMethod::Card if !payment.card.card_number.trim().is_empty() => {
                Some(payment.card.last_four().to_string())
            }
            _ => None,
        };

        Self {
            step: checkout.step(),
            customer_name: checkout.customer().name.clone(),
            customer_email: checkout.customer().email.clone(),
            shipping_address: checkout.shipping_address().clone(),
            billing: checkout.billing().clone(),
            billing_address: checkout.billing_address().clone(),
            payment_method: payment.method,
            card_last_four,
            cart: cart.into(),
            confirmation: checkout.confirmation().map(|c| ConfirmationResponse {
                order_id: c.order_id.to_string(),
                order_number: c.order_number.clone(),
                total_cents: c.total.cents(),
            }),
        }
    }
}

fn no_checkout() -> ApiError {
    ApiError::NotFound("No checkout in progress".to_string())
}

// -- Handlers --

/// POST /checkout: start a fresh checkout, replacing any previous one.
#[tracing::instrument(skip(state))]
pub async fn start(
    State(state): State<Arc<AppState>>,
) -> Result<(StatusCode, Json<CheckoutResponse>), ApiError> {
    let mut guard = state.session.lock().await;
    let session = &mut *guard;

    let checkout = CheckoutWorkflow::start(
        &state.session_provider,
        &mut session.cart,
        state.orders.clone(),
        state.notifier,
    )
    .await?;

    let response = CheckoutResponse::new(&checkout, session.cart.cart());
    session.checkout = Some(checkout);
    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /checkout
pub async fn get(State(state): State<Arc<AppState>>) -> Result<Json<CheckoutResponse>, ApiError> {
    let session = state.session.lock().await;
    let checkout = session.checkout.as_ref().ok_or_else(no_checkout)?;
    Ok(Json(CheckoutResponse::new(checkout, session.cart.cart())))
}

/// PUT /checkout/shipping: enter the shipping address and move on to payment.
#[tracing::instrument(skip(state, req))]
pub async fn set_shipping(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AddressRequest>,
) -> Result<Json<CheckoutResponse>, ApiError> {
    let mut guard = state.session.lock().await;
    let session = &mut *guard;
    let checkout = session.checkout.as_mut().ok_or_else(no_checkout)?;

    checkout.go_to(CheckoutStep::Shipping)?;
    checkout.set_shipping_address(req.into())?;
    checkout.continue_to_payment()?;

    Ok(Json(CheckoutResponse::new(checkout, session.cart.cart())))
}

/// PUT /checkout/payment: choose payment and billing, then move on to review.
#[tracing::instrument(skip(state, req))]
pub async fn set_payment(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PaymentRequest>,
) -> Result<Json<CheckoutResponse>, ApiError> {
    let mut guard = state.session.lock().await;
    let session = &mut *guard;
    let checkout = session.checkout.as_mut().ok_or_else(no_checkout)?;

    checkout.go_to(CheckoutStep::Payment)?;
    checkout.set_payment(PaymentSelection {
        method: req.method,
        card: req.card.into(),
    })?;
    match req.billing_address {
        Some(address) => checkout.use_separate_billing(address.into())?,
        None => checkout.use_shipping_for_billing()?,
    }
    checkout.continue_to_review()?;

    Ok(Json(CheckoutResponse::new(checkout, session.cart.cart())))
}

/// POST /checkout/back
#[tracing::instrument(skip(state))]
pub async fn back(State(state): State<Arc<AppState>>) -> Result<Json<CheckoutResponse>, ApiError> {
    let mut guard = state.session.lock().await;
    let session = &mut *guard;
    let checkout = session.checkout.as_mut().ok_or_else(no_checkout)?;

    checkout.back()?;
    Ok(Json(CheckoutResponse::new(checkout, session.cart.cart())))
}

/// POST /checkout/submit: place the order.
///
/// The order desk is refreshed afterwards so the new order shows up in the
/// admin listing.
#[tracing::instrument(skip(state))]
pub async fn submit(
    State(state): State<Arc<AppState>>,
) -> Result<(StatusCode, Json<ConfirmationResponse>), ApiError> {
    let confirmation = {
        let mut guard = state.session.lock().await;
        let session = &mut *guard;
        let checkout = session.checkout.as_mut().ok_or_else(no_checkout)?;
        checkout.submit(&mut session.cart).await?
    };

    if let Err(e) = state.desk.lock().await.refresh().await {
        tracing::warn!(error = %e, "Order desk refresh after checkout failed");
    }

    let response = ConfirmationResponse {
        order_id: confirmation.order_id.to_string(),
        order_number: confirmation.order_number,
        total_cents: confirmation.total.cents(),
    };
    Ok((StatusCode::CREATED, Json(response)))
}
