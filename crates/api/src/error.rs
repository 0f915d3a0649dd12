//! API error types with HTTP response mapping.

use admin::AdminError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use checkout::CheckoutError;
use domain::{CartError, ValidationError};
use services::StoreError;
use thiserror::Error;

/// API-level error type that maps to HTTP responses.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found.
    #[error("{0}")]
    NotFound(String),

    /// Bad request from the client.
    #[error("{0}")]
    BadRequest(String),

    /// Cart or checkout error.
    #[error(transparent)]
    Checkout(#[from] CheckoutError),

    /// Order desk error.
    #[error(transparent)]
    Admin(#[from] AdminError),

    /// Collaborator failure outside the checkout and desk flows.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();

        if status.is_server_error() {
            tracing::error!(error = %message, %status, "request failed");
        }
        metrics::counter!("api_errors_total", "status" => status.as_u16().to_string())
            .increment(1);

        let mut body = serde_json::json!({ "error": message });
        if let ApiError::Checkout(CheckoutError::Validation(ValidationError::MissingFields {
            fields,
            ..
        })) = &self
        {
            let names: Vec<&str> = fields.iter().map(|f| f.as_str()).collect();
            body["fields"] = serde_json::json!(names);
        }

        (status, axum::Json(body)).into_response()
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Checkout(err) => checkout_status(err),
            ApiError::Admin(AdminError::InvalidTransition(_)) => StatusCode::CONFLICT,
            ApiError::Admin(AdminError::Persistence(err)) | ApiError::Store(err) => {
                store_status(err)
            }
        }
    }
}

fn checkout_status(err: &CheckoutError) -> StatusCode {
    match err {
        CheckoutError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        CheckoutError::Cart(CartError::ItemNotFound { .. }) => StatusCode::NOT_FOUND,
        CheckoutError::Cart(
            CartError::InvalidQuantity { .. }
            | CartError::InvalidPrice { .. }
            | CartError::AmountTooLarge { .. },
        ) => StatusCode::BAD_REQUEST,
        CheckoutError::Persistence(store_err) => store_status(store_err),
        CheckoutError::AlreadySubmitted | CheckoutError::InvalidStep { .. } => {
            StatusCode::CONFLICT
        }
    }
}

fn store_status(err: &StoreError) -> StatusCode {
    if err.is_not_found() {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use checkout::CheckoutStep;
    use domain::{FormSection, OrderAction, OrderError, OrderStatus, RequiredField};

    #[test]
    fn test_status_mapping() {
        let validation = ApiError::from(CheckoutError::Validation(ValidationError::EmptyCart));
        assert_eq!(validation.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let transition = ApiError::from(AdminError::InvalidTransition(
            OrderError::InvalidTransition {
                action: OrderAction::Ship,
                current_status: OrderStatus::Pending,
            },
        ));
        assert_eq!(transition.status(), StatusCode::CONFLICT);

        let unavailable = ApiError::from(AdminError::Persistence(StoreError::Unavailable(
            "down".to_string(),
        )));
        assert_eq!(unavailable.status(), StatusCode::SERVICE_UNAVAILABLE);

        let step = ApiError::from(CheckoutError::InvalidStep {
            operation: "submit",
            step: CheckoutStep::Shipping,
        });
        assert_eq!(step.status(), StatusCode::CONFLICT);

        let too_large = ApiError::from(CheckoutError::Cart(CartError::AmountTooLarge {
            unit_price: domain::Money::from_cents(i64::MAX),
            quantity: 2,
        }));
        assert_eq!(too_large.status(), StatusCode::BAD_REQUEST);

        let store = ApiError::from(StoreError::Unavailable("down".to_string()));
        assert_eq!(store.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_validation_body_lists_fields() {
        let err = ApiError::from(CheckoutError::Validation(ValidationError::MissingFields {
            section: FormSection::Shipping,
            fields: vec![RequiredField::City, RequiredField::ZipCode],
        }));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["fields"], serde_json::json!(["city", "zip_code"]));
    }
}
