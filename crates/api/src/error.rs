//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use checkout::CheckoutError;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Resource not found.
    NotFound(String),
    /// Bad request from the client.
    BadRequest(String),
    /// Request conflicts with the order's current state.
    Conflict(String),
    /// Checkout or backend error.
    Checkout(CheckoutError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::Checkout(err) => checkout_error_to_response(err),
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

fn checkout_error_to_response(err: CheckoutError) -> (StatusCode, String) {
    match &err {
        CheckoutError::NotFound(_) => (StatusCode::NOT_FOUND, err.to_string()),
        CheckoutError::CashOnDelivery(_) | CheckoutError::RepaymentInFlight(_) => {
            (StatusCode::CONFLICT, err.to_string())
        }
        CheckoutError::RepaymentFailed { reason, .. } => (StatusCode::BAD_GATEWAY, reason.clone()),
        CheckoutError::Transport(_) | CheckoutError::Backend { .. } | CheckoutError::Decode(_) => {
            tracing::warn!(error = %err, "backend call failed");
            (StatusCode::BAD_GATEWAY, err.to_string())
        }
        CheckoutError::InvalidConfig(_) | CheckoutError::Domain(_) => {
            tracing::error!(error = %err, "internal server error");
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
    }
}

impl From<CheckoutError> for ApiError {
    fn from(err: CheckoutError) -> Self {
        ApiError::Checkout(err)
    }
}

#[cfg(test)]
mod tests {
    use common::OrderId;

    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (
                CheckoutError::NotFound("payment".to_string()),
                StatusCode::NOT_FOUND,
            ),
            (
                CheckoutError::RepaymentInFlight(OrderId::new("55")),
                StatusCode::CONFLICT,
            ),
            (
                CheckoutError::RepaymentFailed {
                    order_id: OrderId::new("55"),
                    reason: "unknown_error".to_string(),
                },
                StatusCode::BAD_GATEWAY,
            ),
            (
                CheckoutError::Transport("connection reset".to_string()),
                StatusCode::BAD_GATEWAY,
            ),
            (
                CheckoutError::InvalidConfig("bad url".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, expected) in cases {
            let response = ApiError::from(err).into_response();
            assert_eq!(response.status(), expected);
        }
    }
}
