//! Checkout error types.

use common::OrderId;
use domain::DomainError;
use thiserror::Error;

/// Errors that can occur while talking to the backend or re-opening payment.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The request never produced a response (connect, timeout, TLS).
    #[error("Backend unreachable: {0}")]
    Transport(String),

    /// The backend answered with an error status.
    #[error("Backend error (HTTP {status}): {message}")]
    Backend { status: u16, message: String },

    /// The backend answered with a body this client cannot read.
    #[error("Unexpected backend response: {0}")]
    Decode(String),

    /// The requested record does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Client configuration is unusable.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Cash-on-delivery orders have no gateway session to re-open.
    #[error("Order {0} is paid on delivery")]
    CashOnDelivery(OrderId),

    /// A session request for the order is already outstanding.
    #[error("Payment request already in progress for order {0}")]
    RepaymentInFlight(OrderId),

    /// The backend declined to open a new gateway session.
    #[error("Could not create payment for order {order_id}: {reason}")]
    RepaymentFailed { order_id: OrderId, reason: String },

    /// Domain error.
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),
}

impl From<reqwest::Error> for CheckoutError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            CheckoutError::Decode(err.to_string())
        } else {
            CheckoutError::Transport(err.to_string())
        }
    }
}

/// Convenience type alias for checkout results.
pub type Result<T> = std::result::Result<T, CheckoutError>;
