//! Domain error types.

use thiserror::Error;

/// Errors that can occur while interpreting backend values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// The backend reported an order status outside the known lifecycle.
    #[error("Unknown order status: {0}")]
    UnknownOrderStatus(String),

    /// The payment method is not one of the supported gateways.
    #[error("Unknown payment method: {0}")]
    UnknownPaymentMethod(String),

    /// The order payment status is not recognized.
    #[error("Unknown payment status: {0}")]
    UnknownPaymentStatus(String),

    /// A monetary amount could not be parsed.
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
}
