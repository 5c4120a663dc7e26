//! Order record as served by the backend.

use chrono::{DateTime, Utc};
use common::OrderId;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

use super::{OrderStatus, OrderTimestamps, PaymentMethod, PaymentStatus};

/// An order as read from the backend's order endpoint.
///
/// Only the fields the checkout flow consumes are modelled; the rest of the
/// payload is ignored. `status` is kept as the raw wire string so an
/// unrecognized value reaches the timeline's defensive path instead of
/// failing the whole fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub status: String,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Creates a freshly placed order: pending status, unpaid, never updated.
    pub fn placed(
        id: impl Into<OrderId>,
        payment_method: PaymentMethod,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            status: OrderStatus::Pending.as_str().to_string(),
            payment_method,
            payment_status: PaymentStatus::Pending,
            created_at,
            updated_at: created_at,
        }
    }

    /// Returns a copy moved to the given status at the given time.
    pub fn with_status(mut self, status: OrderStatus, updated_at: DateTime<Utc>) -> Self {
        self.status = status.as_str().to_string();
        self.updated_at = updated_at;
        self
    }

    /// Returns a copy with the given payment status.
    pub fn with_payment_status(mut self, payment_status: PaymentStatus) -> Self {
        self.payment_status = payment_status;
        self
    }

    /// Parses the current lifecycle status.
    pub fn status(&self) -> Result<OrderStatus, DomainError> {
        self.status.parse()
    }

    /// Returns the timestamps the timeline projection displays.
    pub fn timestamps(&self) -> OrderTimestamps {
        OrderTimestamps {
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    /// Returns true if the customer may request a new gateway session.
    ///
    /// Requires an online payment method, an unsettled payment and an order
    /// that has not been cancelled.
    pub fn can_pay_again(&self) -> bool {
        self.payment_method.is_online()
            && self.payment_status != PaymentStatus::Paid
            && !matches!(self.status(), Ok(OrderStatus::Cancelled))
    }
}
