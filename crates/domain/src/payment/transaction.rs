//! Payment transaction record as reported by the backend.

use chrono::{DateTime, Utc};
use common::{OrderId, TransactionId};
use serde::{Deserialize, Serialize};

use crate::order::{Money, PaymentMethod};

/// Outcome of a payment transaction on the backend's books.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentState {
    Success,
    Failed,
    Pending,
}

impl PaymentState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentState::Success => "success",
            PaymentState::Failed => "failed",
            PaymentState::Pending => "pending",
        }
    }
}

impl std::fmt::Display for PaymentState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The authoritative record of a gateway payment, owned by the backend.
///
/// Ground truth for payment state; `order_status` is informational only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentTransaction {
    pub transaction_id: TransactionId,
    pub status: PaymentState,
    pub amount: Money,
    pub gateway: PaymentMethod,
    pub paid_at: Option<DateTime<Utc>>,
    pub order_id: OrderId,
    pub order_status: String,
}

impl PaymentTransaction {
    /// Creates a pending transaction for an order.
    pub fn pending(
        transaction_id: impl Into<TransactionId>,
        order_id: impl Into<OrderId>,
        gateway: PaymentMethod,
        amount: Money,
    ) -> Self {
        Self {
            transaction_id: transaction_id.into(),
            status: PaymentState::Pending,
            amount,
            gateway,
            paid_at: None,
            order_id: order_id.into(),
            order_status: "pending".to_string(),
        }
    }

    /// Returns a copy settled as successful at the given time.
    pub fn succeeded(mut self, paid_at: DateTime<Utc>) -> Self {
        self.status = PaymentState::Success;
        self.paid_at = Some(paid_at);
        self
    }

    /// Returns a copy settled as failed.
    pub fn failed(mut self) -> Self {
        self.status = PaymentState::Failed;
        self.paid_at = None;
        self
    }
}
