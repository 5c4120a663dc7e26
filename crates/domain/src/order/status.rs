//! Order lifecycle status.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// The status of an order as reported by the backend.
///
/// Transitions happen server-side only; this side reads and renders.
///
/// State transitions:
/// ```text
/// Pending ──► Confirmed ──► Processing ──► Shipped ──┬──► Delivered
///                                                   └──► Cancelled ──► Refunded
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Order has been placed and awaits confirmation.
    #[default]
    Pending,

    /// Seller confirmed the order.
    Confirmed,

    /// Order is being prepared for shipping.
    Processing,

    /// Order has left the warehouse.
    Shipped,

    /// Order reached the customer (terminal state).
    Delivered,

    /// Order was cancelled (terminal state).
    Cancelled,

    /// Cancelled order whose payment was returned (terminal state).
    Refunded,
}

impl OrderStatus {
    /// All statuses in lifecycle order.
    pub const ALL: [OrderStatus; 7] = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
        OrderStatus::Refunded,
    ];

    /// Returns true if this is a settled state (no further forward transition).
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderStatus::Delivered | OrderStatus::Cancelled | OrderStatus::Refunded
        )
    }

    /// Returns the wire name of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Refunded => "refunded",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == value.trim().to_lowercase())
            .ok_or_else(|| DomainError::UnknownOrderStatus(value.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_status_is_pending() {
        assert_eq!(OrderStatus::default(), OrderStatus::Pending);
    }

    #[test]
    fn test_terminal_states() {
        assert!(!OrderStatus::Pending.is_terminal());
        assert!(!OrderStatus::Confirmed.is_terminal());
        assert!(!OrderStatus::Processing.is_terminal());
        assert!(!OrderStatus::Shipped.is_terminal());
        assert!(OrderStatus::Delivered.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
        assert!(OrderStatus::Refunded.is_terminal());
    }

    #[test]
    fn test_parse_round_trips_every_status() {
        for status in OrderStatus::ALL {
            assert_eq!(status.as_str().parse::<OrderStatus>(), Ok(status));
        }
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("Shipped".parse::<OrderStatus>(), Ok(OrderStatus::Shipped));
    }

    #[test]
    fn test_parse_unknown() {
        assert_eq!(
            "lost".parse::<OrderStatus>(),
            Err(DomainError::UnknownOrderStatus("lost".to_string()))
        );
    }

    #[test]
    fn test_serialization_uses_wire_names() {
        let json = serde_json::to_string(&OrderStatus::Refunded).unwrap();
        assert_eq!(json, "\"refunded\"");
    }
}
