//! Order lifecycle timeline.
//!
//! The backend exposes only the current status of an order, never a log of
//! its transitions. The timeline is therefore a projection of that single
//! value onto the canonical path that leads to it:
//!
//! ```text
//! placed ─► confirmed ─► processing ─► shipped ─┬─► delivered
//!                                               └─► cancelled ─► refunded
//! ```
//!
//! It assumes every transition followed that path without skipping a state.
//! An order cancelled straight from `pending` is still shown with every
//! intermediate milestone back-filled as completed.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{Order, OrderStatus};

/// A named point on an order's lifecycle path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Milestone {
    Placed,
    Confirmed,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
    Refunded,
}

impl Milestone {
    pub fn title(&self) -> &'static str {
        match self {
            Milestone::Placed => "Order Placed",
            Milestone::Confirmed => "Order Confirmed",
            Milestone::Processing => "Order Processing",
            Milestone::Shipped => "Order Shipped",
            Milestone::Delivered => "Order Delivered",
            Milestone::Cancelled => "Order Cancelled",
            Milestone::Refunded => "Order Refunded",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Milestone::Placed => "Your order has been received.",
            Milestone::Confirmed => "Your order has been confirmed by the seller.",
            Milestone::Processing => "Your order is being prepared for shipping.",
            Milestone::Shipped => "Your order has been shipped.",
            Milestone::Delivered => "Your order has been delivered.",
            Milestone::Cancelled => "Your order has been cancelled.",
            Milestone::Refunded => "Your order has been refunded.",
        }
    }
}

const FULFILMENT_PATH: [Milestone; 5] = [
    Milestone::Placed,
    Milestone::Confirmed,
    Milestone::Processing,
    Milestone::Shipped,
    Milestone::Delivered,
];

const CANCELLATION_PATH: [Milestone; 6] = [
    Milestone::Placed,
    Milestone::Confirmed,
    Milestone::Processing,
    Milestone::Shipped,
    Milestone::Cancelled,
    Milestone::Refunded,
];

impl OrderStatus {
    /// Milestones from placement up to and including this status.
    pub fn milestone_path(&self) -> &'static [Milestone] {
        match self {
            OrderStatus::Pending => &FULFILMENT_PATH[..1],
            OrderStatus::Confirmed => &FULFILMENT_PATH[..2],
            OrderStatus::Processing => &FULFILMENT_PATH[..3],
            OrderStatus::Shipped => &FULFILMENT_PATH[..4],
            OrderStatus::Delivered => &FULFILMENT_PATH[..],
            OrderStatus::Cancelled => &CANCELLATION_PATH[..5],
            OrderStatus::Refunded => &CANCELLATION_PATH[..],
        }
    }
}

/// The two timestamps the backend keeps per order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderTimestamps {
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One rendered entry of an order timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelineStep {
    pub milestone: Milestone,
    pub title: &'static str,
    pub description: &'static str,
    pub date: DateTime<Utc>,
    pub completed: bool,
}

/// Projects a status onto its ordered timeline.
///
/// Every step before the current one is completed. The current step is
/// completed only once the order is settled (delivered, cancelled,
/// refunded). The placement step carries `created_at`; all later steps carry
/// `updated_at` since individual transitions are not timestamped.
pub fn derive_timeline(status: OrderStatus, timestamps: OrderTimestamps) -> Vec<TimelineStep> {
    let path = status.milestone_path();
    let last = path.len() - 1;

    path.iter()
        .enumerate()
        .map(|(index, milestone)| TimelineStep {
            milestone: *milestone,
            title: milestone.title(),
            description: milestone.description(),
            date: if index == 0 {
                timestamps.created_at
            } else {
                timestamps.updated_at
            },
            completed: index < last || status.is_terminal(),
        })
        .collect()
}

/// Builds the timeline for an order record.
///
/// Returns an empty timeline when the backend reports a status outside the
/// known lifecycle.
pub fn timeline_for(order: &Order) -> Vec<TimelineStep> {
    match order.status() {
        Ok(status) => derive_timeline(status, order.timestamps()),
        Err(err) => {
            tracing::warn!(order_id = %order.id, error = %err, "cannot project order timeline");
            Vec::new()
        }
    }
}
