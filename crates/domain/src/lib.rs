//! Domain layer for the storefront checkout.
//!
//! This crate provides the pure, synchronous core of the checkout flow:
//! - Order record, status enum and the lifecycle timeline projection
//! - Payment transaction records as reported by the backend
//! - The gateway result normalizer for browser redirects

pub mod error;
pub mod order;
pub mod payment;

pub use error::DomainError;
pub use order::{
    Milestone, Money, Order, OrderStatus, OrderTimestamps, PaymentMethod, PaymentStatus,
    TimelineStep, derive_timeline, timeline_for,
};
pub use payment::{GatewayOutcome, PaymentState, PaymentTransaction, RedirectParams, normalize};
