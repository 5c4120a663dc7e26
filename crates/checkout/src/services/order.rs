//! Order backend trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use common::OrderId;
use domain::Order;

use crate::error::CheckoutError;

/// Order reads the checkout flow consumes from the backend.
#[async_trait]
pub trait OrderBackend: Send + Sync {
    /// Fetches an order, or `None` if the backend does not know it.
    async fn get_order(&self, order_id: &OrderId) -> Result<Option<Order>, CheckoutError>;
}

#[derive(Debug, Default)]
struct InMemoryOrderState {
    orders: HashMap<OrderId, Order>,
    fail_on_get: bool,
}

/// In-memory order backend for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryOrderBackend {
    state: Arc<RwLock<InMemoryOrderState>>,
}

impl InMemoryOrderBackend {
    /// Creates a new in-memory order backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores or replaces an order.
    pub fn insert(&self, order: Order) {
        self.state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .orders
            .insert(order.id.clone(), order);
    }

    /// Configures the backend to fail every read.
    pub fn set_fail_on_get(&self, fail: bool) {
        self.state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .fail_on_get = fail;
    }
}

#[async_trait]
impl OrderBackend for InMemoryOrderBackend {
    async fn get_order(&self, order_id: &OrderId) -> Result<Option<Order>, CheckoutError> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        if state.fail_on_get {
            return Err(CheckoutError::Transport("connection reset".to_string()));
        }
        Ok(state.orders.get(order_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use domain::PaymentMethod;

    use super::*;

    #[tokio::test]
    async fn test_insert_and_get() {
        let backend = InMemoryOrderBackend::new();
        let order = Order::placed("31", PaymentMethod::VnPay, Utc::now());
        backend.insert(order.clone());

        let found = backend.get_order(&OrderId::new("31")).await.unwrap();
        assert_eq!(found, Some(order));
        assert_eq!(backend.get_order(&OrderId::new("32")).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_fail_on_get() {
        let backend = InMemoryOrderBackend::new();
        backend.set_fail_on_get(true);
        let result = backend.get_order(&OrderId::new("31")).await;
        assert!(matches!(result, Err(CheckoutError::Transport(_))));
    }
}
