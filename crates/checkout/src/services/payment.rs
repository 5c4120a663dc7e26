//! Payment backend trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use async_trait::async_trait;
use common::{OrderId, TransactionId};
use domain::{PaymentMethod, PaymentTransaction};
use serde::{Deserialize, Serialize};

use crate::error::CheckoutError;

/// Request for a new gateway payment session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentRequest {
    pub order_id: OrderId,
    pub gateway: PaymentMethod,
    pub return_url: String,
    pub cancel_url: String,
    pub description: String,
}

/// Backend answer to a session request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentResponse {
    pub success: bool,
    pub payment_url: Option<String>,
    pub transaction_id: Option<TransactionId>,
    pub error: Option<String>,
}

impl CreatePaymentResponse {
    /// A successful session pointing at the given gateway URL.
    pub fn redirect(payment_url: impl Into<String>, transaction_id: TransactionId) -> Self {
        Self {
            success: true,
            payment_url: Some(payment_url.into()),
            transaction_id: Some(transaction_id),
            error: None,
        }
    }

    /// A session request the backend declined.
    pub fn declined(error: impl Into<String>) -> Self {
        Self {
            success: false,
            payment_url: None,
            transaction_id: None,
            error: Some(error.into()),
        }
    }
}

/// Payment operations the checkout flow consumes from the backend.
#[async_trait]
pub trait PaymentBackend: Send + Sync {
    /// Looks up the authoritative record of a gateway transaction.
    async fn payment_status(
        &self,
        transaction_id: &TransactionId,
    ) -> Result<PaymentTransaction, CheckoutError>;

    /// Opens a new gateway session for an order.
    async fn create_payment(
        &self,
        request: CreatePaymentRequest,
    ) -> Result<CreatePaymentResponse, CheckoutError>;
}

#[derive(Debug, Default)]
struct InMemoryPaymentState {
    transactions: HashMap<TransactionId, PaymentTransaction>,
    status_lookups: Vec<TransactionId>,
    sessions: Vec<CreatePaymentRequest>,
    next_session: u32,
    fail_status_lookup: bool,
    status_delay: Option<Duration>,
    create_delay: Option<Duration>,
    fail_create: bool,
    decline_create: Option<String>,
    omit_payment_url: bool,
}

/// In-memory payment backend for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPaymentBackend {
    state: Arc<RwLock<InMemoryPaymentState>>,
}

impl InMemoryPaymentBackend {
    /// Creates a new in-memory payment backend.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, InMemoryPaymentState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, InMemoryPaymentState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Stores or replaces a transaction record.
    pub fn insert_transaction(&self, transaction: PaymentTransaction) {
        self.write()
            .transactions
            .insert(transaction.transaction_id.clone(), transaction);
    }

    /// Makes status lookups fail with a transport error.
    pub fn set_fail_status_lookup(&self, fail: bool) {
        self.write().fail_status_lookup = fail;
    }

    /// Delays every status lookup by the given duration.
    pub fn set_status_delay(&self, delay: Option<Duration>) {
        self.write().status_delay = delay;
    }

    /// Delays every session request by the given duration.
    pub fn set_create_delay(&self, delay: Option<Duration>) {
        self.write().create_delay = delay;
    }

    /// Makes session creation fail with a transport error.
    pub fn set_fail_create(&self, fail: bool) {
        self.write().fail_create = fail;
    }

    /// Makes session creation answer `success: false` with the given reason.
    pub fn set_decline_create(&self, reason: Option<&str>) {
        self.write().decline_create = reason.map(str::to_string);
    }

    /// Makes session creation succeed without a payment URL.
    pub fn set_omit_payment_url(&self, omit: bool) {
        self.write().omit_payment_url = omit;
    }

    /// Returns the number of status lookups received.
    pub fn status_lookup_count(&self) -> usize {
        self.read().status_lookups.len()
    }

    /// Returns the transaction ids looked up, in call order.
    pub fn status_lookups(&self) -> Vec<TransactionId> {
        self.read().status_lookups.clone()
    }

    /// Returns every session request received, in call order.
    pub fn session_requests(&self) -> Vec<CreatePaymentRequest> {
        self.read().sessions.clone()
    }
}

#[async_trait]
impl PaymentBackend for InMemoryPaymentBackend {
    async fn payment_status(
        &self,
        transaction_id: &TransactionId,
    ) -> Result<PaymentTransaction, CheckoutError> {
        let delay = {
            let mut state = self.write();
            state.status_lookups.push(transaction_id.clone());
            state.status_delay
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let state = self.read();
        if state.fail_status_lookup {
            return Err(CheckoutError::Transport("connection reset".to_string()));
        }
        state
            .transactions
            .get(transaction_id)
            .cloned()
            .ok_or_else(|| CheckoutError::NotFound(format!("payment {transaction_id}")))
    }

    async fn create_payment(
        &self,
        request: CreatePaymentRequest,
    ) -> Result<CreatePaymentResponse, CheckoutError> {
        let delay = {
            let mut state = self.write();
            state.sessions.push(request.clone());
            state.create_delay
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut state = self.write();
        if state.fail_create {
            return Err(CheckoutError::Transport("connection refused".to_string()));
        }
        if let Some(reason) = state.decline_create.clone() {
            return Ok(CreatePaymentResponse::declined(reason));
        }

        state.next_session += 1;
        let transaction_id = TransactionId::new(format!(
            "{}-{}-{:04}",
            request.gateway, request.order_id, state.next_session
        ));
        if state.omit_payment_url {
            return Ok(CreatePaymentResponse {
                success: true,
                payment_url: None,
                transaction_id: Some(transaction_id),
                error: None,
            });
        }
        let url = format!(
            "https://sandbox.{}.test/pay?ref={}",
            request.gateway, transaction_id
        );
        Ok(CreatePaymentResponse::redirect(url, transaction_id))
    }
}

#[cfg(test)]
mod tests {
    use domain::Money;

    use super::*;

    fn request(order_id: &str) -> CreatePaymentRequest {
        CreatePaymentRequest {
            order_id: OrderId::new(order_id),
            gateway: PaymentMethod::Momo,
            return_url: "https://shop.test/checkout/result?orderId=1".to_string(),
            cancel_url: "https://shop.test/checkout/result?orderId=1&status=cancelled".to_string(),
            description: "Thanh+toan+don+hang+1".to_string(),
        }
    }

    #[tokio::test]
    async fn test_status_lookup_returns_stored_transaction() {
        let backend = InMemoryPaymentBackend::new();
        let txn = PaymentTransaction::pending("T-1", "1", PaymentMethod::Momo, Money::from_dong(5));
        backend.insert_transaction(txn.clone());

        let found = backend.payment_status(&TransactionId::new("T-1")).await.unwrap();
        assert_eq!(found, txn);
        assert_eq!(backend.status_lookup_count(), 1);
    }

    #[tokio::test]
    async fn test_status_lookup_unknown_is_not_found() {
        let backend = InMemoryPaymentBackend::new();
        let result = backend.payment_status(&TransactionId::new("nope")).await;
        assert!(matches!(result, Err(CheckoutError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_fail_status_lookup() {
        let backend = InMemoryPaymentBackend::new();
        backend.set_fail_status_lookup(true);
        let result = backend.payment_status(&TransactionId::new("T-1")).await;
        assert!(matches!(result, Err(CheckoutError::Transport(_))));
        assert_eq!(backend.status_lookups(), vec![TransactionId::new("T-1")]);
    }

    #[tokio::test]
    async fn test_sequential_sessions() {
        let backend = InMemoryPaymentBackend::new();
        let r1 = backend.create_payment(request("7")).await.unwrap();
        let r2 = backend.create_payment(request("7")).await.unwrap();

        assert!(r1.success);
        assert_eq!(r1.transaction_id, Some(TransactionId::new("momo-7-0001")));
        assert_eq!(r2.transaction_id, Some(TransactionId::new("momo-7-0002")));
        assert_eq!(
            r1.payment_url.as_deref(),
            Some("https://sandbox.momo.test/pay?ref=momo-7-0001")
        );
        assert_eq!(backend.session_requests().len(), 2);
    }

    #[tokio::test]
    async fn test_declined_session() {
        let backend = InMemoryPaymentBackend::new();
        backend.set_decline_create(Some("Invalid payment gateway"));
        let response = backend.create_payment(request("7")).await.unwrap();
        assert!(!response.success);
        assert_eq!(response.error.as_deref(), Some("Invalid payment gateway"));
    }

    #[test]
    fn test_request_serializes_camel_case() {
        let json = serde_json::to_value(request("7")).unwrap();
        assert_eq!(json["orderId"], "7");
        assert_eq!(json["gateway"], "momo");
        assert!(json["returnUrl"].as_str().is_some());
        assert!(json["cancelUrl"].as_str().is_some());
    }
}
