//! Re-payment trigger for orders whose online payment never settled.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use common::{OrderId, TransactionId};
use domain::{Order, PaymentMethod};
use reqwest::Url;

use crate::error::CheckoutError;
use crate::services::payment::{CreatePaymentRequest, PaymentBackend};

/// Storefront URLs handed to the gateway for the trip back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutLinks {
    origin: Url,
}

impl CheckoutLinks {
    /// Creates links under the public storefront origin.
    pub fn new(origin: &str) -> Result<Self, CheckoutError> {
        let origin = Url::parse(origin).map_err(|e| {
            CheckoutError::InvalidConfig(format!("invalid public origin {origin}: {e}"))
        })?;
        if origin.cannot_be_a_base() {
            return Err(CheckoutError::InvalidConfig(format!(
                "public origin is not a web origin: {origin}"
            )));
        }
        Ok(Self { origin })
    }

    fn result_url(&self, order_id: &OrderId) -> Url {
        let mut url = self.origin.clone();
        url.set_path("/checkout/result");
        url.set_query(None);
        url.set_fragment(None);
        url.query_pairs_mut().append_pair("orderId", order_id.as_str());
        url
    }

    /// Where the gateway sends the customer after paying.
    pub fn return_url(&self, order_id: &OrderId) -> String {
        self.result_url(order_id).to_string()
    }

    /// Where the gateway sends the customer after cancelling.
    pub fn cancel_url(&self, order_id: &OrderId) -> String {
        let mut url = self.result_url(order_id);
        url.query_pairs_mut().append_pair("status", "cancelled");
        url.to_string()
    }

    /// Order description shown on the gateway's payment page.
    pub fn description(order_id: &OrderId) -> String {
        format!("Thanh+toan+don+hang+{order_id}")
    }

    /// Builds the session request for an order.
    pub fn payment_request(
        &self,
        order_id: &OrderId,
        gateway: PaymentMethod,
    ) -> CreatePaymentRequest {
        CreatePaymentRequest {
            order_id: order_id.clone(),
            gateway,
            return_url: self.return_url(order_id),
            cancel_url: self.cancel_url(order_id),
            description: Self::description(order_id),
        }
    }
}

/// A fresh gateway session the customer should be sent to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayRedirect {
    pub url: String,
    pub transaction_id: Option<TransactionId>,
}

/// Opens new gateway sessions, at most one in flight per order.
pub struct RepaymentTrigger<P: PaymentBackend> {
    backend: Arc<P>,
    links: CheckoutLinks,
    in_flight: Arc<Mutex<HashSet<OrderId>>>,
}

impl<P: PaymentBackend> Clone for RepaymentTrigger<P> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            links: self.links.clone(),
            in_flight: Arc::clone(&self.in_flight),
        }
    }
}

impl<P: PaymentBackend> RepaymentTrigger<P> {
    /// Creates a new trigger.
    pub fn new(backend: Arc<P>, links: CheckoutLinks) -> Self {
        Self {
            backend,
            links,
            in_flight: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Returns true while a session request for the order is outstanding.
    pub fn is_in_flight(&self, order_id: &OrderId) -> bool {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(order_id)
    }

    /// Requests a new gateway session for the order.
    ///
    /// Nothing about the order changes here. On success the caller sends the
    /// customer to the returned URL.
    #[tracing::instrument(skip(self, order), fields(order_id = %order.id, gateway = %order.payment_method))]
    pub async fn trigger(&self, order: &Order) -> Result<GatewayRedirect, CheckoutError> {
        let result = self.request_session(order).await;
        let outcome = match &result {
            Ok(_) => "redirected",
            Err(CheckoutError::RepaymentInFlight(_)) => "in_flight",
            Err(CheckoutError::CashOnDelivery(_)) => "rejected",
            Err(CheckoutError::RepaymentFailed { .. }) => "declined",
            Err(_) => "error",
        };
        metrics::counter!("repayment_requests_total", "outcome" => outcome).increment(1);

        match &result {
            Ok(redirect) => tracing::info!(url = %redirect.url, "payment session opened"),
            Err(err) => tracing::warn!(error = %err, "payment session not opened"),
        }
        result
    }

    async fn request_session(&self, order: &Order) -> Result<GatewayRedirect, CheckoutError> {
        if !order.payment_method.is_online() {
            return Err(CheckoutError::CashOnDelivery(order.id.clone()));
        }
        let _guard = InFlightGuard::acquire(&self.in_flight, &order.id)
            .ok_or_else(|| CheckoutError::RepaymentInFlight(order.id.clone()))?;

        let request = self.links.payment_request(&order.id, order.payment_method);
        let response = self.backend.create_payment(request).await?;

        if !response.success {
            return Err(CheckoutError::RepaymentFailed {
                order_id: order.id.clone(),
                reason: response
                    .error
                    .unwrap_or_else(|| "unknown_error".to_string()),
            });
        }
        let url = response.payment_url.ok_or_else(|| CheckoutError::RepaymentFailed {
            order_id: order.id.clone(),
            reason: "response has no payment URL".to_string(),
        })?;

        Ok(GatewayRedirect {
            url,
            transaction_id: response.transaction_id,
        })
    }
}

// Releases the order's slot on every exit path.
struct InFlightGuard<'a> {
    set: &'a Mutex<HashSet<OrderId>>,
    order_id: OrderId,
}

impl<'a> InFlightGuard<'a> {
    fn acquire(set: &'a Mutex<HashSet<OrderId>>, order_id: &OrderId) -> Option<Self> {
        let inserted = set
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(order_id.clone());
        inserted.then(|| Self {
            set,
            order_id: order_id.clone(),
        })
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.set
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.order_id);
    }
}
