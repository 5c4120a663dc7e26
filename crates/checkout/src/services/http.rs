//! HTTP client for the storefront backend.
//!
//! Every backend response is wrapped in the same envelope:
//! `{ "statusCode": .., "message": .., "data": .. }`.

use std::time::Duration;

use async_trait::async_trait;
use common::{OrderId, TransactionId};
use domain::{Order, PaymentTransaction};
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

use super::order::OrderBackend;
use super::payment::{CreatePaymentRequest, CreatePaymentResponse, PaymentBackend};
use crate::error::CheckoutError;

/// Connection settings for [`HttpBackend`].
#[derive(Debug, Clone)]
pub struct HttpBackendConfig {
    /// Backend origin, e.g. `https://api.shop.example`.
    pub base_url: String,
    /// Bearer token forwarded on every call.
    pub bearer_token: Option<String>,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for HttpBackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            bearer_token: None,
            timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    message: Option<String>,
    data: Option<T>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PaymentSession {
    payment_url: Option<String>,
    transaction_id: Option<TransactionId>,
}

#[derive(Debug, Deserialize)]
struct OrderPayload {
    order: Option<Order>,
}

/// Backend client over HTTP.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: Url,
    bearer_token: Option<String>,
}

impl HttpBackend {
    pub fn new(config: HttpBackendConfig) -> Result<Self, CheckoutError> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            CheckoutError::InvalidConfig(format!("invalid backend url {}: {e}", config.base_url))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(CheckoutError::InvalidConfig(format!(
                "backend url cannot carry a path: {base_url}"
            )));
        }
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                CheckoutError::InvalidConfig(format!("failed to initialize HTTP client: {e}"))
            })?;

        Ok(Self {
            client,
            base_url,
            bearer_token: config.bearer_token,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, CheckoutError> {
        let request = match &self.bearer_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<Envelope<JsonValue>>(&body)
                .ok()
                .and_then(|envelope| envelope.message)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("error").to_string());
            tracing::debug!(%status, %message, "backend returned error status");
            return Err(if status == StatusCode::NOT_FOUND {
                CheckoutError::NotFound(message)
            } else {
                CheckoutError::Backend {
                    status: status.as_u16(),
                    message,
                }
            });
        }

        serde_json::from_str::<Envelope<T>>(&body)
            .map_err(|e| CheckoutError::Decode(format!("invalid backend JSON: {e}")))?
            .data
            .ok_or_else(|| CheckoutError::Decode("backend response has no data".to_string()))
    }
}

// The backend keys orders by integer; send numeric ids as JSON numbers.
fn order_id_json(order_id: &OrderId) -> JsonValue {
    order_id
        .as_str()
        .parse::<u64>()
        .map(JsonValue::from)
        .unwrap_or_else(|_| JsonValue::from(order_id.as_str()))
}

#[async_trait]
impl PaymentBackend for HttpBackend {
    #[tracing::instrument(skip(self), fields(%transaction_id))]
    async fn payment_status(
        &self,
        transaction_id: &TransactionId,
    ) -> Result<PaymentTransaction, CheckoutError> {
        let url = self.endpoint(&["api", "payment", "status", transaction_id.as_str()]);
        self.fetch(self.client.get(url)).await
    }

    #[tracing::instrument(skip(self, request), fields(order_id = %request.order_id, gateway = %request.gateway))]
    async fn create_payment(
        &self,
        request: CreatePaymentRequest,
    ) -> Result<CreatePaymentResponse, CheckoutError> {
        let url = self.endpoint(&["api", "payment", "create"]);
        let body = serde_json::json!({
            "orderId": order_id_json(&request.order_id),
            "gateway": request.gateway,
            "returnUrl": request.return_url,
            "cancelUrl": request.cancel_url,
            "description": request.description,
        });

        match self.fetch::<PaymentSession>(self.client.post(url).json(&body)).await {
            Ok(session) => Ok(CreatePaymentResponse {
                success: true,
                payment_url: session.payment_url,
                transaction_id: session.transaction_id,
                error: None,
            }),
            Err(CheckoutError::NotFound(message)) => Ok(CreatePaymentResponse::declined(message)),
            Err(CheckoutError::Backend { status, message }) if status < 500 => {
                Ok(CreatePaymentResponse::declined(message))
            }
            Err(err) => Err(err),
        }
    }
}

#[async_trait]
impl OrderBackend for HttpBackend {
    #[tracing::instrument(skip(self), fields(%order_id))]
    async fn get_order(&self, order_id: &OrderId) -> Result<Option<Order>, CheckoutError> {
        let url = self.endpoint(&["api", "order", order_id.as_str()]);
        match self.fetch::<OrderPayload>(self.client.get(url)).await {
            Ok(payload) => Ok(payload.order),
            Err(CheckoutError::NotFound(_)) => Ok(None),
            Err(err) => Err(err),
        }
    }
}
