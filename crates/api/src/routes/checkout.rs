//! Checkout-result endpoints.
//!
//! Gateways redirect the customer's browser to `/checkout/result`. The
//! result is answered from the redirect alone; verification keeps running in
//! the background and can be observed through the result id.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::response::Redirect;
use checkout::{OrderBackend, PaymentBackend, ReconciledStatus, ResultStatus};
use common::OrderId;
use domain::RedirectParams;
use serde::Serialize;
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResultResponse {
    pub result_id: Uuid,
    pub status: ResultStatus,
    pub message: &'static str,
    pub order_id: Option<OrderId>,
    pub verifying: bool,
}

impl CheckoutResultResponse {
    fn new(result_id: Uuid, shown: ReconciledStatus, verifying: bool) -> Self {
        Self {
            result_id,
            status: shown.status(),
            message: shown.message(),
            order_id: shown.order_id().cloned(),
            verifying,
        }
    }
}

/// GET /checkout/result — mount a result view for a gateway redirect.
///
/// Parameters keep their order and repeats; see [`RedirectParams`].
#[tracing::instrument(skip_all)]
pub async fn mount<P, O>(
    State(state): State<Arc<AppState<P, O>>>,
    Query(params): Query<Vec<(String, String)>>,
) -> Json<CheckoutResultResponse>
where
    P: PaymentBackend + 'static,
    O: OrderBackend + 'static,
{
    let view = state.reconciler.mount(&RedirectParams::from(params));
    let shown = view.current();
    let verifying = view.is_verifying();
    let result_id = state.results.insert(view);

    Json(CheckoutResultResponse::new(result_id, shown, verifying))
}

/// GET /checkout/result/:id — current state of a mounted result view.
#[tracing::instrument(skip(state))]
pub async fn get<P, O>(
    State(state): State<Arc<AppState<P, O>>>,
    Path(result_id): Path<Uuid>,
) -> Result<Json<CheckoutResultResponse>, ApiError>
where
    P: PaymentBackend + 'static,
    O: OrderBackend + 'static,
{
    let (shown, verifying) = state
        .results
        .snapshot(&result_id)
        .ok_or_else(|| ApiError::NotFound(format!("Checkout result {result_id} not found")))?;

    Ok(Json(CheckoutResultResponse::new(result_id, shown, verifying)))
}

/// GET /checkout/result/:id/order — leave the result screen for the order.
#[tracing::instrument(skip(state))]
pub async fn open_order<P, O>(
    State(state): State<Arc<AppState<P, O>>>,
    Path(result_id): Path<Uuid>,
) -> Result<Redirect, ApiError>
where
    P: PaymentBackend + 'static,
    O: OrderBackend + 'static,
{
    let shown = state
        .results
        .remove(&result_id)
        .ok_or_else(|| ApiError::NotFound(format!("Checkout result {result_id} not found")))?;

    Ok(match shown.order_id() {
        Some(order_id) => Redirect::to(&format!("/orders/{order_id}")),
        None => Redirect::to("/orders"),
    })
}
