//! Order detail endpoints: lifecycle timeline and re-payment.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::response::Redirect;
use checkout::{OrderBackend, PaymentBackend};
use common::OrderId;
use domain::{Order, TimelineStep, timeline_for};
use serde::Serialize;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineResponse {
    pub order_id: OrderId,
    pub status: String,
    pub steps: Vec<TimelineStep>,
}

/// GET /orders/:id/timeline — lifecycle timeline of an order.
#[tracing::instrument(skip(state))]
pub async fn timeline<P, O>(
    State(state): State<Arc<AppState<P, O>>>,
    Path(id): Path<String>,
) -> Result<Json<TimelineResponse>, ApiError>
where
    P: PaymentBackend + 'static,
    O: OrderBackend + 'static,
{
    let order = load_order(state.orders.as_ref(), &id).await?;
    let steps = timeline_for(&order);

    Ok(Json(TimelineResponse {
        order_id: order.id,
        status: order.status,
        steps,
    }))
}

/// POST /orders/:id/pay-again — open a new gateway session and redirect to it.
#[tracing::instrument(skip(state))]
pub async fn pay_again<P, O>(
    State(state): State<Arc<AppState<P, O>>>,
    Path(id): Path<String>,
) -> Result<Redirect, ApiError>
where
    P: PaymentBackend + 'static,
    O: OrderBackend + 'static,
{
    let order = load_order(state.orders.as_ref(), &id).await?;
    if !order.can_pay_again() {
        return Err(ApiError::Conflict(format!(
            "Order {} cannot be paid again (method {}, payment {}, status {})",
            order.id, order.payment_method, order.payment_status, order.status
        )));
    }

    let redirect = state.repayment.trigger(&order).await?;
    Ok(Redirect::to(&redirect.url))
}

async fn load_order<O: OrderBackend>(orders: &O, id: &str) -> Result<Order, ApiError> {
    let order_id =
        OrderId::parse(id).ok_or_else(|| ApiError::BadRequest("Order id is empty".to_string()))?;
    orders
        .get_order(&order_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Order {order_id} not found")))
}
