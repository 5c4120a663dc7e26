//! Storefront edge HTTP server.
//!
//! Serves the checkout-result screen gateways redirect to, the order
//! lifecycle timeline and the pay-again action, with structured logging
//! (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use checkout::{CheckoutError, CheckoutLinks, HttpBackend, OrderBackend, PaymentBackend};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use config::Config;
use state::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<P, O>(state: Arc<AppState<P, O>>, metrics_handle: PrometheusHandle) -> Router
where
    P: PaymentBackend + 'static,
    O: OrderBackend + 'static,
{
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/checkout/result", get(routes::checkout::mount::<P, O>))
        .route("/checkout/result/{id}", get(routes::checkout::get::<P, O>))
        .route(
            "/checkout/result/{id}/order",
            get(routes::checkout::open_order::<P, O>),
        )
        .route("/orders/{id}/timeline", get(routes::orders::timeline::<P, O>))
        .route("/orders/{id}/pay-again", post(routes::orders::pay_again::<P, O>))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates application state backed by the storefront backend over HTTP.
pub fn create_http_state(
    config: &Config,
) -> Result<Arc<AppState<HttpBackend, HttpBackend>>, CheckoutError> {
    let backend = Arc::new(HttpBackend::new(config.backend())?);
    let links = CheckoutLinks::new(&config.public_origin)?;

    Ok(Arc::new(AppState::new(
        Arc::clone(&backend),
        backend,
        links,
        config.locale,
    )))
}
