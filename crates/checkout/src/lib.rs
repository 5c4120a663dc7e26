//! Checkout-outcome reconciliation for the storefront.
//!
//! When a payment gateway sends the customer's browser back to the
//! storefront, the redirect carries an immediate but untrusted outcome. This
//! crate turns that redirect into a displayed result and then checks it once
//! against the backend's payment record, under one rule: a success that has
//! been shown is never turned into a failure.
//!
//! It also provides the re-payment trigger used to open a fresh gateway
//! session for orders whose online payment never settled.

pub mod error;
pub mod locale;
pub mod reconciler;
pub mod repayment;
pub mod services;
pub mod state;

pub use error::{CheckoutError, Result};
pub use locale::{Locale, MessageKey};
pub use reconciler::{CheckoutResultView, Reconciler};
pub use repayment::{CheckoutLinks, GatewayRedirect, RepaymentTrigger};
pub use services::{
    CreatePaymentRequest, CreatePaymentResponse, HttpBackend, HttpBackendConfig,
    InMemoryOrderBackend, InMemoryPaymentBackend, OrderBackend, PaymentBackend,
};
pub use state::{ReconciledStatus, ResultStatus};
