//! Backend service traits with in-memory and HTTP implementations.

pub mod http;
pub mod order;
pub mod payment;

pub use http::{HttpBackend, HttpBackendConfig};
pub use order::{InMemoryOrderBackend, OrderBackend};
pub use payment::{
    CreatePaymentRequest, CreatePaymentResponse, InMemoryPaymentBackend, PaymentBackend,
};
