//! Payment transactions and gateway redirect interpretation.

mod gateway;
mod transaction;

pub use gateway::{GatewayOutcome, RedirectParams, normalize};
pub use transaction::{PaymentState, PaymentTransaction};
