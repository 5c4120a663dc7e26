//! Identifier types shared across the storefront checkout crates.

pub mod types;

pub use types::{OrderId, TransactionId};
