use std::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

/// Identifier of an order as issued by the storefront backend.
///
/// The backend is inconsistent about the JSON type of order ids (integers in
/// payment records, strings elsewhere), so deserialization accepts both and
/// the value is always carried and serialized as a string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct OrderId(String);

impl OrderId {
    /// Creates an order ID from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Parses an order ID from a redirect or path parameter.
    ///
    /// Returns `None` for empty or whitespace-only input.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        (!trimmed.is_empty()).then(|| Self(trimmed.to_string()))
    }

    /// Returns the order ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for OrderId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for OrderId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<u64> for OrderId {
    fn from(n: u64) -> Self {
        Self(n.to_string())
    }
}

struct OrderIdVisitor;

impl Visitor<'_> for OrderIdVisitor {
    type Value = OrderId;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an order id as a string or an integer")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<OrderId, E> {
        Ok(OrderId::new(v))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<OrderId, E> {
        Ok(OrderId(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<OrderId, E> {
        Ok(OrderId::from(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<OrderId, E> {
        Ok(OrderId(v.to_string()))
    }
}

impl<'de> Deserialize<'de> for OrderId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(OrderIdVisitor)
    }
}

/// Identifier of a payment transaction at a gateway.
///
/// This is the reference a gateway echoes back on the browser redirect
/// (`vnp_TxnRef`, `app_trans_id`, ...) and the key of the backend's
/// payment-status lookup.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(String);

impl TransactionId {
    /// Creates a transaction ID from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Parses a transaction ID from a redirect parameter.
    ///
    /// Returns `None` for empty or whitespace-only input.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        (!trimmed.is_empty()).then(|| Self(trimmed.to_string()))
    }

    /// Returns the transaction ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for TransactionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for TransactionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}
