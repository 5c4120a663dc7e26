//! Value objects for orders and payments.

use std::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::DomainError;

/// Payment method chosen at checkout.
///
/// Every method except cash-on-delivery is an online gateway that redirects
/// the browser back to the storefront.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Cod,
    Momo,
    #[serde(rename = "zalopay")]
    ZaloPay,
    #[serde(rename = "vnpay")]
    VnPay,
}

impl PaymentMethod {
    /// Returns true if payment goes through an online gateway.
    pub fn is_online(&self) -> bool {
        !matches!(self, PaymentMethod::Cod)
    }

    /// Returns the wire name, which is also the backend's gateway key.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cod => "cod",
            PaymentMethod::Momo => "momo",
            PaymentMethod::ZaloPay => "zalopay",
            PaymentMethod::VnPay => "vnpay",
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "cod" => Ok(PaymentMethod::Cod),
            "momo" => Ok(PaymentMethod::Momo),
            "zalopay" => Ok(PaymentMethod::ZaloPay),
            "vnpay" => Ok(PaymentMethod::VnPay),
            _ => Err(DomainError::UnknownPaymentMethod(value.to_string())),
        }
    }
}

/// Settlement state of an order's payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "pending" => Ok(PaymentStatus::Pending),
            "paid" => Ok(PaymentStatus::Paid),
            "failed" => Ok(PaymentStatus::Failed),
            _ => Err(DomainError::UnknownPaymentStatus(value.to_string())),
        }
    }
}

/// Money amount in whole đồng (VND has no minor unit in circulation).
///
/// The backend sends amounts as JSON numbers or as decimal strings
/// (`"150000.00"`), so deserialization accepts both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Default)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Creates a new amount from whole đồng.
    pub fn from_dong(dong: i64) -> Self {
        Self(dong)
    }
}

impl FromStr for Money {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if let Ok(whole) = trimmed.parse::<i64>() {
            return Ok(Self(whole));
        }
        trimmed
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(|v| Self(v.round() as i64))
            .ok_or_else(|| DomainError::InvalidAmount(value.to_string()))
    }
}

struct MoneyVisitor;

impl Visitor<'_> for MoneyVisitor {
    type Value = Money;

    fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("an amount as a number or a decimal string")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Money, E> {
        Ok(Money(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Money, E> {
        i64::try_from(v)
            .map(Money)
            .map_err(|_| E::custom(format!("amount out of range: {v}")))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Money, E> {
        if v.is_finite() {
            Ok(Money(v.round() as i64))
        } else {
            Err(E::custom("amount must be finite"))
        }
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Money, E> {
        v.parse().map_err(E::custom)
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(MoneyVisitor)
    }
}
