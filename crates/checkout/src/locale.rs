//! Localized messages for the checkout-result screen.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CheckoutError;

/// Language of customer-facing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Vi,
}

/// Messages shown on the checkout-result screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKey {
    /// Outcome not yet known.
    Verifying,
    Succeeded,
    /// The redirect reported failure or cancellation.
    RedirectFailed,
    /// The backend's payment record reported failure.
    VerificationFailed,
}

impl Locale {
    pub fn message(&self, key: MessageKey) -> &'static str {
        match (self, key) {
            (Locale::En, MessageKey::Verifying) => "Verifying payment...",
            (Locale::En, MessageKey::Succeeded) => "Payment succeeded.",
            (Locale::En, MessageKey::RedirectFailed) => "Payment failed or was cancelled.",
            (Locale::En, MessageKey::VerificationFailed) => "Payment failed.",
            (Locale::Vi, MessageKey::Verifying) => "Đang xác minh thanh toán...",
            (Locale::Vi, MessageKey::Succeeded) => "Thanh toán thành công.",
            (Locale::Vi, MessageKey::RedirectFailed) => "Thanh toán thất bại hoặc đã hủy.",
            (Locale::Vi, MessageKey::VerificationFailed) => "Thanh toán thất bại.",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Vi => "vi",
        }
    }
}

impl FromStr for Locale {
    type Err = CheckoutError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "en" | "en-us" | "en-gb" => Ok(Locale::En),
            "vi" | "vi-vn" => Ok(Locale::Vi),
            other => Err(CheckoutError::InvalidConfig(format!(
                "unsupported locale: {other}"
            ))),
        }
    }
}
